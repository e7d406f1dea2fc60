use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::base::{self, Fields};
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(StringLen::N(60))")]
    pub id: String,
    #[serde(with = "base::timestamp")]
    pub created_at: DateTimeUtc,
    #[serde(with = "base::timestamp")]
    pub updated_at: DateTimeUtc,
    #[sea_orm(column_type = "String(StringLen::N(128))")]
    pub email: String,
    /// Argon2 PHC string; never leaves the process through the public mapping.
    #[sea_orm(column_type = "String(StringLen::N(128))")]
    pub password: String,
    #[sea_orm(column_type = "String(StringLen::N(128))", nullable)]
    pub first_name: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(128))", nullable)]
    pub last_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

/// Hash a plain-text password with a fresh salt.
pub fn hash_password(plain: &str) -> Result<String, ModelError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ModelError::Hash(e.to_string()))
}

impl Model {
    pub fn build(fields: &Fields) -> Result<Self, ModelError> {
        let email = base::required_string(fields, "email")?;
        let password = hash_password(&base::required_string(fields, "password")?)?;
        let first_name = base::optional(fields, "first_name", base::opt_string)?;
        let last_name = base::optional(fields, "last_name", base::opt_string)?;
        let now = base::now();
        Ok(Self { id: base::new_id(), created_at: now, updated_at: now, email, password, first_name, last_name })
    }

    /// `email` is fixed once the user exists; a new password is re-hashed.
    pub fn apply(&mut self, fields: &Fields) -> Result<(), ModelError> {
        if let Some(v) = fields.get("password") {
            self.password = hash_password(&base::string("password", v)?)?;
        }
        if let Some(v) = fields.get("first_name") {
            self.first_name = base::opt_string("first_name", v)?;
        }
        if let Some(v) = fields.get("last_name") {
            self.last_name = base::opt_string("last_name", v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHash, PasswordVerifier};
    use serde_json::json;

    fn verifies(user: &Model, plain: &str) -> bool {
        let parsed = PasswordHash::new(&user.password).unwrap();
        Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok()
    }

    #[test]
    fn password_is_hashed_and_verifiable() {
        let fields = json!({"email": "a@b.c", "password": "pwd"}).as_object().cloned().unwrap();
        let mut user = Model::build(&fields).unwrap();
        assert_ne!(user.password, "pwd");
        assert!(verifies(&user, "pwd"));

        let patch = json!({"password": "other", "email": "x@y.z"}).as_object().cloned().unwrap();
        user.apply(&patch).unwrap();
        assert!(verifies(&user, "other"));
        assert_eq!(user.email, "a@b.c");
    }

    #[test]
    fn email_and_password_are_required() {
        let no_email = json!({"password": "pwd"}).as_object().cloned().unwrap();
        assert_eq!(Model::build(&no_email).unwrap_err().to_string(), "Missing email");
        let no_pwd = json!({"email": "a@b.c"}).as_object().cloned().unwrap();
        assert_eq!(Model::build(&no_pwd).unwrap_err().to_string(), "Missing password");
    }
}
