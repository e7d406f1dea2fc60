use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::base::{self, Fields};
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "states")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(StringLen::N(60))")]
    pub id: String,
    #[serde(with = "base::timestamp")]
    pub created_at: DateTimeUtc,
    #[serde(with = "base::timestamp")]
    pub updated_at: DateTimeUtc,
    #[sea_orm(column_type = "String(StringLen::N(128))")]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn build(fields: &Fields) -> Result<Self, ModelError> {
        let name = base::required_string(fields, "name")?;
        let now = base::now();
        Ok(Self { id: base::new_id(), created_at: now, updated_at: now, name })
    }

    pub fn apply(&mut self, fields: &Fields) -> Result<(), ModelError> {
        if let Some(v) = fields.get("name") {
            self.name = base::string("name", v)?;
        }
        Ok(())
    }
}
