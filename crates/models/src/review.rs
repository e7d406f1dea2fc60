use sea_orm::entity::prelude::*;
use sea_orm::sea_query::ForeignKeyAction;
use serde::{Deserialize, Serialize};

use crate::base::{self, Fields};
use crate::errors::ModelError;
use crate::{place, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(StringLen::N(60))")]
    pub id: String,
    #[serde(with = "base::timestamp")]
    pub created_at: DateTimeUtc,
    #[serde(with = "base::timestamp")]
    pub updated_at: DateTimeUtc,
    #[sea_orm(column_type = "String(StringLen::N(60))")]
    pub place_id: String,
    #[sea_orm(column_type = "String(StringLen::N(60))")]
    pub user_id: String,
    #[sea_orm(column_type = "String(StringLen::N(1024))")]
    pub text: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Place,
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Place => Entity::belongs_to(place::Entity)
                .from(Column::PlaceId)
                .to(place::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<place::Entity> for Entity {
    fn to() -> RelationDef { Relation::Place.def() }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn build(fields: &Fields) -> Result<Self, ModelError> {
        let place_id = base::required_string(fields, "place_id")?;
        let user_id = base::required_string(fields, "user_id")?;
        let text = base::required_string(fields, "text")?;
        let now = base::now();
        Ok(Self { id: base::new_id(), created_at: now, updated_at: now, place_id, user_id, text })
    }

    /// `place_id` and `user_id` are fixed once the review exists.
    pub fn apply(&mut self, fields: &Fields) -> Result<(), ModelError> {
        if let Some(v) = fields.get("text") {
            self.text = base::string("text", v)?;
        }
        Ok(())
    }
}
