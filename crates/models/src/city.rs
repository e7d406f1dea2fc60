use sea_orm::entity::prelude::*;
use sea_orm::sea_query::ForeignKeyAction;
use serde::{Deserialize, Serialize};

use crate::base::{self, Fields};
use crate::errors::ModelError;
use crate::state;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(StringLen::N(60))")]
    pub id: String,
    #[serde(with = "base::timestamp")]
    pub created_at: DateTimeUtc,
    #[serde(with = "base::timestamp")]
    pub updated_at: DateTimeUtc,
    #[sea_orm(column_type = "String(StringLen::N(60))")]
    pub state_id: String,
    #[sea_orm(column_type = "String(StringLen::N(128))")]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    State,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::State => Entity::belongs_to(state::Entity)
                .from(Column::StateId)
                .to(state::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<state::Entity> for Entity {
    fn to() -> RelationDef { Relation::State.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn build(fields: &Fields) -> Result<Self, ModelError> {
        let state_id = base::required_string(fields, "state_id")?;
        let name = base::required_string(fields, "name")?;
        let now = base::now();
        Ok(Self { id: base::new_id(), created_at: now, updated_at: now, state_id, name })
    }

    /// `state_id` is fixed once the city exists.
    pub fn apply(&mut self, fields: &Fields) -> Result<(), ModelError> {
        if let Some(v) = fields.get("name") {
            self.name = base::string("name", v)?;
        }
        Ok(())
    }
}
