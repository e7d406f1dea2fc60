use sea_orm::entity::prelude::*;
use sea_orm::sea_query::ForeignKeyAction;
use serde::{Deserialize, Serialize};

use crate::base::{self, Fields};
use crate::errors::ModelError;
use crate::{city, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "places")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(StringLen::N(60))")]
    pub id: String,
    #[serde(with = "base::timestamp")]
    pub created_at: DateTimeUtc,
    #[serde(with = "base::timestamp")]
    pub updated_at: DateTimeUtc,
    #[sea_orm(column_type = "String(StringLen::N(60))")]
    pub city_id: String,
    #[sea_orm(column_type = "String(StringLen::N(60))")]
    pub user_id: String,
    #[sea_orm(column_type = "String(StringLen::N(128))")]
    pub name: String,
    #[sea_orm(column_type = "String(StringLen::N(1024))", nullable)]
    pub description: Option<String>,
    #[serde(default)]
    pub number_rooms: i32,
    #[serde(default)]
    pub number_bathrooms: i32,
    #[serde(default)]
    pub max_guest: i32,
    #[serde(default)]
    pub price_by_night: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    City,
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::City => Entity::belongs_to(city::Entity)
                .from(Column::CityId)
                .to(city::Column::Id)
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

impl Related<city::Entity> for Entity {
    fn to() -> RelationDef { Relation::City.def() }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn build(fields: &Fields) -> Result<Self, ModelError> {
        let city_id = base::required_string(fields, "city_id")?;
        let user_id = base::required_string(fields, "user_id")?;
        let name = base::required_string(fields, "name")?;
        let now = base::now();
        let mut place = Self {
            id: base::new_id(),
            created_at: now,
            updated_at: now,
            city_id,
            user_id,
            name,
            description: None,
            number_rooms: 0,
            number_bathrooms: 0,
            max_guest: 0,
            price_by_night: 0,
            latitude: None,
            longitude: None,
        };
        place.apply(fields)?;
        Ok(place)
    }

    /// `city_id` and `user_id` are fixed once the place exists.
    pub fn apply(&mut self, fields: &Fields) -> Result<(), ModelError> {
        for (key, v) in fields {
            match key.as_str() {
                "name" => self.name = base::string(key, v)?,
                "description" => self.description = base::opt_string(key, v)?,
                "number_rooms" => self.number_rooms = base::int(key, v)?,
                "number_bathrooms" => self.number_bathrooms = base::int(key, v)?,
                "max_guest" => self.max_guest = base::int(key, v)?,
                "price_by_night" => self.price_by_night = base::int(key, v)?,
                "latitude" => self.latitude = base::opt_float(key, v)?,
                "longitude" => self.longitude = base::opt_float(key, v)?,
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn build_reads_optional_numbers() {
        let fields = json!({
            "city_id": "c", "user_id": "u", "name": "Loft",
            "number_rooms": 3, "latitude": 37.77, "price_by_night": 120
        })
        .as_object()
        .cloned()
        .unwrap();
        let place = Model::build(&fields).unwrap();
        assert_eq!(place.number_rooms, 3);
        assert_eq!(place.price_by_night, 120);
        assert_eq!(place.latitude, Some(37.77));
        assert_eq!(place.longitude, None);
    }

    #[test]
    fn missing_user_reported_before_name() {
        let fields = json!({"city_id": "c"}).as_object().cloned().unwrap();
        assert_eq!(Model::build(&fields).unwrap_err().to_string(), "Missing user_id");
    }

    #[test]
    fn apply_rejects_mistyped_numbers() {
        let fields = json!({"city_id": "c", "user_id": "u", "name": "Loft"}).as_object().cloned().unwrap();
        let mut place = Model::build(&fields).unwrap();
        let patch = json!({"max_guest": "many"}).as_object().cloned().unwrap();
        assert_eq!(place.apply(&patch).unwrap_err().to_string(), "Invalid max_guest");
        let patch = json!({"city_id": "elsewhere", "max_guest": 4}).as_object().cloned().unwrap();
        place.apply(&patch).unwrap();
        assert_eq!(place.city_id, "c");
        assert_eq!(place.max_guest, 4);
    }
}
