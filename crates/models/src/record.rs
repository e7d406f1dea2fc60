//! Closed set of record kinds and the tagged `Record` value stored by every backend.
//!
//! A record is addressed by its key `"<ClassName>.<id>"`. The class name prefix picks
//! the kind, and the kind's decoder turns a persisted mapping back into a typed record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::base::{self, Fields};
use crate::errors::ModelError;
use crate::{amenity, city, place, review, state, user};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    State,
    City,
    Amenity,
    User,
    Place,
    Review,
}

impl RecordKind {
    /// Parents come before their children.
    pub const ALL: [RecordKind; 6] = [
        RecordKind::State,
        RecordKind::City,
        RecordKind::Amenity,
        RecordKind::User,
        RecordKind::Place,
        RecordKind::Review,
    ];

    pub fn class_name(self) -> &'static str {
        match self {
            RecordKind::State => "State",
            RecordKind::City => "City",
            RecordKind::Amenity => "Amenity",
            RecordKind::User => "User",
            RecordKind::Place => "Place",
            RecordKind::Review => "Review",
        }
    }

    /// Collection name used in URLs and in the stats body.
    pub fn plural(self) -> &'static str {
        match self {
            RecordKind::State => "states",
            RecordKind::City => "cities",
            RecordKind::Amenity => "amenities",
            RecordKind::User => "users",
            RecordKind::Place => "places",
            RecordKind::Review => "reviews",
        }
    }

    /// Kinds holding a foreign key to this one; deleting a record deletes these too.
    pub fn dependents(self) -> &'static [RecordKind] {
        match self {
            RecordKind::State => &[RecordKind::City],
            RecordKind::City => &[RecordKind::Place],
            RecordKind::User => &[RecordKind::Place, RecordKind::Review],
            RecordKind::Place => &[RecordKind::Review],
            RecordKind::Amenity | RecordKind::Review => &[],
        }
    }

    /// Name of the foreign key column pointing at `parent`, if this kind has one.
    pub fn foreign_key(self, parent: RecordKind) -> Option<&'static str> {
        match (self, parent) {
            (RecordKind::City, RecordKind::State) => Some("state_id"),
            (RecordKind::Place, RecordKind::City) => Some("city_id"),
            (RecordKind::Place, RecordKind::User) | (RecordKind::Review, RecordKind::User) => Some("user_id"),
            (RecordKind::Review, RecordKind::Place) => Some("place_id"),
            _ => None,
        }
    }

    /// Registry entry: reconstruct a typed record of this kind from its persisted mapping.
    pub fn decode(self, value: Value) -> Result<Record, serde_json::Error> {
        Ok(match self {
            RecordKind::State => Record::State(serde_json::from_value(value)?),
            RecordKind::City => Record::City(serde_json::from_value(value)?),
            RecordKind::Amenity => Record::Amenity(serde_json::from_value(value)?),
            RecordKind::User => Record::User(serde_json::from_value(value)?),
            RecordKind::Place => Record::Place(serde_json::from_value(value)?),
            RecordKind::Review => Record::Review(serde_json::from_value(value)?),
        })
    }

    /// Construct a fresh record of this kind from request fields.
    pub fn build(self, fields: &Fields) -> Result<Record, ModelError> {
        Ok(match self {
            RecordKind::State => Record::State(state::Model::build(fields)?),
            RecordKind::City => Record::City(city::Model::build(fields)?),
            RecordKind::Amenity => Record::Amenity(amenity::Model::build(fields)?),
            RecordKind::User => Record::User(user::Model::build(fields)?),
            RecordKind::Place => Record::Place(place::Model::build(fields)?),
            RecordKind::Review => Record::Review(review::Model::build(fields)?),
        })
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl FromStr for RecordKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordKind::ALL
            .into_iter()
            .find(|k| k.class_name() == s)
            .ok_or_else(|| ModelError::UnknownClass(s.to_string()))
    }
}

/// `"<ClassName>.<id>"`
pub fn key_of(kind: RecordKind, id: &str) -> String {
    format!("{}.{}", kind.class_name(), id)
}

/// Split a storage key into its kind and id.
pub fn split_key(key: &str) -> Result<(RecordKind, &str), ModelError> {
    let (class, id) = key.split_once('.').ok_or_else(|| ModelError::Malformed {
        key: key.to_string(),
        reason: "expected <ClassName>.<id>".into(),
    })?;
    Ok((class.parse()?, id))
}

#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    State(state::Model),
    City(city::Model),
    Amenity(amenity::Model),
    User(user::Model),
    Place(place::Model),
    Review(review::Model),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::State(_) => RecordKind::State,
            Record::City(_) => RecordKind::City,
            Record::Amenity(_) => RecordKind::Amenity,
            Record::User(_) => RecordKind::User,
            Record::Place(_) => RecordKind::Place,
            Record::Review(_) => RecordKind::Review,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::State(m) => &m.id,
            Record::City(m) => &m.id,
            Record::Amenity(m) => &m.id,
            Record::User(m) => &m.id,
            Record::Place(m) => &m.id,
            Record::Review(m) => &m.id,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Record::State(m) => m.created_at,
            Record::City(m) => m.created_at,
            Record::Amenity(m) => m.created_at,
            Record::User(m) => m.created_at,
            Record::Place(m) => m.created_at,
            Record::Review(m) => m.created_at,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Record::State(m) => m.updated_at,
            Record::City(m) => m.updated_at,
            Record::Amenity(m) => m.updated_at,
            Record::User(m) => m.updated_at,
            Record::Place(m) => m.updated_at,
            Record::Review(m) => m.updated_at,
        }
    }

    pub fn key(&self) -> String {
        key_of(self.kind(), self.id())
    }

    /// Mark the record as mutated now.
    pub fn touch(&mut self) {
        let ts = base::touched(self.created_at());
        match self {
            Record::State(m) => m.updated_at = ts,
            Record::City(m) => m.updated_at = ts,
            Record::Amenity(m) => m.updated_at = ts,
            Record::User(m) => m.updated_at = ts,
            Record::Place(m) => m.updated_at = ts,
            Record::Review(m) => m.updated_at = ts,
        }
    }

    /// Apply an update body. Immutable keys and unknown keys are ignored.
    pub fn apply(&mut self, fields: &Fields) -> Result<(), ModelError> {
        match self {
            Record::State(m) => m.apply(fields),
            Record::City(m) => m.apply(fields),
            Record::Amenity(m) => m.apply(fields),
            Record::User(m) => m.apply(fields),
            Record::Place(m) => m.apply(fields),
            Record::Review(m) => m.apply(fields),
        }
    }

    /// Id of the `parent` this record points at through a foreign key.
    pub fn parent_id(&self, parent: RecordKind) -> Option<&str> {
        match (self, parent) {
            (Record::City(m), RecordKind::State) => Some(&m.state_id),
            (Record::Place(m), RecordKind::City) => Some(&m.city_id),
            (Record::Place(m), RecordKind::User) => Some(&m.user_id),
            (Record::Review(m), RecordKind::Place) => Some(&m.place_id),
            (Record::Review(m), RecordKind::User) => Some(&m.user_id),
            _ => None,
        }
    }

    /// Every foreign key held by this record as `(kind, id)`.
    pub fn references(&self) -> Vec<(RecordKind, &str)> {
        RecordKind::ALL
            .into_iter()
            .filter_map(|parent| self.parent_id(parent).map(|id| (parent, id)))
            .collect()
    }

    /// Persisted mapping: every attribute plus `__class__`.
    pub fn to_storage_dict(&self) -> Result<Fields, ModelError> {
        let mut map = match self {
            Record::State(m) => to_fields(m)?,
            Record::City(m) => to_fields(m)?,
            Record::Amenity(m) => to_fields(m)?,
            Record::User(m) => to_fields(m)?,
            Record::Place(m) => to_fields(m)?,
            Record::Review(m) => to_fields(m)?,
        };
        map.insert("__class__".into(), Value::String(self.kind().class_name().into()));
        Ok(map)
    }

    /// Public mapping returned by the API; same as the persisted one minus secrets.
    pub fn to_dict(&self) -> Result<Fields, ModelError> {
        let mut map = self.to_storage_dict()?;
        if let Record::User(_) = self {
            map.remove("password");
        }
        Ok(map)
    }

    /// Rebuild a record from a persisted `key -> mapping` entry.
    pub fn from_storage(key: &str, value: Value) -> Result<Self, ModelError> {
        let (kind, id) = split_key(key)?;
        let malformed = |reason: String| ModelError::Malformed { key: key.to_string(), reason };
        let record = kind.decode(value).map_err(|e| malformed(e.to_string()))?;
        if record.id() != id {
            return Err(malformed(format!("id {} does not match key", record.id())));
        }
        Ok(record)
    }
}

fn to_fields<T: Serialize>(model: &T) -> Result<Fields, ModelError> {
    match serde_json::to_value(model).map_err(|e| ModelError::Codec(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(ModelError::Codec(format!("expected an object, got {}", other))),
    }
}

impl From<state::Model> for Record {
    fn from(m: state::Model) -> Self { Record::State(m) }
}

impl From<city::Model> for Record {
    fn from(m: city::Model) -> Self { Record::City(m) }
}

impl From<amenity::Model> for Record {
    fn from(m: amenity::Model) -> Self { Record::Amenity(m) }
}

impl From<user::Model> for Record {
    fn from(m: user::Model) -> Self { Record::User(m) }
}

impl From<place::Model> for Record {
    fn from(m: place::Model) -> Self { Record::Place(m) }
}

impl From<review::Model> for Record {
    fn from(m: review::Model) -> Self { Record::Review(m) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: Value) -> Fields {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn kind_parses_class_names() {
        assert_eq!("Place".parse::<RecordKind>().unwrap(), RecordKind::Place);
        assert!(matches!("BaseModel".parse::<RecordKind>(), Err(ModelError::UnknownClass(_))));
        for kind in RecordKind::ALL {
            assert_eq!(kind.to_string().parse::<RecordKind>().unwrap(), kind);
        }
    }

    #[test]
    fn split_key_dispatches_on_prefix() {
        let (kind, id) = split_key("City.1234-abcd").unwrap();
        assert_eq!(kind, RecordKind::City);
        assert_eq!(id, "1234-abcd");
        assert!(split_key("no-dot").is_err());
        assert!(split_key("Planet.1").is_err());
    }

    #[test]
    fn storage_dict_round_trips_through_registry() {
        let record = RecordKind::State.build(&fields(json!({"name": "California"}))).unwrap();
        let dict = record.to_storage_dict().unwrap();
        assert_eq!(dict["__class__"], "State");
        assert_eq!(dict["name"], "California");

        let back = Record::from_storage(&record.key(), Value::Object(dict)).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn from_storage_rejects_mismatched_id() {
        let record = RecordKind::Amenity.build(&fields(json!({"name": "Wifi"}))).unwrap();
        let dict = record.to_storage_dict().unwrap();
        let err = Record::from_storage("Amenity.other-id", Value::Object(dict)).unwrap_err();
        assert!(matches!(err, ModelError::Malformed { .. }));
    }

    #[test]
    fn public_dict_hides_password() {
        let user = RecordKind::User
            .build(&fields(json!({"email": "a@b.c", "password": "secret"})))
            .unwrap();
        assert!(user.to_storage_dict().unwrap().contains_key("password"));
        let public = user.to_dict().unwrap();
        assert!(!public.contains_key("password"));
        assert_eq!(public["__class__"], "User");
        assert_eq!(public["email"], "a@b.c");
    }

    #[test]
    fn apply_ignores_immutable_and_unknown_keys() {
        let mut city = RecordKind::City
            .build(&fields(json!({"name": "Fremont", "state_id": "s1"})))
            .unwrap();
        let id = city.id().to_string();
        let created = city.created_at();
        city.apply(&fields(json!({
            "id": "hijack", "created_at": "2000-01-01T00:00:00.000000",
            "state_id": "s2", "name": "Oakland", "color": "blue"
        })))
        .unwrap();
        city.touch();
        assert_eq!(city.id(), id);
        assert_eq!(city.created_at(), created);
        assert_eq!(city.parent_id(RecordKind::State), Some("s1"));
        assert!(city.updated_at() >= city.created_at());
        match &city {
            Record::City(m) => assert_eq!(m.name, "Oakland"),
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn references_list_every_foreign_key() {
        let review = RecordKind::Review
            .build(&fields(json!({"place_id": "p", "user_id": "u", "text": "Great"})))
            .unwrap();
        let refs = review.references();
        assert_eq!(refs, vec![(RecordKind::User, "u"), (RecordKind::Place, "p")]);
        assert_eq!(RecordKind::Review.foreign_key(RecordKind::Place), Some("place_id"));
        assert_eq!(RecordKind::State.foreign_key(RecordKind::City), None);
    }

    #[test]
    fn missing_required_field_is_validation_error() {
        let err = RecordKind::Review
            .build(&fields(json!({"place_id": "p", "user_id": "u"})))
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing text");
    }
}
