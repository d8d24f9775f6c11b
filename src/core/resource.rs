//! Generic resource envelope
//!
//! A [`Resource`] is an arbitrary payload plus its hypermedia controls.
//! The payload type is a parameter: untyped JSON ([`Payload`]) by default,
//! or any serde type when the caller knows the shape of the entity.

use crate::core::error::{HalError, ProtocolError};
use crate::core::link::{LinkValue, Links};
use crate::core::template::{Template, Templates};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Untyped payload: every field except `_links`, `_embedded` and `_templates`
pub type Payload = Map<String, Value>;

/// A HAL-FORMS resource
///
/// Identity is the `self` href; two resources with the same self href are
/// the same resource, whatever their other fields hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource<T = Payload> {
    #[serde(rename = "_links")]
    pub links: Links,

    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<Embedded>,

    #[serde(rename = "_templates", default, skip_serializing_if = "Option::is_none")]
    pub templates: Option<Templates>,

    #[serde(flatten)]
    pub data: T,
}

impl<T> Resource<T> {
    /// The identity of this resource
    pub fn self_href(&self) -> &str {
        &self.links.self_link().href
    }

    /// Whether both resources have the same self href
    pub fn same_identity<U>(&self, other: &Resource<U>) -> bool {
        self.self_href() == other.self_href()
    }

    pub fn has_link(&self, rel: &str) -> bool {
        self.links.contains(rel)
    }

    pub fn link(&self, rel: &str) -> Option<&LinkValue> {
        self.links.get(rel)
    }

    /// Relation lookup that fails with [`ProtocolError::MissingRelation`]
    pub fn require_link(&self, rel: &str) -> Result<&LinkValue, ProtocolError> {
        self.links
            .get(rel)
            .ok_or_else(|| ProtocolError::MissingRelation {
                rel: rel.to_string(),
                href: self.self_href().to_string(),
            })
    }

    pub fn can_invoke(&self, action: &str) -> bool {
        self.template(action).is_some()
    }

    pub fn template(&self, action: &str) -> Option<&Template> {
        self.templates.as_ref().and_then(|t| t.get(action))
    }

    /// Template lookup that fails with [`ProtocolError::MissingAction`]
    pub fn require_template(&self, action: &str) -> Result<&Template, ProtocolError> {
        self.template(action)
            .ok_or_else(|| ProtocolError::MissingAction {
                action: action.to_string(),
                href: self.self_href().to_string(),
            })
    }

    /// Embedded value under `rel`, if any
    pub fn embedded(&self, rel: &str) -> Option<&EmbeddedValue> {
        self.embedded.as_ref().and_then(|e| e.get(rel))
    }

    /// Swap the payload, keeping the hypermedia controls
    pub fn map_data<U>(self, f: impl FnOnce(T) -> U) -> Resource<U> {
        Resource {
            links: self.links,
            embedded: self.embedded,
            templates: self.templates,
            data: f(self.data),
        }
    }
}

impl<T: Serialize> Resource<T> {
    /// Erase the payload type
    pub fn to_untyped(&self) -> Result<Resource, HalError> {
        let data = match serde_json::to_value(&self.data)
            .map_err(|e| HalError::decode("resource payload", e))?
        {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(HalError::decode(
                    "resource payload",
                    format!("expected an object, got {}", other),
                ));
            }
        };

        Ok(Resource {
            links: self.links.clone(),
            embedded: self.embedded.clone(),
            templates: self.templates.clone(),
            data,
        })
    }
}

impl Resource {
    /// Read the payload as `U`
    pub fn into_typed<U: DeserializeOwned>(self) -> Result<Resource<U>, HalError> {
        let href = self.self_href().to_string();
        let Resource {
            links,
            embedded,
            templates,
            data,
        } = self;
        let data = serde_json::from_value(Value::Object(data))
            .map_err(|e| HalError::decode(format!("payload of '{}'", href), e))?;

        Ok(Resource {
            links,
            embedded,
            templates,
            data,
        })
    }

    /// Parse a JSON document as a resource
    pub fn from_value(value: Value) -> Result<Self, HalError> {
        serde_json::from_value(value).map_err(|e| HalError::decode("HAL resource", e))
    }

    /// A payload field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}

/// Embedded value of one relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddedValue {
    Many(Vec<Resource>),
    One(Box<Resource>),
}

impl EmbeddedValue {
    /// Embedded resources, in order
    pub fn as_slice(&self) -> &[Resource] {
        match self {
            EmbeddedValue::Many(items) => items,
            EmbeddedValue::One(item) => std::slice::from_ref(item.as_ref()),
        }
    }

    pub fn into_vec(self) -> Vec<Resource> {
        match self {
            EmbeddedValue::Many(items) => items,
            EmbeddedValue::One(item) => vec![*item],
        }
    }
}

/// The `_embedded` map of a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedded(IndexMap<String, EmbeddedValue>);

impl Embedded {
    pub fn get(&self, rel: &str) -> Option<&EmbeddedValue> {
        self.0.get(rel)
    }

    pub fn insert(&mut self, rel: impl Into<String>, value: EmbeddedValue) {
        self.0.insert(rel.into(), value);
    }

    pub fn rels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Hall {
        name: String,
        capacity: Option<u32>,
    }

    fn hall_json() -> Value {
        json!({
            "name": "Gymnase Nord",
            "capacity": 300,
            "_links": {
                "self": {"href": "http://api/halls/7"},
                "teams": [{"href": "http://api/teams/1"}]
            },
            "_templates": {
                "default": {"method": "PUT"},
                "deleteHall": {"method": "DELETE"}
            }
        })
    }

    #[test]
    fn test_untyped_resource_keeps_payload_and_controls() {
        let hall = Resource::from_value(hall_json()).unwrap();

        assert_eq!(hall.self_href(), "http://api/halls/7");
        assert_eq!(hall.get("name"), Some(&json!("Gymnase Nord")));
        assert!(hall.get("_links").is_none());
        assert!(hall.has_link("teams"));
        assert!(hall.can_invoke("deleteHall"));
        assert!(!hall.can_invoke("createHall"));
        assert_eq!(hall.template("default").unwrap().key, "default");
    }

    #[test]
    fn test_typed_round_trip_preserves_controls() {
        let hall: Resource<Hall> = Resource::from_value(hall_json()).unwrap().into_typed().unwrap();
        assert_eq!(hall.data.capacity, Some(300));

        let back = hall.to_untyped().unwrap();
        assert_eq!(back, Resource::from_value(hall_json()).unwrap());
    }

    #[test]
    fn test_require_helpers_report_missing_controls() {
        let hall = Resource::from_value(hall_json()).unwrap();

        assert_eq!(
            hall.require_link("coaches").unwrap_err(),
            ProtocolError::MissingRelation {
                rel: "coaches".to_string(),
                href: "http://api/halls/7".to_string()
            }
        );
        assert!(matches!(
            hall.require_template("createHall"),
            Err(ProtocolError::MissingAction { .. })
        ));
    }

    #[test]
    fn test_resource_without_self_is_rejected() {
        let err = Resource::from_value(json!({"name": "x", "_links": {}})).unwrap_err();
        assert_eq!(err.error_code(), "DECODE_ERROR");
    }

    #[test]
    fn test_embedded_single_and_many() {
        let resource = Resource::from_value(json!({
            "_links": {"self": {"href": "http://api/teams/1"}},
            "_embedded": {
                "hall": {"name": "A", "_links": {"self": {"href": "http://api/halls/1"}}},
                "coaches": [
                    {"_links": {"self": {"href": "http://api/coaches/1"}}},
                    {"_links": {"self": {"href": "http://api/coaches/2"}}}
                ]
            }
        }))
        .unwrap();

        assert!(matches!(resource.embedded("hall"), Some(EmbeddedValue::One(_))));
        assert_eq!(resource.embedded("coaches").map(|e| e.as_slice().len()), Some(2));
        assert!(resource.embedded("sessions").is_none());
    }

    #[test]
    fn test_controls_keep_server_order() {
        let body = r#"{
            "_links": {
                "self": {"href": "http://api/teams/1"},
                "next": {"href": "http://api/teams/2"},
                "alpha": {"href": "http://api/alpha"}
            },
            "_templates": {
                "updateTeam": {"method": "PUT"},
                "deleteTeam": {"method": "DELETE"}
            }
        }"#;
        let resource = Resource::from_value(serde_json::from_str(body).unwrap()).unwrap();

        assert_eq!(resource.links.rels().collect::<Vec<_>>(), vec!["self", "next", "alpha"]);
        let templates = resource.templates.as_ref().unwrap();
        assert_eq!(templates.keys().collect::<Vec<_>>(), vec!["updateTeam", "deleteTeam"]);
    }
}
