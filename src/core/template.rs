//! HAL-FORMS action templates
//!
//! `_templates` maps an action key to the description of one mutation the
//! server currently allows on the resource: HTTP method, optional target
//! override and the form properties the payload is made of.

use crate::core::error::ProtocolError;
use crate::core::link::Link;
use crate::transport::Method;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One invocable action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Action key, filled from the `_templates` map key
    #[serde(skip)]
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Declared HTTP method, as sent by the server
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// URI overriding the resource's self href
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

impl Template {
    /// Create a template for `key` with the given method
    pub fn new(key: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: None,
            method: method.into(),
            content_type: None,
            target: None,
            properties: Vec::new(),
        }
    }

    /// The method to dispatch this action with
    ///
    /// Only POST, PUT and DELETE are dispatchable; anything else, GET
    /// included, is a server configuration error.
    pub fn dispatch_method(&self) -> Result<Method, ProtocolError> {
        Method::for_action(&self.method).ok_or_else(|| ProtocolError::UnsupportedMethod {
            action: self.key.clone(),
            method: self.method.clone(),
        })
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A form field of an action template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templated: Option<bool>,

    /// Pre-filled value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Input type (`text`, `email`, `number`, `date`...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<PropertyOptions>,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.unwrap_or(false)
    }
}

/// Allowed values of a property, inline or behind a link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_values: Vec<String>,
}

/// The `_templates` map of a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, Template>")]
pub struct Templates(IndexMap<String, Template>);

impl From<IndexMap<String, Template>> for Templates {
    fn from(map: IndexMap<String, Template>) -> Self {
        Templates(
            map.into_iter()
                .map(|(key, mut template)| {
                    template.key = key.clone();
                    (key, template)
                })
                .collect(),
        )
    }
}

impl Templates {
    pub fn get(&self, key: &str) -> Option<&Template> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Action keys in server order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn insert(&mut self, template: Template) {
        self.0.insert(template.key.clone(), template);
    }

    pub fn remove(&mut self, key: &str) -> Option<Template> {
        self.0.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_templates_take_key_from_map() {
        let templates: Templates = serde_json::from_value(json!({
            "updateTeam": {
                "method": "PUT",
                "properties": [
                    {"name": "teamNumber", "required": true, "type": "number", "min": 1},
                    {"name": "category", "options": {
                        "inline": ["U11", "U13", "SENIOR"],
                        "selectedValues": ["U13"],
                        "maxItems": 1
                    }}
                ]
            },
            "deleteTeam": {"method": "DELETE", "target": "http://api/teams/1"}
        }))
        .unwrap();

        assert_eq!(templates.keys().collect::<Vec<_>>(), vec!["updateTeam", "deleteTeam"]);

        let update = templates.get("updateTeam").unwrap();
        assert_eq!(update.key, "updateTeam");
        assert!(update.property("teamNumber").unwrap().is_required());
        assert_eq!(update.property("teamNumber").unwrap().input_type.as_deref(), Some("number"));

        let options = update.property("category").unwrap().options.as_ref().unwrap();
        assert_eq!(options.inline.as_ref().map(Vec::len), Some(3));
        assert_eq!(options.selected_values, vec!["U13"]);

        let delete = templates.get("deleteTeam").unwrap();
        assert_eq!(delete.target.as_deref(), Some("http://api/teams/1"));
    }

    #[test]
    fn test_dispatch_method() {
        assert_eq!(Template::new("a", "post").dispatch_method(), Ok(Method::Post));
        assert_eq!(Template::new("a", "PUT").dispatch_method(), Ok(Method::Put));
        assert_eq!(Template::new("a", "DELETE").dispatch_method(), Ok(Method::Delete));

        let err = Template::new("search", "GET").dispatch_method().unwrap_err();
        assert_eq!(
            err,
            ProtocolError::UnsupportedMethod {
                action: "search".to_string(),
                method: "GET".to_string()
            }
        );
        assert!(Template::new("patchTeam", "PATCH").dispatch_method().is_err());
    }

    #[test]
    fn test_serialize_omits_key() {
        let mut templates = Templates::default();
        templates.insert(Template::new("createHall", "POST"));

        let value = serde_json::to_value(&templates).unwrap();
        assert_eq!(value, json!({"createHall": {"method": "POST"}}));
    }
}
