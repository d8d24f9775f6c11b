//! Link model: relations from one resource to others
//!
//! A resource advertises what a client may navigate to through its `_links`
//! map. A relation holds either one link or an array of links, and every
//! map carries exactly one `self` link which is the identity of the resource.

use crate::core::error::ProtocolError;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Relation name of the identity link
pub const SELF_REL: &str = "self";

/// A target URI plus hypermedia metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Target URI, possibly holding `{...}` placeholders
    pub href: String,

    /// Whether `href` holds placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templated: Option<bool>,

    /// Media type hint
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<String>,

    /// Any other attribute the server sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Link {
    /// Create a plain (non-templated) link
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            templated: None,
            media_type: None,
            deprecation: None,
            name: None,
            profile: None,
            title: None,
            hreflang: None,
            extra: Map::new(),
        }
    }

    pub fn is_templated(&self) -> bool {
        self.templated.unwrap_or(false)
    }

    /// The URI to request for this link
    ///
    /// Templated links have their `{...}` placeholders removed literally;
    /// no RFC 6570 expansion is performed.
    pub fn resolved_href(&self) -> String {
        static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
        if self.is_templated() {
            let regex = PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{[^}]*\}").unwrap());
            regex.replace_all(&self.href, "").into_owned()
        } else {
            self.href.clone()
        }
    }
}

/// Value of one relation: a link or an array of links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkValue {
    Single(Link),
    Many(Vec<Link>),
}

impl LinkValue {
    /// All links of the relation, in order
    pub fn as_slice(&self) -> &[Link] {
        match self {
            LinkValue::Single(link) => std::slice::from_ref(link),
            LinkValue::Many(links) => links,
        }
    }

    /// Number of links held
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// The `_links` map of a resource
///
/// Deserialization rejects maps without a single `self` link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, LinkValue>")]
pub struct Links(IndexMap<String, LinkValue>);

impl TryFrom<IndexMap<String, LinkValue>> for Links {
    type Error = ProtocolError;

    fn try_from(map: IndexMap<String, LinkValue>) -> Result<Self, Self::Error> {
        match map.get(SELF_REL) {
            Some(LinkValue::Single(_)) => Ok(Links(map)),
            _ => Err(ProtocolError::MissingSelfLink),
        }
    }
}

impl Links {
    /// Create a links map holding only `self`
    pub fn with_self(href: impl Into<String>) -> Self {
        let mut map = IndexMap::new();
        map.insert(SELF_REL.to_string(), LinkValue::Single(Link::new(href)));
        Links(map)
    }

    /// The identity link
    pub fn self_link(&self) -> &Link {
        // Construction guarantees a single self link
        match self.0.get(SELF_REL) {
            Some(LinkValue::Single(link)) => link,
            _ => unreachable!("links map without a single self link"),
        }
    }

    pub fn get(&self, rel: &str) -> Option<&LinkValue> {
        self.0.get(rel)
    }

    pub fn contains(&self, rel: &str) -> bool {
        self.0.contains_key(rel)
    }

    /// Relation names in server order
    pub fn rels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Set a relation, replacing any previous value
    ///
    /// Replacing `self` with an array is refused.
    pub fn insert(&mut self, rel: impl Into<String>, value: LinkValue) -> Result<(), ProtocolError> {
        let rel = rel.into();
        if rel == SELF_REL && !matches!(value, LinkValue::Single(_)) {
            return Err(ProtocolError::MissingSelfLink);
        }
        self.0.insert(rel, value);
        Ok(())
    }

    /// Add a link to a relation
    ///
    /// A single existing link is turned into an array holding both.
    pub fn push(&mut self, rel: impl Into<String>, link: Link) -> Result<(), ProtocolError> {
        let rel = rel.into();
        if rel == SELF_REL {
            return Err(ProtocolError::MissingSelfLink);
        }

        if let Some(value) = self.0.get_mut(&rel) {
            let mut links = value.as_slice().to_vec();
            links.push(link);
            *value = LinkValue::Many(links);
        } else {
            self.0.insert(rel, LinkValue::Single(link));
        }
        Ok(())
    }

    /// Remove the link with `href` from a relation
    ///
    /// The relation disappears when its last link goes. `self` cannot be removed.
    pub fn remove(&mut self, rel: &str, href: &str) -> bool {
        if rel == SELF_REL {
            return false;
        }
        let Some(value) = self.0.get(rel) else {
            return false;
        };
        let mut remaining: Vec<Link> = value
            .as_slice()
            .iter()
            .filter(|l| l.href != href)
            .cloned()
            .collect();
        if remaining.len() == value.len() {
            return false;
        }

        match remaining.len() {
            0 => {
                self.0.shift_remove(rel);
            }
            1 => {
                self.0
                    .insert(rel.to_string(), LinkValue::Single(remaining.remove(0)));
            }
            _ => {
                self.0.insert(rel.to_string(), LinkValue::Many(remaining));
            }
        }
        true
    }
}
