//! Configuration loading and management

use crate::core::error::HalError;
use crate::core::query::DEFAULT_PAGE_SIZE;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Media type sent in the `Accept` header of every request
pub const HAL_FORMS_MEDIA_TYPE: &str = "application/prs.hal-forms+json";

/// Settings of the hypermedia client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// URL of the API root resource
    pub base_url: String,

    /// Artificial delay in milliseconds applied to successful responses
    ///
    /// Meant for exercising loading states in a UI; keep it at 0 otherwise.
    #[serde(default)]
    pub response_delay: u64,

    #[serde(default = "default_accept")]
    pub accept: String,
}

fn default_accept() -> String {
    HAL_FORMS_MEDIA_TYPE.to_string()
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            response_delay: 0,
            accept: default_accept(),
        }
    }

    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay)
    }

    /// Parsed base URL
    pub fn root_url(&self) -> Result<Url, HalError> {
        Url::parse(&self.base_url)
            .map_err(|e| HalError::Config(format!("invalid base_url '{}': {}", self.base_url, e)))
    }
}

/// How one collection is reached and mutated
///
/// `root_rel` is followed from the API root with page parameters; the
/// unpaged collection is then reached through `all_rel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDescriptor {
    /// Name used in logs and errors
    pub name: String,

    pub root_rel: String,

    /// Key of the items in `_embedded`
    pub embedded_rel: String,

    pub all_rel: String,

    /// Collection-level action
    pub create_action: String,

    /// Item-level action
    pub update_action: String,

    /// Item-level action
    pub delete_action: String,

    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl CollectionDescriptor {
    /// Descriptor following the usual naming: `teams`, `allTeams`,
    /// `createTeam`, `updateTeam`, `deleteTeam`
    pub fn conventional(plural: &str, singular_pascal: &str) -> Self {
        let plural_pascal = capitalize(plural);
        Self {
            name: plural.to_string(),
            root_rel: plural.to_string(),
            embedded_rel: plural.to_string(),
            all_rel: format!("all{}", plural_pascal),
            create_action: format!("create{}", singular_pascal),
            update_action: format!("update{}", singular_pascal),
            delete_action: format!("delete{}", singular_pascal),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Complete configuration: client settings plus collection descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalConfig {
    pub client: ClientConfig,

    #[serde(default)]
    pub collections: Vec<CollectionDescriptor>,
}

impl HalConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Find a collection descriptor by name
    pub fn collection(&self, name: &str) -> Option<&CollectionDescriptor> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Configuration of the training API on a local backend
    pub fn default_config() -> Self {
        Self {
            client: ClientConfig::new("http://localhost:8082/api"),
            collections: vec![
                CollectionDescriptor::conventional("teams", "Team"),
                CollectionDescriptor::conventional("coaches", "Coach"),
                CollectionDescriptor::conventional("halls", "Hall"),
            ],
        }
    }
}
