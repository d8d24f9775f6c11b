//! Query parameters and pagination utilities

use crate::core::link::{Link, LinkValue, Links};
use crate::core::resource::Resource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Which slice of a collection to fetch
///
/// `All` means the unpaged collection, reached through a distinct relation
/// instead of `page`/`size` parameters.
///
/// # Format
/// - `{"size": 20, "page": 0}`
/// - `"all"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PaginationOptionRepr", into = "PaginationOptionRepr")]
pub enum PaginationOption {
    Page { size: u32, page: u32 },
    All,
}

impl Default for PaginationOption {
    fn default() -> Self {
        PaginationOption::Page {
            size: DEFAULT_PAGE_SIZE,
            page: 0,
        }
    }
}

impl PaginationOption {
    pub fn page(size: u32, page: u32) -> Self {
        PaginationOption::Page { size, page }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, PaginationOption::All)
    }

    /// The option one page back
    ///
    /// Stays on page 0 and leaves `All` untouched.
    pub fn previous(&self) -> Self {
        match *self {
            PaginationOption::Page { size, page } => PaginationOption::Page {
                size,
                page: page.saturating_sub(1),
            },
            PaginationOption::All => PaginationOption::All,
        }
    }
}

impl fmt::Display for PaginationOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginationOption::Page { size, page } => write!(f, "page={} size={}", page, size),
            PaginationOption::All => f.write_str("all"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PaginationOptionRepr {
    Page { size: u32, page: u32 },
    Keyword(String),
}

impl TryFrom<PaginationOptionRepr> for PaginationOption {
    type Error = String;

    fn try_from(repr: PaginationOptionRepr) -> Result<Self, Self::Error> {
        match repr {
            PaginationOptionRepr::Page { size, page } => Ok(PaginationOption::Page { size, page }),
            PaginationOptionRepr::Keyword(k) if k == "all" => Ok(PaginationOption::All),
            PaginationOptionRepr::Keyword(k) => Err(format!("unknown pagination option '{}'", k)),
        }
    }
}

impl From<PaginationOption> for PaginationOptionRepr {
    fn from(option: PaginationOption) -> Self {
        match option {
            PaginationOption::Page { size, page } => PaginationOptionRepr::Page { size, page },
            PaginationOption::All => PaginationOptionRepr::Keyword("all".to_string()),
        }
    }
}

/// Ordered query-string pairs appended to a followed link
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.push((key.into(), value.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Page parameters for an option
///
/// `All` maps to no parameters at all.
pub fn build_page_params(option: &PaginationOption) -> QueryParams {
    match option {
        PaginationOption::Page { size, page } => QueryParams::new().with("page", page).with("size", size),
        PaginationOption::All => QueryParams::new(),
    }
}

/// Spring-style page block of a paginated collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    /// Requested page size
    pub size: u64,

    pub total_elements: u64,

    pub total_pages: u64,

    /// Zero-based page index
    pub number: u64,
}

impl PageMetadata {
    pub fn has_next(&self) -> bool {
        self.number + 1 < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.number > 0
    }
}

/// Page metadata plus the collection's navigation links
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub page: PageMetadata,
    pub links: Links,
}

impl Pagination {
    fn nav(&self, rel: &str) -> Option<&Link> {
        match self.links.get(rel)? {
            LinkValue::Single(link) => Some(link),
            LinkValue::Many(links) => links.first(),
        }
    }

    pub fn first(&self) -> Option<&Link> {
        self.nav("first")
    }

    pub fn prev(&self) -> Option<&Link> {
        self.nav("prev")
    }

    pub fn next(&self) -> Option<&Link> {
        self.nav("next")
    }

    pub fn last(&self) -> Option<&Link> {
        self.nav("last")
    }
}

/// Whether a collection carries a `page` block
pub fn has_pagination(resource: &Resource) -> bool {
    resource.get("page").is_some()
}

/// Page metadata and navigation links of a collection
///
/// `None` for unpaged collections and for malformed page blocks.
pub fn get_pagination(resource: &Resource) -> Option<Pagination> {
    let page = resource.get("page")?;
    let page: PageMetadata = serde_json::from_value(page.clone()).ok()?;
    Some(Pagination {
        page,
        links: resource.links.clone(),
    })
}
