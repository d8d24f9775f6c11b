//! Fluent builders for links and resources
//!
//! Used to assemble resources client-side: fixtures in tests, optimistic
//! placeholders, or documents handed to a mock transport.
//!
//! # Example
//!
//! ```rust,ignore
//! let teams = CollectionBuilder::new("http://api/teams?page=0&size=20")
//!     .with_items("teams", vec![team])
//!     .with_page(20, 1, 1, 0)
//!     .with_next("http://api/teams?page=1&size=20")
//!     .build()?;
//! ```

use crate::core::error::{HalError, ProtocolError};
use crate::core::link::{Link, LinkValue, Links, SELF_REL};
use crate::core::query::PageMetadata;
use crate::core::resource::{Embedded, EmbeddedValue, Payload, Resource};
use crate::core::template::{Template, Templates};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Builder for a single [`Link`]
pub struct LinkBuilder {
    link: Link,
}

impl LinkBuilder {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            link: Link::new(href),
        }
    }

    pub fn templated(mut self, templated: bool) -> Self {
        self.link.templated = Some(templated);
        self
    }

    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.link.media_type = Some(media_type.into());
        self
    }

    pub fn deprecation(mut self, deprecation: impl Into<String>) -> Self {
        self.link.deprecation = Some(deprecation.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.link.name = Some(name.into());
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.link.profile = Some(profile.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.link.title = Some(title.into());
        self
    }

    pub fn hreflang(mut self, hreflang: impl Into<String>) -> Self {
        self.link.hreflang = Some(hreflang.into());
        self
    }

    /// Attach a non-standard attribute
    pub fn custom(mut self, key: impl Into<String>, value: Value) -> Self {
        self.link.extra.insert(key.into(), value);
        self
    }

    pub fn build(self) -> Link {
        self.link
    }
}

/// Builder for a [`Links`] map
#[derive(Default)]
pub struct LinksBuilder {
    links: IndexMap<String, LinkValue>,
}

impl LinksBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_self(mut self, link: Link) -> Self {
        self.links.insert(SELF_REL.to_string(), LinkValue::Single(link));
        self
    }

    pub fn with_self_href(self, href: impl Into<String>) -> Self {
        self.with_self(Link::new(href))
    }

    pub fn with_link(mut self, rel: impl Into<String>, link: Link) -> Self {
        self.links.insert(rel.into(), LinkValue::Single(link));
        self
    }

    pub fn with_href(self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.with_link(rel, Link::new(href))
    }

    pub fn with_links(mut self, rel: impl Into<String>, links: Vec<Link>) -> Self {
        self.links.insert(rel.into(), LinkValue::Many(links));
        self
    }

    /// Fails when no self link was set
    pub fn build(self) -> Result<Links, ProtocolError> {
        Links::try_from(self.links)
    }
}

/// Builder for a [`Resource`] with an untyped payload
#[derive(Default)]
pub struct ResourceBuilder {
    links: LinksBuilder,
    data: Payload,
    embedded: Option<Embedded>,
    templates: Option<Templates>,
}

impl ResourceBuilder {
    /// Start a resource identified by `self_href`
    pub fn new(self_href: impl Into<String>) -> Self {
        Self {
            links: LinksBuilder::new().with_self_href(self_href),
            ..Default::default()
        }
    }

    /// Edit the links map
    pub fn with_links(mut self, f: impl FnOnce(LinksBuilder) -> LinksBuilder) -> Self {
        self.links = f(self.links);
        self
    }

    pub fn with_link(self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.with_links(|l| l.with_href(rel, href))
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.data.insert(name.into(), value);
        self
    }

    /// Merge the fields of a serializable value into the payload
    ///
    /// Non-object values are ignored.
    pub fn with_data(mut self, data: &impl Serialize) -> Result<Self, HalError> {
        if let Value::Object(map) =
            serde_json::to_value(data).map_err(|e| HalError::decode("builder payload", e))?
        {
            self.data.extend(map);
        }
        Ok(self)
    }

    pub fn with_embedded(mut self, rel: impl Into<String>, value: EmbeddedValue) -> Self {
        self.embedded
            .get_or_insert_with(Default::default)
            .insert(rel, value);
        self
    }

    pub fn with_embedded_items(self, rel: impl Into<String>, items: Vec<Resource>) -> Self {
        self.with_embedded(rel, EmbeddedValue::Many(items))
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.templates
            .get_or_insert_with(Default::default)
            .insert(template);
        self
    }

    /// Shortcut for a template with only a key and a method
    pub fn with_action(self, key: impl Into<String>, method: impl Into<String>) -> Self {
        self.with_template(Template::new(key, method))
    }

    pub fn build(self) -> Result<Resource, HalError> {
        Ok(Resource {
            links: self.links.build()?,
            embedded: self.embedded,
            templates: self.templates,
            data: self.data,
        })
    }
}

/// Builder for a (possibly paginated) collection resource
pub struct CollectionBuilder {
    inner: ResourceBuilder,
}

impl CollectionBuilder {
    pub fn new(self_href: impl Into<String>) -> Self {
        Self {
            inner: ResourceBuilder::new(self_href),
        }
    }

    pub fn with_items(mut self, rel: impl Into<String>, items: Vec<Resource>) -> Self {
        self.inner = self.inner.with_embedded_items(rel, items);
        self
    }

    pub fn with_page(mut self, size: u64, total_elements: u64, total_pages: u64, number: u64) -> Self {
        let page = PageMetadata {
            size,
            total_elements,
            total_pages,
            number,
        };
        self.inner = self
            .inner
            .with_field("page", serde_json::json!(page));
        self
    }

    pub fn with_link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.inner = self.inner.with_link(rel, href);
        self
    }

    pub fn with_first(mut self, href: impl Into<String>) -> Self {
        self.inner = self.inner.with_link("first", href);
        self
    }

    pub fn with_prev(mut self, href: impl Into<String>) -> Self {
        self.inner = self.inner.with_link("prev", href);
        self
    }

    pub fn with_next(mut self, href: impl Into<String>) -> Self {
        self.inner = self.inner.with_link("next", href);
        self
    }

    pub fn with_last(mut self, href: impl Into<String>) -> Self {
        self.inner = self.inner.with_link("last", href);
        self
    }

    pub fn with_action(mut self, key: impl Into<String>, method: impl Into<String>) -> Self {
        self.inner = self.inner.with_action(key, method);
        self
    }

    pub fn build(self) -> Result<Resource, HalError> {
        self.inner.build()
    }
}
