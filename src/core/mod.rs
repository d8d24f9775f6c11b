//! Core module containing the hypermedia data model

pub mod builder;
pub mod embedded;
pub mod error;
pub mod link;
pub mod query;
pub mod resource;
pub mod template;

pub use builder::{CollectionBuilder, LinkBuilder, LinksBuilder, ResourceBuilder};
pub use embedded::{add_item, add_link, delete_item, remove_link, set_item, unwrap, unwrap_typed};
pub use error::{ApiProblem, FieldError, HalError, ProtocolError, StoreError, TransportError};
pub use link::{Link, LinkValue, Links, SELF_REL};
pub use query::{PageMetadata, Pagination, PaginationOption, QueryParams, build_page_params, get_pagination, has_pagination};
pub use resource::{Embedded, EmbeddedValue, Payload, Resource};
pub use template::{Property, PropertyOptions, Template, Templates};
