//! Resource stores: reactive caches over the hypermedia client
//!
//! - [`ResourceStore`]: one page (or the whole) of a collection, with
//!   pagination and cache patching after mutations
//! - [`DetailStore`]: one selected item, resolved from the collection cache
//!   before any request

pub mod collection;
pub mod detail;
pub mod state;

pub use collection::ResourceStore;
pub use detail::DetailStore;
pub use state::{CellState, ResourceStatus};
