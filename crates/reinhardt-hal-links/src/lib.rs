//! Hypermedia links for Reinhardt HAL.
//!
//! This crate provides the link layer of HAL documents:
//!
//! - **Link**: one or more relations targeting an explicit URL or a named route
//! - **LinkCollection**: ordered relation-keyed storage with idempotent merge
//! - **Extractors**: conversion of links into `_links` representations through
//!   a pluggable [`UrlBuilder`]
//! - **RouteTable**: a reference [`UrlBuilder`] for `{param}` path patterns
//!
//! # Quick Start
//!
//! ```rust
//! use reinhardt_hal_links::{
//!     Link, LinkCollection, LinkCollectionExtractor, LinkExtractor, Route, RouteTable,
//! };
//! use std::sync::Arc;
//!
//! let table = RouteTable::new().route("user", "/users/{id}");
//! let extractor = LinkCollectionExtractor::new(LinkExtractor::new(Arc::new(table)));
//!
//! let mut links = LinkCollection::new();
//! links.add(Link::new("self").with_route(Route::new("user").with_param("id", 1)).unwrap());
//!
//! let rendered = extractor.extract(&links).unwrap();
//! assert_eq!(rendered["self"]["href"], "/users/1");
//! ```

pub mod collection;
pub mod error;
pub mod extractor;
pub mod link;
pub mod routing;

// Re-export main types for convenience
pub use collection::{LinkCollection, Relation, SELF_RELATION};
pub use error::{LinkError, LinkResult};
pub use extractor::{LinkCollectionExtractor, LinkExtractor, UrlBuilder};
pub use link::{Link, LinkSpec, RelSpec, Route, RouteOptions, RouteParams, RouteSpec};
pub use routing::RouteTable;

/// Commonly used link types.
pub mod prelude {
	pub use crate::{
		Link, LinkCollection, LinkCollectionExtractor, LinkError, LinkExtractor, LinkResult,
		Relation, Route, RouteOptions, RouteParams, UrlBuilder,
	};
}
