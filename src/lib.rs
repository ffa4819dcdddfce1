//! # Reinhardt HAL
//!
//! Hypermedia (HAL) rendering for Reinhardt.
//!
//! Reinhardt HAL converts domain objects, and paginated sets of them, into
//! HAL documents: JSON objects carrying `_links` generated from named routes
//! or explicit URLs, and `_embedded` sub-resources. Rendering is driven by a
//! per-class metadata map, guards against circular object graphs and can cap
//! the nesting depth per class.
//!
//! ## Crates
//!
//! - [`links`]: links, link collections, link extraction and the reference
//!   [`RouteTable`] URL builder
//! - [`core`]: objects and fields, hydrators, metadata, resources,
//!   pagination and the [`Hal`] renderer
//!
//! ## Quick Example
//!
//! ```rust
//! use reinhardt_hal::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let routes = RouteTable::new()
//!     .route("users", "/users")
//!     .route("user", "/users/{id}");
//! let hal = Hal::builder(Arc::new(routes)).build();
//!
//! let users = (1..=3)
//!     .map(|id| Field::Value(json!({"id": id, "name": format!("user {id}")})))
//!     .collect::<Vec<_>>();
//! let mut collection = hal.create_collection(Field::List(users), Some("users")).unwrap();
//! collection.set_entity_route("user");
//!
//! let document = hal.render_collection(&mut collection).unwrap().into_value().unwrap();
//! assert_eq!(document["_links"]["self"]["href"], "/users");
//! assert_eq!(document["_embedded"]["items"][2]["_links"]["self"]["href"], "/users/3");
//! assert_eq!(document["total_items"], 3);
//! ```
//!
//! ## Configuration
//!
//! Renderer options and per-class metadata can be loaded from TOML with
//! [`HalConfig`] and applied with [`HalBuilder::from_config`]; hydrators are
//! referred to by name and resolved against a [`HydratorRegistry`].

pub use reinhardt_hal_core as core;
pub use reinhardt_hal_links as links;

// Re-export main types for convenience
pub use reinhardt_hal_core::{
	ApiProblem, ArrayPaginator, ClosureHydrator, Collection, CollectionSource, Entity,
	EntityValue, ExtractionCache, ExtractionStrategy, Field, FieldMap, Hal, HalBuilder,
	HalConfig, HalError, HalObject, HalOptions, HalResult, Hydrator, HydratorRegistry,
	IdentifierResolver, Metadata, MetadataMap, MetadataOptions, ObjectRef, Paginator, Payload,
	RenderListener, Rendered, Resource, RouteParam, SerdeHydrator, TypeInfo,
	fields_from_serialize,
};
pub use reinhardt_hal_links::{
	Link, LinkCollection, LinkError, LinkResult, LinkSpec, Relation, Route, RouteOptions,
	RouteParams, RouteTable, UrlBuilder,
};

/// Everything needed to configure a renderer and render resources.
pub mod prelude {
	pub use crate::{
		ArrayPaginator, Collection, CollectionSource, Entity, Field, FieldMap, Hal, HalBuilder,
		HalConfig, HalError, HalObject, HalResult, Link, LinkCollection, Metadata, MetadataMap,
		ObjectRef, Paginator, Rendered, Resource, Route, RouteOptions, RouteTable, TypeInfo,
		fields_from_serialize,
	};
}
