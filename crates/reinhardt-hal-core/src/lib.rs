//! HAL resource rendering for Reinhardt.
//!
//! This crate turns domain objects into HAL documents: JSON objects carrying
//! `_links` and `_embedded`.
//!
//! - **Objects**: anything implementing [`HalObject`], extracted into a
//!   [`FieldMap`] by hydrators or by the object's own capabilities
//! - **Metadata**: per-class rendering configuration, built once into an
//!   immutable [`MetadataMap`]
//! - **Resources**: [`Entity`] and [`Collection`], optionally paginated
//! - **Renderer**: [`Hal`], with embedding, pagination links and
//!   circular reference protection
//!
//! # Quick Start
//!
//! ```rust
//! use reinhardt_hal_core::{
//!     fields_from_serialize, FieldMap, Hal, HalObject, HalResult, Metadata, MetadataMap,
//!     ObjectRef,
//! };
//! use reinhardt_hal_links::RouteTable;
//! use serde::Serialize;
//! use std::any::Any;
//! use std::sync::Arc;
//!
//! #[derive(Serialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! impl HalObject for User {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!
//!     fn public_fields(&self) -> Option<HalResult<FieldMap>> {
//!         Some(fields_from_serialize(self))
//!     }
//! }
//!
//! let metadata = MetadataMap::builder()
//!     .insert(Metadata::for_type::<User>().with_route("user"))
//!     .build()
//!     .unwrap();
//! let hal = Hal::builder(Arc::new(RouteTable::new().route("user", "/users/{id}")))
//!     .metadata_map(metadata)
//!     .build();
//!
//! let user: ObjectRef = Arc::new(User { id: 7, name: "Ann".to_string() });
//! let entity = hal.create_entity(user, "user", "id").unwrap().into_entity().unwrap();
//! let payload = hal.render_entity(&entity).unwrap();
//!
//! assert_eq!(payload["name"], "Ann");
//! assert_eq!(payload["_links"]["self"]["href"], "/users/7");
//! ```

pub mod config;
pub mod error;
pub mod extractor;
pub mod factory;
pub mod hydrator;
pub mod injector;
pub mod metadata;
pub mod object;
pub mod renderer;
pub mod resource;

pub use config::HalConfig;
pub use error::{ApiProblem, HalError, HalResult};
pub use extractor::{EntityExtractor, ExtractionCache, ExtractionStrategy};
pub use factory::ResourceFactory;
pub use hydrator::{
	ClosureHydrator, EntityHydratorManager, Hydrator, HydratorRegistry, SerdeHydrator,
};
pub use injector::{Pagination, PaginationInjector, SelfLinkInjector};
pub use metadata::{
	DEFAULT_COLLECTION_NAME, DEFAULT_IDENTIFIER_NAME, Metadata, MetadataMap, MetadataMapBuilder,
	MetadataOptions, RouteParam,
};
pub use object::{
	Field, FieldMap, HalObject, ObjectId, ObjectRef, TypeInfo, fields_from_serialize,
	fields_from_value,
};
pub use renderer::{
	FieldIdentifierResolver, Hal, HalBuilder, HalOptions, IdentifierResolver,
	MemberRenderContext, Payload, RenderListener, Rendered, TraversalContext,
};
pub use resource::{
	ArrayPaginator, Collection, CollectionSource, DEFAULT_PAGE_SIZE, Entity, EntityValue,
	LinkCollectionAware, Paginator, Resource, SharedPaginator,
};

/// Commonly used rendering types.
pub mod prelude {
	pub use crate::{
		ArrayPaginator, Collection, CollectionSource, Entity, Field, FieldMap, Hal, HalBuilder,
		HalError, HalObject, HalResult, Metadata, MetadataMap, ObjectRef, Paginator, Rendered,
		Resource, fields_from_serialize,
	};
}
