//! Render hooks and the collection member identifier hook.

use super::Payload;
use crate::object::{Field, FieldMap};
use crate::resource::{Collection, Entity};
use reinhardt_hal_links::{RouteOptions, RouteParams};
use serde_json::Value;

/// A collection member about to be rendered.
///
/// Listeners may replace the member or change the route used for its
/// `self` link.
pub struct MemberRenderContext<'a> {
	pub collection: &'a Collection,
	pub member: Field,
	pub route: Option<String>,
	pub route_params: RouteParams,
	pub route_options: RouteOptions,
}

/// Observes and adjusts rendering. Every hook defaults to doing nothing.
pub trait RenderListener: Send + Sync {
	fn on_render_entity(&self, _entity: &Entity) {}

	fn on_render_entity_post(&self, _entity: &Entity, _payload: &mut Payload) {}

	fn on_render_collection(&self, _collection: &Collection) {}

	fn on_render_collection_post(&self, _collection: &Collection, _payload: &mut Payload) {}

	fn on_render_collection_entity(&self, _context: &mut MemberRenderContext<'_>) {}
}

/// Finds the identifier of a plain collection member.
pub trait IdentifierResolver: Send + Sync {
	/// Returns `None` when the member has no usable identifier.
	fn resolve(&self, fields: &FieldMap, identifier_name: &str) -> Option<Value>;
}

/// Reads the identifier from the field named by the collection, skipping
/// `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldIdentifierResolver;

impl IdentifierResolver for FieldIdentifierResolver {
	fn resolve(&self, fields: &FieldMap, identifier_name: &str) -> Option<Value> {
		fields
			.get(identifier_name)
			.and_then(Field::as_value)
			.filter(|value| !value.is_null())
			.cloned()
	}
}
