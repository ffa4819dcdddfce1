//! Wrapping raw objects into resources according to their metadata.

use crate::error::{HalError, HalResult};
use crate::extractor::{EntityExtractor, ExtractionCache};
use crate::metadata::Metadata;
use crate::object::{Field, FieldMap, HalObject, ObjectRef};
use crate::resource::{Collection, Entity, EntityValue, Resource};
use reinhardt_hal_links::{Link, LinkCollection, Route, SELF_RELATION};
use serde_json::Value;
use std::sync::Arc;

/// Builds entities and collections from objects and their [`Metadata`].
#[derive(Clone)]
pub struct ResourceFactory {
	extractor: Arc<EntityExtractor>,
}

impl ResourceFactory {
	pub fn new(extractor: Arc<EntityExtractor>) -> Self {
		Self { extractor }
	}

	pub fn extractor(&self) -> &Arc<EntityExtractor> {
		&self.extractor
	}

	/// Creates an entity, or a collection when the metadata says so.
	///
	/// The entity identifier is read from the extracted fields. With
	/// `render_embedded_entities` off the entity keeps its identifier and
	/// links but renders no fields.
	///
	/// # Errors
	///
	/// - [`HalError::MissingIdentifier`] when the identifier field is configured
	///   but absent or null
	/// - [`HalError::MissingSelfRoute`] when a self link is forced but cannot
	///   be built
	/// - link errors from invalid static links
	pub fn create_entity_from_metadata(
		&self,
		object: &ObjectRef,
		metadata: &Metadata,
		render_embedded_entities: bool,
	) -> HalResult<Resource> {
		self.create_entity_with_cache(
			object,
			metadata,
			render_embedded_entities,
			&ExtractionCache::new(),
		)
	}

	/// Same as [`ResourceFactory::create_entity_from_metadata`], reusing
	/// extractions remembered in `cache`.
	pub fn create_entity_with_cache(
		&self,
		object: &ObjectRef,
		metadata: &Metadata,
		render_embedded_entities: bool,
		cache: &ExtractionCache,
	) -> HalResult<Resource> {
		if metadata.is_collection() {
			return self
				.create_collection_from_metadata(object, metadata)
				.map(Resource::Collection);
		}

		let fields = self.extractor.extract(object, cache)?;
		let id = entity_identifier(&fields, metadata)?;

		let value = if render_embedded_entities {
			EntityValue::Object(object.clone())
		} else {
			EntityValue::Fields(FieldMap::new())
		};
		let mut entity = Entity::new(value, id.clone());

		marshal_metadata_links(object.as_ref(), metadata, entity.links_mut())?;

		if metadata.force_self_link() && !entity.links().has(SELF_RELATION) {
			let link = self.marshal_self_link(
				object.as_ref(),
				metadata,
				id.as_ref(),
				Some(metadata.route_identifier_name()),
			)?;
			entity.links_mut().add(link);
		}

		Ok(Resource::Entity(entity))
	}

	/// Creates a collection over the members of `object`, copying the
	/// collection settings of `metadata`.
	///
	/// # Errors
	///
	/// Returns [`HalError::NotIterable`] when the object has no members.
	pub fn create_collection_from_metadata(
		&self,
		object: &ObjectRef,
		metadata: &Metadata,
	) -> HalResult<Collection> {
		let mut collection = Collection::from_object(object)?;
		collection
			.set_collection_name(metadata.collection_name())
			.set_collection_route_params(metadata.resolve_route_params(object.as_ref()))
			.set_collection_route_options(metadata.route_options().clone())
			.set_entity_route_params(metadata.entity_route_params().clone())
			.set_entity_route_options(metadata.entity_route_options().clone())
			.set_route_identifier_name(metadata.route_identifier_name())
			.set_entity_identifier_name(metadata.entity_identifier_name());
		if let Some(route) = metadata.route() {
			collection.set_collection_route(route);
		}
		if let Some(route) = metadata.entity_route() {
			collection.set_entity_route(route);
		}

		marshal_metadata_links(object.as_ref(), metadata, collection.links_mut())?;

		if metadata.force_self_link()
			&& !collection.links().has(SELF_RELATION)
			&& (metadata.has_url() || metadata.has_route())
		{
			let link = self.marshal_self_link(object.as_ref(), metadata, None, None)?;
			collection.links_mut().add(link);
		}

		Ok(collection)
	}

	/// Builds the `self` link described by `metadata`.
	///
	/// A configured URL wins over a route. Computed route params are
	/// evaluated against `object`, and the identifier is added under
	/// `route_identifier_name` when both are given.
	pub fn marshal_self_link(
		&self,
		object: &dyn HalObject,
		metadata: &Metadata,
		id: Option<&Value>,
		route_identifier_name: Option<&str>,
	) -> HalResult<Link> {
		let mut link = Link::new(SELF_RELATION);

		if let Some(url) = metadata.url() {
			link.set_url(url)?;
			return Ok(link);
		}

		let Some(name) = metadata.route() else {
			return Err(HalError::MissingSelfRoute {
				class: metadata.class().to_string(),
			});
		};

		let mut params = metadata.resolve_route_params(object);
		if let (Some(key), Some(id)) = (route_identifier_name, id) {
			params.insert(key.to_string(), id.clone());
		}

		link.set_route(
			Route::new(name)
				.with_params(params)
				.with_options(metadata.route_options().clone()),
		)?;
		Ok(link)
	}
}

fn entity_identifier(fields: &FieldMap, metadata: &Metadata) -> HalResult<Option<Value>> {
	let name = metadata.entity_identifier_name();
	if name.is_empty() {
		return Ok(None);
	}
	match fields.get(name) {
		Some(Field::Value(value)) if !value.is_null() => Ok(Some(value.clone())),
		_ => Err(HalError::MissingIdentifier {
			class: metadata.class().to_string(),
			field: name.to_string(),
		}),
	}
}

/// Adds the object's own links, then the static links of the metadata.
fn marshal_metadata_links(
	object: &dyn HalObject,
	metadata: &Metadata,
	links: &mut LinkCollection,
) -> HalResult<()> {
	if let Some(own) = object.links() {
		links.merge(&own);
	}
	for spec in metadata.links() {
		links.add(Link::from_spec(spec)?);
	}
	Ok(())
}
