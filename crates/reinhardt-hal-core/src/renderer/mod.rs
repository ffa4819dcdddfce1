//! The HAL renderer.
//!
//! [`Hal`] turns [`Entity`] and [`Collection`] resources into nested JSON
//! objects carrying `_links` and `_embedded`. Rendering only borrows the
//! renderer: traversal state and memoized extractions live in a
//! [`TraversalContext`] created for each top-level call and dropped when it
//! returns, so one instance can be shared between threads.

mod context;
mod listener;

pub use context::TraversalContext;
pub use listener::{
	FieldIdentifierResolver, IdentifierResolver, MemberRenderContext, RenderListener,
};

use crate::config::HalConfig;
use crate::error::{ApiProblem, HalError, HalResult};
use crate::extractor::{EntityExtractor, ExtractionCache, ExtractionStrategy};
use crate::factory::ResourceFactory;
use crate::hydrator::{EntityHydratorManager, Hydrator, HydratorRegistry};
use crate::injector::{Pagination, PaginationInjector, SelfLinkInjector};
use crate::metadata::{DEFAULT_IDENTIFIER_NAME, Metadata, MetadataMap};
use crate::object::{Field, FieldMap, ObjectId, ObjectRef, fields_from_value};
use crate::resource::{
	Collection, CollectionSource, Entity, EntityValue, LinkCollectionAware, Resource,
};
use reinhardt_hal_links::{
	Link, LinkCollection, LinkCollectionExtractor, LinkExtractor, Route, SELF_RELATION,
	UrlBuilder,
};
use serde_json::{Map, Value};
use std::sync::Arc;

/// A rendered HAL document.
pub type Payload = Map<String, Value>;

const LINKS_KEY: &str = "_links";
const EMBEDDED_KEY: &str = "_embedded";

/// Renderer switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalOptions {
	/// Entities created from metadata for nested fields carry their fields.
	/// When off they render links only.
	pub render_embedded_entities: bool,
	/// Entity members of collections render their fields. When off they
	/// render links only.
	pub render_collections: bool,
}

impl Default for HalOptions {
	fn default() -> Self {
		Self {
			render_embedded_entities: true,
			render_collections: true,
		}
	}
}

/// Outcome of rendering a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
	Payload(Payload),
	Problem(ApiProblem),
}

impl Rendered {
	pub fn payload(&self) -> Option<&Payload> {
		match self {
			Rendered::Payload(payload) => Some(payload),
			Rendered::Problem(_) => None,
		}
	}

	pub fn into_payload(self) -> Option<Payload> {
		match self {
			Rendered::Payload(payload) => Some(payload),
			Rendered::Problem(_) => None,
		}
	}

	pub fn problem(&self) -> Option<&ApiProblem> {
		match self {
			Rendered::Problem(problem) => Some(problem),
			Rendered::Payload(_) => None,
		}
	}

	/// The JSON body: the document, or the problem report.
	pub fn into_value(self) -> HalResult<Value> {
		match self {
			Rendered::Payload(payload) => Ok(Value::Object(payload)),
			Rendered::Problem(problem) => Ok(serde_json::to_value(problem)?),
		}
	}
}

/// Renders HAL resources.
///
/// # Examples
///
/// ```
/// use reinhardt_hal_core::{Entity, FieldMap, Field, Hal};
/// use reinhardt_hal_links::RouteTable;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let hal = Hal::builder(Arc::new(RouteTable::new().route("user", "/users/{id}"))).build();
///
/// let mut fields = FieldMap::new();
/// fields.insert("id".to_string(), Field::Value(json!(1)));
/// let mut entity = Entity::new(fields, Some(json!(1)));
/// hal.inject_self_link(&mut entity, "user", "id").unwrap();
///
/// let payload = hal.render_entity(&entity).unwrap();
/// assert_eq!(payload["_links"]["self"]["href"], "/users/1");
/// ```
pub struct Hal {
	metadata_map: Arc<MetadataMap>,
	hydrators: Arc<EntityHydratorManager>,
	extractor: Arc<EntityExtractor>,
	factory: ResourceFactory,
	link_extractor: LinkCollectionExtractor,
	self_link_injector: SelfLinkInjector,
	pagination_injector: PaginationInjector,
	identifier_resolver: Arc<dyn IdentifierResolver>,
	listeners: Vec<Arc<dyn RenderListener>>,
	options: HalOptions,
}

impl Hal {
	pub fn builder(url_builder: Arc<dyn UrlBuilder>) -> HalBuilder {
		HalBuilder::new(url_builder)
	}

	pub fn metadata_map(&self) -> &Arc<MetadataMap> {
		&self.metadata_map
	}

	pub fn hydrators(&self) -> &Arc<EntityHydratorManager> {
		&self.hydrators
	}

	pub fn resource_factory(&self) -> &ResourceFactory {
		&self.factory
	}

	pub fn link_extractor(&self) -> &LinkCollectionExtractor {
		&self.link_extractor
	}

	pub fn options(&self) -> HalOptions {
		self.options
	}

	pub fn set_render_embedded_entities(&mut self, render: bool) -> &mut Self {
		self.options.render_embedded_entities = render;
		self
	}

	pub fn set_render_collections(&mut self, render: bool) -> &mut Self {
		self.options.render_collections = render;
		self
	}

	/// Forgets hydrators remembered from metadata.
	///
	/// Extractions are only memoized within a single render call, so there is
	/// no per-object state to reset between renders.
	pub fn reset(&self) {
		self.hydrators.clear_resolved();
	}

	/// Renders an entity from the top of the tree.
	pub fn render_entity(&self, entity: &Entity) -> HalResult<Payload> {
		self.render_entity_with(entity, true, 0, None)
	}

	/// Renders an entity at `depth`.
	///
	/// `max_depth` defaults to the entity's metadata. Without one, objects are
	/// tracked along the rendering path and a revisit fails with
	/// [`HalError::CircularReference`]. With one, content deeper than
	/// `max_depth` renders links only. `render_entity = false` also renders
	/// links only.
	pub fn render_entity_with(
		&self,
		entity: &Entity,
		render_entity: bool,
		depth: usize,
		max_depth: Option<usize>,
	) -> HalResult<Payload> {
		tracing::debug!(depth, ?max_depth, "rendering entity");
		self.render_entity_in(entity, render_entity, &TraversalContext::at_depth(depth), max_depth)
	}

	/// Renders a collection.
	///
	/// Pagination links are injected first; a page out of range yields
	/// [`Rendered::Problem`].
	pub fn render_collection(&self, collection: &mut Collection) -> HalResult<Rendered> {
		tracing::debug!(collection = collection.collection_name(), "rendering collection");
		for listener in &self.listeners {
			listener.on_render_collection(collection);
		}

		if let Pagination::OutOfRange(problem) =
			self.pagination_injector.inject_pagination_links(collection)?
		{
			return Ok(Rendered::Problem(problem));
		}

		let max_depth = collection
			.source_type()
			.and_then(|info| self.metadata_map.get_type(info))
			.and_then(|metadata| metadata.max_depth());

		let mut payload = collection.attributes().clone();
		payload.insert(
			LINKS_KEY.to_string(),
			Value::Object(self.link_extractor.extract(collection.links())?),
		);
		let members = self.extract_collection(collection, &TraversalContext::new(), max_depth)?;
		let mut embedded = Payload::new();
		embedded.insert(collection.collection_name().to_string(), Value::Array(members));
		payload.insert(EMBEDDED_KEY.to_string(), Value::Object(embedded));

		match collection.source() {
			CollectionSource::Paginated(paginator) => {
				let (page_count, total_items) = {
					let paginator = paginator.lock();
					(paginator.count(), paginator.total_item_count())
				};
				payload.entry("page_count").or_insert(Value::from(page_count));
				payload
					.entry("page_size")
					.or_insert(Value::from(collection.page_size()));
				payload.entry("total_items").or_insert(Value::from(total_items));
				let has_pages = payload
					.get("page_count")
					.and_then(Value::as_u64)
					.is_some_and(|count| count > 0);
				let page = if has_pages { collection.page() } else { 0 };
				payload.insert("page".to_string(), Value::from(page));
			}
			CollectionSource::Items(items) => {
				payload.entry("total_items").or_insert(Value::from(items.len()));
			}
		}

		for listener in &self.listeners {
			listener.on_render_collection_post(collection, &mut payload);
		}
		Ok(Rendered::Payload(payload))
	}

	/// Wraps `value` in an entity and gives it a `self` link.
	///
	/// Objects with metadata go through the resource factory, and only get a
	/// `self` link from `route` when their metadata forces one. Other values
	/// become entities identified by their `id` field.
	pub fn create_entity(
		&self,
		value: impl Into<Field>,
		route: &str,
		route_identifier_name: &str,
	) -> HalResult<Resource> {
		let value = value.into();
		let metadata = self.metadata_for(&value);

		let mut resource = match (value, &metadata) {
			(Field::Object(object), Some(metadata)) => self.factory.create_entity_from_metadata(
				&object,
				metadata,
				self.options.render_embedded_entities,
			)?,
			(Field::Object(object), None) => {
				let fields = self.extractor.extract(&object, &ExtractionCache::new())?;
				let id = self.identifier_resolver.resolve(&fields, DEFAULT_IDENTIFIER_NAME);
				let own_links = object.links();
				let mut entity = Entity::new(object, id);
				if let Some(own_links) = own_links {
					entity.links_mut().merge(&own_links);
				}
				Resource::Entity(entity)
			}
			(Field::Entity(entity), _) => Resource::Entity(entity),
			(Field::Collection(collection), _) => Resource::Collection(*collection),
			(Field::Map(fields), _) => {
				let id = self.identifier_resolver.resolve(&fields, DEFAULT_IDENTIFIER_NAME);
				Resource::Entity(Entity::new(fields, id))
			}
			(Field::Value(value @ Value::Object(_)), _) => {
				let fields = fields_from_value("object", value)?;
				let id = self.identifier_resolver.resolve(&fields, DEFAULT_IDENTIFIER_NAME);
				Resource::Entity(Entity::new(fields, id))
			}
			(other, _) => {
				return Err(HalError::Extraction {
					class: field_kind(&other).to_string(),
					message: "cannot create an entity from this value".to_string(),
				});
			}
		};

		if metadata.as_ref().is_none_or(|metadata| metadata.force_self_link()) {
			match &mut resource {
				Resource::Entity(entity) => {
					self.inject_self_link(entity, route, route_identifier_name)?
				}
				Resource::Collection(collection) => {
					self.inject_self_link(collection, route, route_identifier_name)?
				}
			}
		}
		Ok(resource)
	}

	/// Wraps `source` in a collection, optionally routed.
	///
	/// Objects with metadata go through the resource factory. When `route` is
	/// given it becomes the collection route (unless one is set) and the
	/// `self` link (unless metadata disables forced self links).
	pub fn create_collection(
		&self,
		source: impl Into<Field>,
		route: Option<&str>,
	) -> HalResult<Collection> {
		let source = source.into();
		let metadata = self.metadata_for(&source);

		let mut collection = match (source, &metadata) {
			(Field::Object(object), Some(metadata)) => {
				self.factory.create_collection_from_metadata(&object, metadata)?
			}
			(Field::Object(object), None) => Collection::from_object(&object)?,
			(Field::Collection(collection), _) => *collection,
			(Field::List(items), _) => Collection::new(items),
			(Field::Value(Value::Array(values)), _) => {
				Collection::new(values.into_iter().map(Field::Value).collect::<Vec<_>>())
			}
			(other, _) => {
				return Err(HalError::NotIterable {
					class: field_kind(&other).to_string(),
				});
			}
		};

		if let Some(route) = route {
			if collection.collection_route().is_none() {
				collection.set_collection_route(route);
			}
			if metadata.as_ref().is_none_or(|metadata| metadata.force_self_link()) {
				self.inject_self_link(&mut collection, route, DEFAULT_IDENTIFIER_NAME)?;
			}
		}
		Ok(collection)
	}

	/// Injects a route based `self` link unless the resource has one.
	pub fn inject_self_link<R: LinkCollectionAware>(
		&self,
		resource: &mut R,
		route: impl Into<Route>,
		route_identifier_name: &str,
	) -> HalResult<()> {
		self.self_link_injector
			.inject_self_link(resource, route, route_identifier_name)
	}

	fn metadata_for(&self, field: &Field) -> Option<Arc<Metadata>> {
		match field {
			Field::Object(object) => self.metadata_map.get(object.as_ref()).cloned(),
			Field::Collection(collection) => collection
				.source_type()
				.and_then(|info| self.metadata_map.get_type(info))
				.cloned(),
			_ => None,
		}
	}

	/// Turns objects with metadata into resources; everything else is
	/// returned unchanged.
	fn promote(&self, field: Field, context: &TraversalContext) -> HalResult<Field> {
		match field {
			Field::Object(object) => match self.metadata_map.get(object.as_ref()) {
				Some(metadata) => Ok(self
					.factory
					.create_entity_with_cache(
						&object,
						metadata,
						self.options.render_embedded_entities,
						context.cache(),
					)?
					.into()),
				None => Ok(Field::Object(object)),
			},
			other => Ok(other),
		}
	}

	fn render_entity_in(
		&self,
		entity: &Entity,
		render_entity: bool,
		context: &TraversalContext,
		max_depth: Option<usize>,
	) -> HalResult<Payload> {
		for listener in &self.listeners {
			listener.on_render_entity(entity);
		}

		let object = entity.value().object();
		let max_depth = max_depth.or_else(|| {
			object
				.and_then(|object| self.metadata_map.get(object.as_ref()))
				.and_then(|metadata| metadata.max_depth())
		});

		let mut context = context.clone();
		if max_depth.is_none() {
			if let Some(object) = object {
				guard_revisit(&mut context, object)?;
			}
		}

		let truncated = !render_entity || max_depth.is_some_and(|max| context.depth() > max);
		let fields = match entity.value() {
			_ if truncated => FieldMap::new(),
			EntityValue::Object(object) => self.extractor.extract(object, context.cache())?,
			EntityValue::Fields(fields) => fields.clone(),
		};

		let mut links = entity.links().clone();
		let mut payload = Payload::new();
		let mut embedded = Payload::new();
		for (key, field) in fields {
			match self.promote(field, &context)? {
				Field::Entity(child) => {
					let rendered = self.render_entity_in(&child, true, &context.child(), max_depth)?;
					embedded.insert(key, Value::Object(rendered));
				}
				Field::Collection(child) => {
					let members = self.extract_collection(&child, &context.child(), max_depth)?;
					embedded.insert(key, Value::Array(members));
				}
				Field::Link(link) => {
					links.idempotent_add(link);
				}
				Field::Links(collection) => {
					links.merge(&collection);
				}
				other => {
					payload.insert(key, self.plainify(other, &context, max_depth)?);
				}
			}
		}

		if !embedded.is_empty() {
			payload.insert(EMBEDDED_KEY.to_string(), Value::Object(embedded));
		}
		payload.insert(
			LINKS_KEY.to_string(),
			Value::Object(self.link_extractor.extract(&links)?),
		);

		for listener in &self.listeners {
			listener.on_render_entity_post(entity, &mut payload);
		}
		Ok(payload)
	}

	/// Renders the members of a collection. Members stay at the depth of
	/// the collection itself.
	fn extract_collection(
		&self,
		collection: &Collection,
		context: &TraversalContext,
		max_depth: Option<usize>,
	) -> HalResult<Vec<Value>> {
		let mut rendered = Vec::new();
		for member in collection.source().members() {
			let mut member_context = MemberRenderContext {
				collection,
				member,
				route: collection.entity_route().map(str::to_string),
				route_params: collection.entity_route_params().clone(),
				route_options: collection.entity_route_options().clone(),
			};
			for listener in &self.listeners {
				listener.on_render_collection_entity(&mut member_context);
			}

			let MemberRenderContext {
				member,
				route,
				route_params,
				route_options,
				..
			} = member_context;
			let self_route = route.map(|name| {
				Route::new(name)
					.with_params(route_params)
					.with_options(route_options)
			});
			rendered.push(self.render_member(collection, member, self_route, context, max_depth)?);
		}
		Ok(rendered)
	}

	fn render_member(
		&self,
		collection: &Collection,
		member: Field,
		self_route: Option<Route>,
		context: &TraversalContext,
		max_depth: Option<usize>,
	) -> HalResult<Value> {
		let own_links = match &member {
			Field::Object(object) => object.links(),
			_ => None,
		};

		let mut scope = context.clone();
		let fields = match self.promote(member, context)? {
			Field::Entity(entity) => {
				let payload = self.render_entity_in(
					&entity,
					self.options.render_collections,
					context,
					max_depth,
				)?;
				return Ok(Value::Object(payload));
			}
			Field::Collection(nested) => {
				return Ok(Value::Array(self.extract_collection(&nested, context, max_depth)?));
			}
			Field::Object(object) => {
				if max_depth.is_none() {
					guard_revisit(&mut scope, &object)?;
				}
				self.extractor.extract(&object, scope.cache())?
			}
			Field::Map(fields) => fields,
			Field::Value(value @ Value::Object(_)) => fields_from_value("object", value)?,
			other => return self.plainify(other, context, max_depth),
		};

		let id = self
			.identifier_resolver
			.resolve(&fields, collection.entity_identifier_name());

		let mut member_links: Option<LinkCollection> = None;
		let mut payload = Payload::new();
		let mut embedded = Payload::new();
		for (key, field) in fields {
			match self.promote(field, &scope)? {
				Field::Entity(child) => {
					let rendered = self.render_entity_in(&child, true, &scope.child(), max_depth)?;
					embedded.insert(key, Value::Object(rendered));
				}
				Field::Collection(child) => {
					let members = self.extract_collection(&child, &scope.child(), max_depth)?;
					embedded.insert(key, Value::Array(members));
				}
				Field::Links(links) if key == "links" => member_links = Some(links),
				other => {
					payload.insert(key, self.plainify(other, &scope, max_depth)?);
				}
			}
		}
		if !embedded.is_empty() {
			payload.insert(EMBEDDED_KEY.to_string(), Value::Object(embedded));
		}

		let Some(id) = id else {
			tracing::debug!(
				collection = collection.collection_name(),
				"collection member has no identifier; rendering it unchanged"
			);
			if let Some(links) = member_links {
				payload.insert(
					"links".to_string(),
					Value::Object(self.link_extractor.extract(&links)?),
				);
			}
			return Ok(Value::Object(payload));
		};

		let mut links = member_links.or(own_links).unwrap_or_default();
		if let Some(mut route) = self_route {
			route
				.params
				.insert(collection.route_identifier_name().to_string(), id);
			links.add(Link::new(SELF_RELATION).with_route(route)?);
		}
		payload.insert(
			LINKS_KEY.to_string(),
			Value::Object(self.link_extractor.extract(&links)?),
		);
		Ok(Value::Object(payload))
	}

	/// Converts a field into plain JSON. Objects without metadata become
	/// nested objects of their extracted fields.
	fn plainify(
		&self,
		field: Field,
		context: &TraversalContext,
		max_depth: Option<usize>,
	) -> HalResult<Value> {
		match self.promote(field, context)? {
			Field::Value(value) => Ok(value),
			Field::Map(fields) => {
				let mut map = Map::new();
				for (key, field) in fields {
					map.insert(key, self.plainify(field, context, max_depth)?);
				}
				Ok(Value::Object(map))
			}
			Field::List(items) => items
				.into_iter()
				.map(|item| self.plainify(item, context, max_depth))
				.collect::<HalResult<Vec<_>>>()
				.map(Value::Array),
			Field::Object(object) => {
				let mut scope = context.clone();
				guard_revisit(&mut scope, &object)?;
				let mut map = Map::new();
				for (key, field) in self.extractor.extract(&object, scope.cache())? {
					map.insert(key, self.plainify(field, &scope, max_depth)?);
				}
				Ok(Value::Object(map))
			}
			Field::Entity(entity) => self
				.render_entity_in(&entity, true, &context.child(), max_depth)
				.map(Value::Object),
			Field::Collection(collection) => self
				.extract_collection(&collection, &context.child(), max_depth)
				.map(Value::Array),
			Field::Link(link) => Ok(Value::Object(
				self.link_extractor.link_extractor().extract(&link)?,
			)),
			Field::Links(links) => Ok(Value::Object(self.link_extractor.extract(&links)?)),
		}
	}
}

fn guard_revisit(context: &mut TraversalContext, object: &ObjectRef) -> HalResult<()> {
	if context.visit(ObjectId::of(object)) {
		return Ok(());
	}
	let class = object.type_info().display_name();
	tracing::warn!(class, "circular reference detected");
	Err(HalError::CircularReference {
		class: class.to_string(),
	})
}

fn field_kind(field: &Field) -> &'static str {
	match field {
		Field::Value(Value::Array(_)) => "array",
		Field::Value(Value::Object(_)) => "object",
		Field::Value(_) => "scalar",
		Field::Map(_) => "map",
		Field::List(_) => "list",
		Field::Object(object) => object.type_info().display_name(),
		Field::Entity(_) => "entity",
		Field::Collection(_) => "collection",
		Field::Link(_) => "link",
		Field::Links(_) => "link collection",
	}
}

/// Configures and builds a [`Hal`] renderer.
pub struct HalBuilder {
	url_builder: Arc<dyn UrlBuilder>,
	metadata_map: MetadataMap,
	default_hydrator: Option<Arc<dyn Hydrator>>,
	hydrators: Vec<(String, Arc<dyn Hydrator>)>,
	strategies: Vec<ExtractionStrategy>,
	identifier_resolver: Arc<dyn IdentifierResolver>,
	listeners: Vec<Arc<dyn RenderListener>>,
	options: HalOptions,
}

impl HalBuilder {
	pub fn new(url_builder: Arc<dyn UrlBuilder>) -> Self {
		Self {
			url_builder,
			metadata_map: MetadataMap::default(),
			default_hydrator: None,
			hydrators: Vec::new(),
			strategies: ExtractionStrategy::DEFAULT_ORDER.to_vec(),
			identifier_resolver: Arc::new(FieldIdentifierResolver),
			listeners: Vec::new(),
			options: HalOptions::default(),
		}
	}

	/// Applies a configuration: options, metadata and named hydrators.
	///
	/// # Errors
	///
	/// Fails when a hydrator name is unknown to `registry` or a metadata
	/// entry is invalid.
	pub fn from_config(
		config: &HalConfig,
		url_builder: Arc<dyn UrlBuilder>,
		registry: &HydratorRegistry,
	) -> HalResult<Self> {
		let mut builder = Self::new(url_builder)
			.options(config.options())
			.metadata_map(config.build_metadata_map(registry)?);
		if let Some(name) = &config.default_hydrator {
			builder = builder.default_hydrator(registry.resolve("*", name)?);
		}
		for (class, name) in &config.hydrators {
			builder = builder.hydrator(class.clone(), registry.resolve(class, name)?);
		}
		Ok(builder)
	}

	pub fn metadata_map(mut self, metadata_map: MetadataMap) -> Self {
		self.metadata_map = metadata_map;
		self
	}

	pub fn default_hydrator(mut self, hydrator: Arc<dyn Hydrator>) -> Self {
		self.default_hydrator = Some(hydrator);
		self
	}

	/// Uses `hydrator` for objects of exactly `class`.
	pub fn hydrator(mut self, class: impl Into<String>, hydrator: Arc<dyn Hydrator>) -> Self {
		self.hydrators.push((class.into(), hydrator));
		self
	}

	pub fn extraction_strategies(mut self, strategies: Vec<ExtractionStrategy>) -> Self {
		self.strategies = strategies;
		self
	}

	pub fn identifier_resolver(mut self, resolver: Arc<dyn IdentifierResolver>) -> Self {
		self.identifier_resolver = resolver;
		self
	}

	pub fn listener(mut self, listener: Arc<dyn RenderListener>) -> Self {
		self.listeners.push(listener);
		self
	}

	pub fn options(mut self, options: HalOptions) -> Self {
		self.options = options;
		self
	}

	pub fn render_embedded_entities(mut self, render: bool) -> Self {
		self.options.render_embedded_entities = render;
		self
	}

	pub fn render_collections(mut self, render: bool) -> Self {
		self.options.render_collections = render;
		self
	}

	pub fn build(self) -> Hal {
		let metadata_map = Arc::new(self.metadata_map);
		let hydrators = Arc::new(EntityHydratorManager::new(metadata_map.clone()));
		hydrators.set_default_hydrator(self.default_hydrator);
		for (class, hydrator) in self.hydrators {
			hydrators.add_hydrator(class, hydrator);
		}

		let extractor =
			Arc::new(EntityExtractor::new(hydrators.clone()).with_strategies(self.strategies));

		Hal {
			metadata_map,
			hydrators,
			factory: ResourceFactory::new(extractor.clone()),
			extractor,
			link_extractor: LinkCollectionExtractor::new(LinkExtractor::new(self.url_builder)),
			self_link_injector: SelfLinkInjector,
			pagination_injector: PaginationInjector,
			identifier_resolver: self.identifier_resolver,
			listeners: self.listeners,
			options: self.options,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::object::HalObject;
	use crate::resource::ArrayPaginator;
	use assert_json_diff::assert_json_eq;
	use parking_lot::Mutex;
	use reinhardt_hal_links::{RouteOptions, RouteTable};
	use rstest::{fixture, rstest};
	use serde_json::json;
	use std::any::Any;

	struct Tag {
		name: &'static str,
	}

	impl HalObject for Tag {
		fn as_any(&self) -> &dyn Any {
			self
		}

		fn serialize_fields(&self) -> Option<HalResult<Value>> {
			Some(Ok(json!({"name": self.name})))
		}
	}

	fn routes() -> Arc<RouteTable> {
		Arc::new(
			RouteTable::new()
				.route("users", "/users")
				.route("user", "/users/{id}"),
		)
	}

	#[fixture]
	fn hal() -> Hal {
		Hal::builder(routes()).build()
	}

	fn fields(value: Value) -> FieldMap {
		fields_from_value("test", value).unwrap()
	}

	#[rstest]
	fn test_embedded_entities_and_links(hal: Hal) {
		// Arrange
		let mut author = Entity::new(fields(json!({"id": 2, "name": "ann"})), Some(json!(2)));
		hal.inject_self_link(&mut author, "user", "id").unwrap();
		let mut root = fields(json!({"id": 1, "title": "post"}));
		root.insert("author".to_string(), Field::Entity(author));
		root.insert(
			"docs".to_string(),
			Field::Link(Link::new("describedby").with_url("/docs").unwrap()),
		);
		root.insert("tag".to_string(), Field::object(Tag { name: "rust" }));
		let entity = Entity::new(root, Some(json!(1)));

		// Act
		let payload = hal.render_entity(&entity).unwrap();

		// Assert
		assert_json_eq!(
			Value::Object(payload.clone()),
			json!({
				"id": 1,
				"title": "post",
				"tag": {"name": "rust"},
				"_embedded": {
					"author": {"id": 2, "name": "ann", "_links": {"self": {"href": "/users/2"}}}
				},
				"_links": {"describedby": {"href": "/docs"}}
			})
		);
		let keys: Vec<&String> = payload.keys().collect();
		assert_eq!(keys, vec!["id", "title", "tag", "_embedded", "_links"]);
	}

	#[rstest]
	fn test_render_entity_false_keeps_links_only(hal: Hal) {
		let mut entity = Entity::new(fields(json!({"id": 1, "name": "ann"})), Some(json!(1)));
		hal.inject_self_link(&mut entity, "user", "id").unwrap();

		let payload = hal.render_entity_with(&entity, false, 0, None).unwrap();

		assert_json_eq!(
			Value::Object(payload),
			json!({"_links": {"self": {"href": "/users/1"}}})
		);
	}

	#[rstest]
	fn test_render_does_not_mutate_entity_links(hal: Hal) {
		let mut root = fields(json!({"id": 1}));
		root.insert(
			"docs".to_string(),
			Field::Link(Link::new("describedby").with_url("/docs").unwrap()),
		);
		let entity = Entity::new(root, Some(json!(1)));

		hal.render_entity(&entity).unwrap();
		hal.render_entity(&entity).unwrap();

		assert!(entity.links().is_empty());
	}

	#[rstest]
	fn test_plain_collection_members(hal: Hal) {
		// Arrange
		let mut collection = Collection::new(vec![
			Field::Value(json!({"id": 1, "name": "ann"})),
			Field::Value(json!({"name": "anonymous"})),
			Field::Value(json!("scalar")),
		]);
		collection.set_entity_route("user");
		collection.set_collection_name("users");
		collection.links_mut().add(Link::new("self").with_route("users").unwrap());

		// Act
		let rendered = hal.render_collection(&mut collection).unwrap();

		// Assert
		assert_json_eq!(
			rendered.into_value().unwrap(),
			json!({
				"_links": {"self": {"href": "/users"}},
				"_embedded": {"users": [
					{"id": 1, "name": "ann", "_links": {"self": {"href": "/users/1"}}},
					{"name": "anonymous"},
					"scalar"
				]},
				"total_items": 3
			})
		);
	}

	#[rstest]
	fn test_member_links_field_becomes_links(hal: Hal) {
		let mut member = fields(json!({"id": 4}));
		let mut own = LinkCollection::new();
		own.add(Link::new("avatar").with_url("/avatars/4").unwrap());
		member.insert("links".to_string(), Field::Links(own));
		let mut collection = Collection::new(vec![Field::Map(member)]);

		let payload = hal.render_collection(&mut collection).unwrap().into_payload().unwrap();

		assert_json_eq!(
			payload["_embedded"]["items"][0].clone(),
			json!({"id": 4, "_links": {"avatar": {"href": "/avatars/4"}}})
		);
	}

	#[rstest]
	fn test_paginated_collection_fields(hal: Hal) {
		// Arrange
		let paginator = ArrayPaginator::from_values((1..=25).map(|id| json!({"id": id})));
		let mut collection = Collection::new(CollectionSource::paginated(paginator));
		collection.set_collection_route("users");
		collection.set_entity_route("user");
		collection.set_page_size(10).unwrap();
		collection.set_page(3).unwrap();

		// Act
		let payload = hal.render_collection(&mut collection).unwrap().into_payload().unwrap();

		// Assert
		assert_eq!(payload["page_count"], json!(3));
		assert_eq!(payload["page_size"], json!(10));
		assert_eq!(payload["total_items"], json!(25));
		assert_eq!(payload["page"], json!(3));
		assert_eq!(payload["_embedded"]["items"].as_array().unwrap().len(), 5);
		assert_eq!(payload["_links"]["prev"]["href"], json!("/users?page=2"));
		assert!(payload["_links"].get("next").is_none());
	}

	#[rstest]
	fn test_preset_attributes_are_kept(hal: Hal) {
		let paginator = ArrayPaginator::from_values((1..=5).map(|id| json!({"id": id})));
		let mut collection = Collection::new(CollectionSource::paginated(paginator));
		collection.set_collection_route("users");
		collection.set_attribute("total_items", 500);

		let payload = hal.render_collection(&mut collection).unwrap().into_payload().unwrap();

		assert_eq!(payload["total_items"], json!(500));
		assert_eq!(payload["page_count"], json!(1));
	}

	#[rstest]
	fn test_out_of_range_page_is_a_problem(hal: Hal) {
		let paginator = ArrayPaginator::from_values((1..=5).map(|id| json!({"id": id})));
		let mut collection = Collection::new(CollectionSource::paginated(paginator));
		collection.set_collection_route("users");
		collection.set_page(2).unwrap();

		let rendered = hal.render_collection(&mut collection).unwrap();

		assert_eq!(rendered.problem().map(|p| p.status), Some(409));
	}

	#[derive(Default)]
	struct Recorder {
		events: Mutex<Vec<&'static str>>,
	}

	impl RenderListener for Recorder {
		fn on_render_entity(&self, _entity: &Entity) {
			self.events.lock().push("entity");
		}

		fn on_render_entity_post(&self, _entity: &Entity, payload: &mut Payload) {
			self.events.lock().push("entity.post");
			payload.insert("rendered".to_string(), json!(true));
		}

		fn on_render_collection(&self, _collection: &Collection) {
			self.events.lock().push("collection");
		}

		fn on_render_collection_post(&self, _collection: &Collection, _payload: &mut Payload) {
			self.events.lock().push("collection.post");
		}

		fn on_render_collection_entity(&self, context: &mut MemberRenderContext<'_>) {
			self.events.lock().push("collection.entity");
			context.route = Some("user".to_string());
		}
	}

	#[rstest]
	fn test_listeners_are_notified() {
		// Arrange
		let recorder = Arc::new(Recorder::default());
		let hal = Hal::builder(routes()).listener(recorder.clone()).build();
		let mut collection = Collection::new(vec![
			Field::Value(json!({"id": 1})),
			Field::Entity(Entity::new(fields(json!({"id": 2})), Some(json!(2)))),
		]);

		// Act
		let payload = hal.render_collection(&mut collection).unwrap().into_payload().unwrap();

		// Assert
		assert_eq!(
			*recorder.events.lock(),
			vec![
				"collection",
				"collection.entity",
				"collection.entity",
				"entity",
				"entity.post",
				"collection.post"
			]
		);
		assert_eq!(payload["_embedded"]["items"][0]["_links"]["self"]["href"], json!("/users/1"));
		assert_eq!(payload["_embedded"]["items"][1]["rendered"], json!(true));
	}

	#[rstest]
	fn test_create_entity_from_plain_map(hal: Hal) {
		let resource = hal
			.create_entity(Field::Map(fields(json!({"id": 7}))), "user", "id")
			.unwrap();

		let entity = resource.into_entity().unwrap();
		let payload = hal.render_entity(&entity).unwrap();

		assert_eq!(entity.id(), Some(&json!(7)));
		assert_eq!(payload["_links"]["self"]["href"], json!("/users/7"));
	}

	#[rstest]
	fn test_create_entity_rejects_scalars(hal: Hal) {
		let result = hal.create_entity(json!(3), "user", "id");
		assert!(matches!(result, Err(HalError::Extraction { .. })));
	}

	#[rstest]
	fn test_create_collection_sets_route(hal: Hal) {
		let collection = hal
			.create_collection(json!([{"id": 1}]), Some("users"))
			.unwrap();

		assert_eq!(collection.collection_route(), Some("users"));
		assert!(collection.links().has("self"));
	}

	#[rstest]
	fn test_render_releases_extracted_objects(hal: Hal) {
		// Arrange
		let object: ObjectRef = Arc::new(Tag { name: "a" });
		let entity = Entity::new(object.clone(), None);
		let before = Arc::strong_count(&object);

		// Act
		hal.render_entity(&entity).unwrap();
		let mut collection = Collection::new(vec![Field::Object(object.clone())]);
		hal.render_collection(&mut collection).unwrap();
		drop(collection);

		// Assert
		assert_eq!(Arc::strong_count(&object), before);
	}

	#[rstest]
	fn test_reset_forgets_metadata_hydrators() {
		// Arrange
		let hydrator = crate::hydrator::ClosureHydrator::new(|_: &dyn HalObject| {
			let mut fields = FieldMap::new();
			fields.insert("name".to_string(), Field::Value(json!("hydrated")));
			Ok(fields)
		});
		let metadata = MetadataMap::builder()
			.insert(
				Metadata::for_type::<Tag>()
					.with_url("/tags/a")
					.with_identifier_name("")
					.with_hydrator(Arc::new(hydrator)),
			)
			.build()
			.unwrap();
		let hal = Hal::builder(routes()).metadata_map(metadata).build();
		let entity = hal
			.create_entity(Arc::new(Tag { name: "a" }) as ObjectRef, "user", "id")
			.unwrap()
			.into_entity()
			.unwrap();
		let first = hal.render_entity(&entity).unwrap();

		// Act
		hal.reset();
		let second = hal.render_entity(&entity).unwrap();

		// Assert
		assert_eq!(first["name"], json!("hydrated"));
		assert_eq!(first, second);
	}

	struct Profile {
		id: u64,
	}

	impl HalObject for Profile {
		fn as_any(&self) -> &dyn Any {
			self
		}

		fn serialize_fields(&self) -> Option<HalResult<Value>> {
			Some(Ok(json!({"id": self.id})))
		}

		fn links(&self) -> Option<LinkCollection> {
			let mut links = LinkCollection::new();
			links.add(Link::new("avatar").with_url(format!("/avatars/{}", self.id)).ok()?);
			Some(links)
		}
	}

	#[rstest]
	fn test_create_entity_without_metadata_keeps_object_links(hal: Hal) {
		// Arrange
		let object: ObjectRef = Arc::new(Profile { id: 5 });

		// Act
		let entity = hal
			.create_entity(object, "user", "id")
			.unwrap()
			.into_entity()
			.unwrap();
		let payload = hal.render_entity(&entity).unwrap();

		// Assert
		assert_json_eq!(
			payload["_links"].clone(),
			json!({"avatar": {"href": "/avatars/5"}, "self": {"href": "/users/5"}})
		);
	}

	#[rstest]
	fn test_rendering_a_collection_twice_gives_the_same_document(hal: Hal) {
		// Arrange
		let paginator = ArrayPaginator::from_values((1..=25).map(|id| json!({"id": id})));
		let mut collection = Collection::new(CollectionSource::paginated(paginator));
		collection.set_collection_route("users");
		collection.set_page_size(10).unwrap();
		collection.set_page(2).unwrap();

		// Act
		let first = hal.render_collection(&mut collection).unwrap();
		let second = hal.render_collection(&mut collection).unwrap();

		// Assert
		assert_eq!(first, second);
		assert_eq!(
			second.payload().unwrap()["_links"]["first"],
			json!({"href": "/users"})
		);
	}

	#[rstest]
	fn test_link_fields_in_nested_maps_render_as_links(hal: Hal) {
		let mut nested = FieldMap::new();
		nested.insert(
			"home".to_string(),
			Field::Link(Link::new("home").with_url("/").unwrap()),
		);
		let mut root = FieldMap::new();
		root.insert("meta".to_string(), Field::Map(nested));

		let payload = hal.render_entity(&Entity::new(root, None)).unwrap();

		assert_eq!(payload["meta"]["home"], json!({"href": "/"}));
	}

	#[rstest]
	fn test_route_options_reach_builder(hal: Hal) {
		let mut entity = Entity::new(FieldMap::new(), None);
		let route = Route::new("users").with_options(RouteOptions::new().with_page(Some(2)));
		entity.links_mut().add(Link::new("next").with_route(route).unwrap());

		let payload = hal.render_entity(&entity).unwrap();

		assert_eq!(payload["_links"]["next"]["href"], json!("/users?page=2"));
	}
}
