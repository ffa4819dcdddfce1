//! Per-class rendering configuration.

mod map;
mod options;

pub use map::{MetadataMap, MetadataMapBuilder};
pub use options::MetadataOptions;

use crate::error::{HalError, HalResult};
use crate::hydrator::{Hydrator, HydratorRegistry};
use crate::object::{HalObject, TypeInfo};
use indexmap::IndexMap;
use reinhardt_hal_links::{Link, LinkSpec, RouteOptions, RouteParams};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Default collection name under `_embedded`.
pub const DEFAULT_COLLECTION_NAME: &str = "items";

/// Default identifier field and route parameter name.
pub const DEFAULT_IDENTIFIER_NAME: &str = "id";

type ParamFn = dyn Fn(&dyn HalObject) -> Value + Send + Sync;

/// A self link route parameter: fixed, or computed from the rendered object.
#[derive(Clone)]
pub enum RouteParam {
	Value(Value),
	Computed(Arc<ParamFn>),
}

impl RouteParam {
	pub fn computed<F>(compute: F) -> Self
	where
		F: Fn(&dyn HalObject) -> Value + Send + Sync + 'static,
	{
		RouteParam::Computed(Arc::new(compute))
	}

	pub fn resolve(&self, object: &dyn HalObject) -> Value {
		match self {
			RouteParam::Value(value) => value.clone(),
			RouteParam::Computed(compute) => compute(object),
		}
	}
}

impl fmt::Debug for RouteParam {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RouteParam::Value(value) => f.debug_tuple("Value").field(value).finish(),
			RouteParam::Computed(_) => f.write_str("Computed(..)"),
		}
	}
}

impl From<Value> for RouteParam {
	fn from(value: Value) -> Self {
		RouteParam::Value(value)
	}
}

impl From<&str> for RouteParam {
	fn from(value: &str) -> Self {
		RouteParam::Value(Value::from(value))
	}
}

impl From<String> for RouteParam {
	fn from(value: String) -> Self {
		RouteParam::Value(Value::from(value))
	}
}

impl From<i64> for RouteParam {
	fn from(value: i64) -> Self {
		RouteParam::Value(Value::from(value))
	}
}

impl From<u64> for RouteParam {
	fn from(value: u64) -> Self {
		RouteParam::Value(Value::from(value))
	}
}

/// Rendering configuration for one class.
///
/// # Examples
///
/// ```
/// use reinhardt_hal_core::Metadata;
///
/// let metadata = Metadata::new("User")
///     .with_route("api.user")
///     .with_identifier_name("user_id")
///     .with_max_depth(Some(2));
///
/// assert_eq!(metadata.route_identifier_name(), "user_id");
/// assert!(metadata.force_self_link());
/// ```
#[derive(Clone)]
pub struct Metadata {
	class: String,
	collection_name: String,
	hydrator: Option<Arc<dyn Hydrator>>,
	entity_identifier_name: String,
	route_identifier_name: String,
	is_collection: bool,
	links: Vec<LinkSpec>,
	force_self_link: bool,
	route: Option<String>,
	route_options: RouteOptions,
	route_params: IndexMap<String, RouteParam>,
	entity_route: Option<String>,
	entity_route_params: RouteParams,
	entity_route_options: RouteOptions,
	url: Option<String>,
	max_depth: Option<usize>,
}

impl Metadata {
	pub fn new(class: impl Into<String>) -> Self {
		Self {
			class: class.into(),
			collection_name: DEFAULT_COLLECTION_NAME.to_string(),
			hydrator: None,
			entity_identifier_name: DEFAULT_IDENTIFIER_NAME.to_string(),
			route_identifier_name: DEFAULT_IDENTIFIER_NAME.to_string(),
			is_collection: false,
			links: Vec::new(),
			force_self_link: true,
			route: None,
			route_options: RouteOptions::default(),
			route_params: IndexMap::new(),
			entity_route: None,
			entity_route_params: RouteParams::new(),
			entity_route_options: RouteOptions::default(),
			url: None,
			max_depth: None,
		}
	}

	/// Metadata keyed by the default [`TypeInfo`] of `T`, for types that
	/// do not override [`HalObject::type_info`].
	pub fn for_type<T: ?Sized>() -> Self {
		Self::new(TypeInfo::of::<T>().name)
	}

	/// Materializes metadata from configuration options.
	///
	/// # Errors
	///
	/// Fails when the class name is empty, the hydrator name is unknown to
	/// `hydrators`, or a static link specification is invalid.
	pub fn from_options(
		class: impl Into<String>,
		options: MetadataOptions,
		hydrators: &HydratorRegistry,
	) -> HalResult<Self> {
		let class = class.into();
		if class.trim().is_empty() {
			return Err(HalError::InvalidMetadata {
				class,
				message: "class name must not be empty".to_string(),
			});
		}

		for spec in &options.links {
			Link::from_spec(spec)?;
		}

		let mut metadata = Metadata::new(class);
		if let Some(name) = &options.hydrator {
			metadata.hydrator = Some(hydrators.resolve(&metadata.class, name)?);
		}
		if let Some(name) = options.collection_name {
			metadata.collection_name = name;
		}

		let legacy = options.identifier_name;
		if let Some(name) = options.entity_identifier_name.or_else(|| legacy.clone()) {
			metadata.entity_identifier_name = name;
		}
		if let Some(name) = options.route_identifier_name.or(legacy) {
			metadata.route_identifier_name = name;
		}

		metadata.is_collection = options.is_collection;
		metadata.links = options.links;
		metadata.force_self_link = options.force_self_link.unwrap_or(true);
		metadata.route = options.route_name;
		metadata.route_options = options.route_options;
		metadata.route_params = options
			.route_params
			.into_iter()
			.map(|(key, value)| (key, RouteParam::Value(value)))
			.collect();
		metadata.entity_route = options.entity_route_name;
		metadata.entity_route_params = options.entity_route_params;
		metadata.entity_route_options = options.entity_route_options;
		metadata.url = options.url;
		metadata.max_depth = options.max_depth;

		tracing::debug!(class = %metadata.class, "materialized metadata");
		Ok(metadata)
	}

	/// Materializes metadata from a JSON options object.
	pub fn from_value(
		class: impl Into<String>,
		value: &Value,
		hydrators: &HydratorRegistry,
	) -> HalResult<Self> {
		let class = class.into();
		let options: MetadataOptions =
			serde_json::from_value(value.clone()).map_err(|e| HalError::InvalidMetadata {
				class: class.clone(),
				message: e.to_string(),
			})?;
		Self::from_options(class, options, hydrators)
	}

	pub fn with_collection_name(mut self, name: impl Into<String>) -> Self {
		self.collection_name = name.into();
		self
	}

	pub fn with_hydrator(mut self, hydrator: Arc<dyn Hydrator>) -> Self {
		self.hydrator = Some(hydrator);
		self
	}

	pub fn with_entity_identifier_name(mut self, name: impl Into<String>) -> Self {
		self.entity_identifier_name = name.into();
		self
	}

	pub fn with_route_identifier_name(mut self, name: impl Into<String>) -> Self {
		self.route_identifier_name = name.into();
		self
	}

	/// Sets both identifier names.
	pub fn with_identifier_name(self, name: impl Into<String>) -> Self {
		let name = name.into();
		self.with_entity_identifier_name(name.clone())
			.with_route_identifier_name(name)
	}

	/// Marks the class as a collection of members.
	pub fn as_collection(mut self) -> Self {
		self.is_collection = true;
		self
	}

	pub fn with_link(mut self, spec: LinkSpec) -> Self {
		self.links.push(spec);
		self
	}

	pub fn with_force_self_link(mut self, force: bool) -> Self {
		self.force_self_link = force;
		self
	}

	pub fn with_route(mut self, name: impl Into<String>) -> Self {
		self.route = Some(name.into());
		self
	}

	pub fn with_route_options(mut self, options: RouteOptions) -> Self {
		self.route_options = options;
		self
	}

	pub fn with_route_param(mut self, key: impl Into<String>, param: impl Into<RouteParam>) -> Self {
		self.route_params.insert(key.into(), param.into());
		self
	}

	pub fn with_entity_route(mut self, name: impl Into<String>) -> Self {
		self.entity_route = Some(name.into());
		self
	}

	pub fn with_entity_route_params(mut self, params: RouteParams) -> Self {
		self.entity_route_params = params;
		self
	}

	pub fn with_entity_route_options(mut self, options: RouteOptions) -> Self {
		self.entity_route_options = options;
		self
	}

	pub fn with_url(mut self, url: impl Into<String>) -> Self {
		self.url = Some(url.into());
		self
	}

	/// Limits embedding depth. `None` means unlimited, with circular
	/// references reported as errors.
	pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
		self.max_depth = max_depth;
		self
	}

	pub fn class(&self) -> &str {
		&self.class
	}

	pub fn collection_name(&self) -> &str {
		&self.collection_name
	}

	pub fn hydrator(&self) -> Option<&Arc<dyn Hydrator>> {
		self.hydrator.as_ref()
	}

	pub fn entity_identifier_name(&self) -> &str {
		&self.entity_identifier_name
	}

	pub fn route_identifier_name(&self) -> &str {
		&self.route_identifier_name
	}

	pub fn is_collection(&self) -> bool {
		self.is_collection
	}

	pub fn links(&self) -> &[LinkSpec] {
		&self.links
	}

	pub fn force_self_link(&self) -> bool {
		self.force_self_link
	}

	pub fn route(&self) -> Option<&str> {
		self.route.as_deref()
	}

	pub fn route_options(&self) -> &RouteOptions {
		&self.route_options
	}

	pub fn route_params(&self) -> &IndexMap<String, RouteParam> {
		&self.route_params
	}

	/// Route params with computed entries evaluated against `object`.
	pub fn resolve_route_params(&self, object: &dyn HalObject) -> RouteParams {
		self.route_params
			.iter()
			.map(|(key, param)| (key.clone(), param.resolve(object)))
			.collect()
	}

	pub fn entity_route(&self) -> Option<&str> {
		self.entity_route.as_deref()
	}

	pub fn entity_route_params(&self) -> &RouteParams {
		&self.entity_route_params
	}

	pub fn entity_route_options(&self) -> &RouteOptions {
		&self.entity_route_options
	}

	pub fn url(&self) -> Option<&str> {
		self.url.as_deref()
	}

	pub fn max_depth(&self) -> Option<usize> {
		self.max_depth
	}

	pub fn has_route(&self) -> bool {
		self.route.is_some()
	}

	pub fn has_url(&self) -> bool {
		self.url.is_some()
	}
}

impl fmt::Debug for Metadata {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Metadata")
			.field("class", &self.class)
			.field("collection_name", &self.collection_name)
			.field("has_hydrator", &self.hydrator.is_some())
			.field("entity_identifier_name", &self.entity_identifier_name)
			.field("route_identifier_name", &self.route_identifier_name)
			.field("is_collection", &self.is_collection)
			.field("links", &self.links)
			.field("force_self_link", &self.force_self_link)
			.field("route", &self.route)
			.field("route_params", &self.route_params)
			.field("entity_route", &self.entity_route)
			.field("url", &self.url)
			.field("max_depth", &self.max_depth)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hydrator::ClosureHydrator;
	use crate::object::FieldMap;
	use rstest::rstest;
	use serde_json::json;
	use std::any::Any;

	struct Order {
		number: u32,
	}

	impl HalObject for Order {
		fn as_any(&self) -> &dyn Any {
			self
		}
	}

	fn registry() -> HydratorRegistry {
		HydratorRegistry::new().with(
			"empty",
			Arc::new(ClosureHydrator::new(|_: &dyn HalObject| Ok(FieldMap::new()))),
		)
	}

	#[rstest]
	fn test_defaults() {
		let metadata = Metadata::new("Order");

		assert_eq!(metadata.collection_name(), "items");
		assert_eq!(metadata.entity_identifier_name(), "id");
		assert_eq!(metadata.route_identifier_name(), "id");
		assert!(metadata.force_self_link());
		assert!(!metadata.is_collection());
		assert!(metadata.max_depth().is_none());
	}

	#[rstest]
	fn test_legacy_identifier_fills_unset_names() {
		// Arrange
		let value = json!({"identifier_name": "order_id", "route_identifier_name": "order"});

		// Act
		let metadata = Metadata::from_value("Order", &value, &registry()).unwrap();

		// Assert
		assert_eq!(metadata.entity_identifier_name(), "order_id");
		assert_eq!(metadata.route_identifier_name(), "order");
	}

	#[rstest]
	fn test_hydrator_name_is_resolved() {
		let value = json!({"hydrator": "empty"});
		let metadata = Metadata::from_value("Order", &value, &registry()).unwrap();
		assert!(metadata.hydrator().is_some());
	}

	#[rstest]
	#[case("Order", json!({"hydrator": "missing"}))]
	#[case("Order", json!({"unknown_key": true}))]
	#[case("", json!({}))]
	fn test_invalid_options_are_rejected(#[case] class: &str, #[case] value: Value) {
		let result = Metadata::from_value(class, &value, &registry());
		assert!(matches!(
			result,
			Err(HalError::InvalidMetadata { .. } | HalError::UnknownHydrator { .. })
		));
	}

	#[rstest]
	fn test_invalid_static_link_is_a_configuration_error() {
		let value = json!({"links": [{"rel": "docs"}]});
		let result = Metadata::from_value("Order", &value, &registry());
		assert!(matches!(result, Err(HalError::Link(_))));
	}

	#[rstest]
	fn test_computed_route_params() {
		// Arrange
		let metadata = Metadata::new("Order")
			.with_route_param("store", "main")
			.with_route_param(
				"number",
				RouteParam::computed(|object: &dyn HalObject| {
					let order = object.as_any().downcast_ref::<Order>();
					json!(order.map(|o| o.number))
				}),
			);

		// Act
		let params = metadata.resolve_route_params(&Order { number: 12 });

		// Assert
		assert_eq!(params["store"], json!("main"));
		assert_eq!(params["number"], json!(12));
	}
}
