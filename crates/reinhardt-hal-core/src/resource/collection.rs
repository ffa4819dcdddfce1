use super::paginator::{Paginator, SharedPaginator, shared};
use crate::error::{HalError, HalResult};
use crate::metadata::{DEFAULT_COLLECTION_NAME, DEFAULT_IDENTIFIER_NAME};
use crate::object::{Field, ObjectRef, TypeInfo};
use reinhardt_hal_links::{LinkCollection, RouteOptions, RouteParams};
use serde_json::{Map, Value};
use std::fmt;

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: i64 = 30;

/// Members of a collection.
#[derive(Clone)]
pub enum CollectionSource {
	Items(Vec<Field>),
	Paginated(SharedPaginator),
}

impl CollectionSource {
	pub fn paginated<P: Paginator + 'static>(paginator: P) -> Self {
		CollectionSource::Paginated(shared(paginator))
	}

	pub fn is_paginated(&self) -> bool {
		matches!(self, CollectionSource::Paginated(_))
	}

	/// The members to render: every item, or the current page.
	pub fn members(&self) -> Vec<Field> {
		match self {
			CollectionSource::Items(items) => items.clone(),
			CollectionSource::Paginated(paginator) => paginator.lock().current_items(),
		}
	}
}

impl fmt::Debug for CollectionSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CollectionSource::Items(items) => f.debug_tuple("Items").field(&items.len()).finish(),
			CollectionSource::Paginated(paginator) => {
				let paginator = paginator.lock();
				f.debug_struct("Paginated")
					.field("total_item_count", &paginator.total_item_count())
					.field("current_page", &paginator.current_page_number())
					.finish()
			}
		}
	}
}

impl From<Vec<Field>> for CollectionSource {
	fn from(items: Vec<Field>) -> Self {
		CollectionSource::Items(items)
	}
}

/// A renderable set of resources.
#[derive(Debug, Clone)]
pub struct Collection {
	source: CollectionSource,
	source_type: Option<TypeInfo>,
	attributes: Map<String, Value>,
	collection_name: String,
	collection_route: Option<String>,
	collection_route_params: RouteParams,
	collection_route_options: RouteOptions,
	entity_route: Option<String>,
	entity_route_params: RouteParams,
	entity_route_options: RouteOptions,
	route_identifier_name: String,
	entity_identifier_name: String,
	page: u64,
	page_size: i64,
	links: LinkCollection,
}

impl Collection {
	pub fn new(source: impl Into<CollectionSource>) -> Self {
		Self {
			source: source.into(),
			source_type: None,
			attributes: Map::new(),
			collection_name: DEFAULT_COLLECTION_NAME.to_string(),
			collection_route: None,
			collection_route_params: RouteParams::new(),
			collection_route_options: RouteOptions::default(),
			entity_route: None,
			entity_route_params: RouteParams::new(),
			entity_route_options: RouteOptions::default(),
			route_identifier_name: DEFAULT_IDENTIFIER_NAME.to_string(),
			entity_identifier_name: DEFAULT_IDENTIFIER_NAME.to_string(),
			page: 1,
			page_size: DEFAULT_PAGE_SIZE,
			links: LinkCollection::new(),
		}
	}

	/// Builds a collection over the members of an iterable object, typed
	/// after that object.
	///
	/// # Errors
	///
	/// Returns [`HalError::NotIterable`] when the object exposes no members.
	pub fn from_object(object: &ObjectRef) -> HalResult<Self> {
		let info = object.type_info();
		let source = object.members().ok_or_else(|| HalError::NotIterable {
			class: info.display_name().to_string(),
		})?;
		Ok(Self::new(source).with_source_type(info))
	}

	/// Declares the type of the source, used for metadata lookups.
	pub fn with_source_type(mut self, info: TypeInfo) -> Self {
		self.source_type = Some(info);
		self
	}

	pub fn source(&self) -> &CollectionSource {
		&self.source
	}

	pub fn source_type(&self) -> Option<&TypeInfo> {
		self.source_type.as_ref()
	}

	pub fn is_paginated(&self) -> bool {
		self.source.is_paginated()
	}

	pub fn paginator(&self) -> Option<&SharedPaginator> {
		match &self.source {
			CollectionSource::Paginated(paginator) => Some(paginator),
			CollectionSource::Items(_) => None,
		}
	}

	/// Top level attributes rendered next to `_links` and `_embedded`.
	pub fn attributes(&self) -> &Map<String, Value> {
		&self.attributes
	}

	pub fn set_attributes(&mut self, attributes: Map<String, Value>) -> &mut Self {
		self.attributes = attributes;
		self
	}

	pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
		self.attributes.insert(key.into(), value.into());
		self
	}

	pub fn collection_name(&self) -> &str {
		&self.collection_name
	}

	pub fn set_collection_name(&mut self, name: impl Into<String>) -> &mut Self {
		self.collection_name = name.into();
		self
	}

	pub fn collection_route(&self) -> Option<&str> {
		self.collection_route.as_deref()
	}

	pub fn set_collection_route(&mut self, route: impl Into<String>) -> &mut Self {
		self.collection_route = Some(route.into());
		self
	}

	pub fn collection_route_params(&self) -> &RouteParams {
		&self.collection_route_params
	}

	pub fn set_collection_route_params(&mut self, params: RouteParams) -> &mut Self {
		self.collection_route_params = params;
		self
	}

	pub fn collection_route_options(&self) -> &RouteOptions {
		&self.collection_route_options
	}

	pub fn set_collection_route_options(&mut self, options: RouteOptions) -> &mut Self {
		self.collection_route_options = options;
		self
	}

	pub fn entity_route(&self) -> Option<&str> {
		self.entity_route.as_deref()
	}

	pub fn set_entity_route(&mut self, route: impl Into<String>) -> &mut Self {
		self.entity_route = Some(route.into());
		self
	}

	pub fn entity_route_params(&self) -> &RouteParams {
		&self.entity_route_params
	}

	pub fn set_entity_route_params(&mut self, params: RouteParams) -> &mut Self {
		self.entity_route_params = params;
		self
	}

	pub fn entity_route_options(&self) -> &RouteOptions {
		&self.entity_route_options
	}

	pub fn set_entity_route_options(&mut self, options: RouteOptions) -> &mut Self {
		self.entity_route_options = options;
		self
	}

	pub fn route_identifier_name(&self) -> &str {
		&self.route_identifier_name
	}

	pub fn set_route_identifier_name(&mut self, name: impl Into<String>) -> &mut Self {
		self.route_identifier_name = name.into();
		self
	}

	pub fn entity_identifier_name(&self) -> &str {
		&self.entity_identifier_name
	}

	pub fn set_entity_identifier_name(&mut self, name: impl Into<String>) -> &mut Self {
		self.entity_identifier_name = name.into();
		self
	}

	pub fn page(&self) -> u64 {
		self.page
	}

	/// Sets the requested page.
	///
	/// # Errors
	///
	/// Returns [`HalError::InvalidPage`] for values below 1.
	pub fn set_page(&mut self, page: i64) -> HalResult<&mut Self> {
		if page < 1 {
			return Err(HalError::InvalidPage(page));
		}
		self.page = page as u64;
		Ok(self)
	}

	pub fn page_size(&self) -> i64 {
		self.page_size
	}

	/// Sets the page size; `-1` disables pagination limits.
	///
	/// # Errors
	///
	/// Returns [`HalError::InvalidPageSize`] for 0 and values below -1.
	pub fn set_page_size(&mut self, size: i64) -> HalResult<&mut Self> {
		if size < 1 && size != -1 {
			return Err(HalError::InvalidPageSize(size));
		}
		self.page_size = size;
		Ok(self)
	}

	pub fn links(&self) -> &LinkCollection {
		&self.links
	}

	pub fn links_mut(&mut self) -> &mut LinkCollection {
		&mut self.links
	}

	pub fn set_links(&mut self, links: LinkCollection) -> &mut Self {
		self.links = links;
		self
	}
}
