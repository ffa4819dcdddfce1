//! Renderable resources: entities, collections and their sources.

mod collection;
mod entity;
mod paginator;

pub use collection::{Collection, CollectionSource, DEFAULT_PAGE_SIZE};
pub use entity::{Entity, EntityValue};
pub use paginator::{ArrayPaginator, Paginator, SharedPaginator, shared};

use crate::object::Field;
use reinhardt_hal_links::{LinkCollection, Route};

/// A resource that owns a link collection and can describe its own route.
pub trait LinkCollectionAware {
	fn links(&self) -> &LinkCollection;

	fn links_mut(&mut self) -> &mut LinkCollection;

	/// Completes a `self` route with the parameters this resource contributes.
	fn extend_self_route(&self, route: Route, route_identifier_name: &str) -> Route;
}

impl LinkCollectionAware for Entity {
	fn links(&self) -> &LinkCollection {
		Entity::links(self)
	}

	fn links_mut(&mut self) -> &mut LinkCollection {
		Entity::links_mut(self)
	}

	fn extend_self_route(&self, route: Route, route_identifier_name: &str) -> Route {
		match self.id() {
			Some(id) if !id.is_null() => route.with_param(route_identifier_name, id.clone()),
			_ => route,
		}
	}
}

impl LinkCollectionAware for Collection {
	fn links(&self) -> &LinkCollection {
		Collection::links(self)
	}

	fn links_mut(&mut self) -> &mut LinkCollection {
		Collection::links_mut(self)
	}

	fn extend_self_route(&self, mut route: Route, _route_identifier_name: &str) -> Route {
		for (key, value) in self.collection_route_params() {
			route.params.insert(key.clone(), value.clone());
		}
		route.options = route.options.merged_with(self.collection_route_options());
		route
	}
}

/// Output of the resource factory.
#[derive(Debug, Clone)]
pub enum Resource {
	Entity(Entity),
	Collection(Collection),
}

impl Resource {
	pub fn links(&self) -> &LinkCollection {
		match self {
			Resource::Entity(entity) => entity.links(),
			Resource::Collection(collection) => collection.links(),
		}
	}

	pub fn into_entity(self) -> Option<Entity> {
		match self {
			Resource::Entity(entity) => Some(entity),
			Resource::Collection(_) => None,
		}
	}

	pub fn into_collection(self) -> Option<Collection> {
		match self {
			Resource::Collection(collection) => Some(collection),
			Resource::Entity(_) => None,
		}
	}
}

impl From<Resource> for Field {
	fn from(resource: Resource) -> Self {
		match resource {
			Resource::Entity(entity) => Field::Entity(entity),
			Resource::Collection(collection) => Field::Collection(Box::new(collection)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use reinhardt_hal_links::RouteOptions;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_entity_contributes_identifier() {
		let entity = Entity::new(crate::object::FieldMap::new(), Some(json!(5)));

		let route = entity.extend_self_route(Route::new("user"), "user_id");

		assert_eq!(route.params["user_id"], json!(5));
	}

	#[rstest]
	fn test_entity_without_identifier_leaves_route() {
		let entity = Entity::new(crate::object::FieldMap::new(), None);
		let route = entity.extend_self_route(Route::new("user"), "id");
		assert!(route.params.is_empty());
	}

	#[rstest]
	fn test_collection_contributes_route_params_and_options() {
		// Arrange
		let mut collection = Collection::new(CollectionSource::Items(Vec::new()));
		collection.set_collection_route_params([("org".to_string(), json!("acme"))].into_iter().collect());
		collection.set_collection_route_options(RouteOptions::new().with_query_param("sort", Some(json!("name"))));

		// Act
		let route = collection.extend_self_route(Route::new("users"), "id");

		// Assert
		assert_eq!(route.params["org"], json!("acme"));
		assert_eq!(route.options.query["sort"], json!("name"));
	}
}
