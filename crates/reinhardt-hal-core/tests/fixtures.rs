//! Domain types and renderers shared by the integration tests.

#![allow(dead_code)]

use reinhardt_hal_core::{
	CollectionSource, Field, FieldMap, Hal, HalObject, HalResult, Metadata, MetadataMap,
	ObjectRef, TypeInfo, fields_from_serialize,
};
use reinhardt_hal_links::RouteTable;
use rstest::fixture;
use serde::Serialize;
use serde_json::json;
use std::any::Any;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Serialize)]
pub struct User {
	pub id: u64,
	pub name: String,
}

impl HalObject for User {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn type_info(&self) -> TypeInfo {
		TypeInfo::new("User")
	}

	fn public_fields(&self) -> Option<HalResult<FieldMap>> {
		Some(fields_from_serialize(self))
	}
}

/// A `User` subtype without metadata of its own.
#[derive(Debug, Serialize)]
pub struct Admin {
	pub id: u64,
	pub name: String,
	pub level: u8,
}

impl HalObject for Admin {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn type_info(&self) -> TypeInfo {
		TypeInfo::new("Admin").with_ancestors(&["User"])
	}

	fn public_fields(&self) -> Option<HalResult<FieldMap>> {
		Some(fields_from_serialize(self))
	}
}

/// A linked list node that may point back at itself.
pub struct Node {
	pub id: u64,
	pub next: OnceLock<ObjectRef>,
}

impl Node {
	pub fn looped(id: u64) -> ObjectRef {
		let node = Arc::new(Node {
			id,
			next: OnceLock::new(),
		});
		let object: ObjectRef = node.clone();
		let _ = node.next.set(object.clone());
		object
	}
}

impl HalObject for Node {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn type_info(&self) -> TypeInfo {
		TypeInfo::new("Node")
	}

	fn to_field_map(&self) -> Option<FieldMap> {
		let mut fields = FieldMap::new();
		fields.insert("id".to_string(), Field::Value(json!(self.id)));
		if let Some(next) = self.next.get() {
			fields.insert("next".to_string(), Field::Object(next.clone()));
		}
		Some(fields)
	}
}

/// An iterable of users.
pub struct UserList {
	pub source: CollectionSource,
}

impl UserList {
	pub fn of(users: impl IntoIterator<Item = User>) -> ObjectRef {
		let members = users
			.into_iter()
			.map(|user| Field::Object(Arc::new(user)))
			.collect::<Vec<_>>();
		Arc::new(UserList {
			source: CollectionSource::Items(members),
		})
	}
}

impl HalObject for UserList {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn type_info(&self) -> TypeInfo {
		TypeInfo::new("UserList")
	}

	fn members(&self) -> Option<CollectionSource> {
		Some(self.source.clone())
	}
}

pub fn user(id: u64, name: &str) -> User {
	User {
		id,
		name: name.to_string(),
	}
}

pub fn route_table() -> Arc<RouteTable> {
	Arc::new(
		RouteTable::new()
			.route("user", "/users/{id}")
			.route("users", "/users")
			.route("node", "/nodes/{id}"),
	)
}

pub fn metadata_map(node_max_depth: Option<usize>) -> MetadataMap {
	MetadataMap::builder()
		.insert(Metadata::new("User").with_route("user"))
		.insert(Metadata::new("Node").with_route("node").with_max_depth(node_max_depth))
		.insert(
			Metadata::new("UserList")
				.as_collection()
				.with_collection_name("users")
				.with_route("users")
				.with_entity_route("user"),
		)
		.build()
		.unwrap()
}

#[fixture]
pub fn hal() -> Hal {
	Hal::builder(route_table())
		.metadata_map(metadata_map(None))
		.build()
}
