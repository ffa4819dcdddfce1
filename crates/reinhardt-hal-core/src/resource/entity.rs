use crate::object::{FieldMap, ObjectRef};
use reinhardt_hal_links::LinkCollection;
use serde_json::Value;
use std::fmt;

/// What an [`Entity`] wraps.
#[derive(Clone)]
pub enum EntityValue {
	/// A domain object, extracted at render time.
	Object(ObjectRef),
	/// Fields that are already extracted.
	Fields(FieldMap),
}

impl EntityValue {
	pub fn object(&self) -> Option<&ObjectRef> {
		match self {
			EntityValue::Object(object) => Some(object),
			EntityValue::Fields(_) => None,
		}
	}
}

impl fmt::Debug for EntityValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EntityValue::Object(object) => f
				.debug_tuple("Object")
				.field(&object.type_info().display_name())
				.finish(),
			EntityValue::Fields(fields) => f.debug_tuple("Fields").field(fields).finish(),
		}
	}
}

impl From<ObjectRef> for EntityValue {
	fn from(object: ObjectRef) -> Self {
		EntityValue::Object(object)
	}
}

impl From<FieldMap> for EntityValue {
	fn from(fields: FieldMap) -> Self {
		EntityValue::Fields(fields)
	}
}

/// A single renderable resource.
///
/// The wrapped value and identifier are fixed at construction; only the
/// links can change afterwards.
#[derive(Debug, Clone)]
pub struct Entity {
	value: EntityValue,
	id: Option<Value>,
	links: LinkCollection,
}

impl Entity {
	pub fn new(value: impl Into<EntityValue>, id: Option<Value>) -> Self {
		Self {
			value: value.into(),
			id,
			links: LinkCollection::new(),
		}
	}

	pub fn value(&self) -> &EntityValue {
		&self.value
	}

	pub fn id(&self) -> Option<&Value> {
		self.id.as_ref()
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

	pub fn with_links(mut self, links: LinkCollection) -> Self {
		self.links = links;
		self
	}
}
