//! Domain objects as seen by the renderer.
//!
//! Anything rendered through HAL implements [`HalObject`]. The trait only
//! requires [`HalObject::as_any`]; every other method is an optional
//! capability consulted by the extraction strategies.

use crate::error::{HalError, HalResult};
use crate::resource::{Collection, CollectionSource, Entity};
use indexmap::IndexMap;
use reinhardt_hal_links::{Link, LinkCollection};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Name and ancestor chain of a domain type.
///
/// `name` is the exact key used for metadata and hydrator lookups, which
/// try `name` first, then each ancestor in order. Two types share metadata
/// only when they report the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
	pub name: &'static str,
	pub ancestors: &'static [&'static str],
}

impl TypeInfo {
	pub const fn new(name: &'static str) -> Self {
		Self {
			name,
			ancestors: &[],
		}
	}

	/// Declares the parent types, nearest first.
	pub const fn with_ancestors(mut self, ancestors: &'static [&'static str]) -> Self {
		self.ancestors = ancestors;
		self
	}

	/// Type info keyed by the full Rust type name, module path and generic
	/// arguments included.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_hal_core::TypeInfo;
	///
	/// mod billing {
	///     pub struct User;
	/// }
	/// struct User;
	///
	/// assert_ne!(TypeInfo::of::<User>(), TypeInfo::of::<billing::User>());
	/// assert_eq!(TypeInfo::of::<billing::User>().display_name(), "User");
	/// assert_eq!(TypeInfo::of::<Vec<User>>().display_name(), "Vec");
	/// ```
	pub fn of<T: ?Sized>() -> Self {
		Self::new(std::any::type_name::<T>())
	}

	/// Short form of the name for messages, without module path or generic
	/// arguments. Not unique.
	pub fn display_name(&self) -> &'static str {
		short_type_name(self.name)
	}

	/// The type name followed by its ancestors.
	pub fn lineage(&self) -> impl Iterator<Item = &'static str> {
		std::iter::once(self.name).chain(self.ancestors.iter().copied())
	}
}

fn short_type_name(full: &'static str) -> &'static str {
	let base = full.split('<').next().unwrap_or(full);
	base.rsplit("::").next().unwrap_or(base)
}

/// A domain object that can be rendered as a HAL resource.
///
/// # Examples
///
/// ```
/// use reinhardt_hal_core::{fields_from_serialize, FieldMap, HalObject, HalResult};
/// use serde::Serialize;
/// use std::any::Any;
///
/// #[derive(Serialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// impl HalObject for User {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///
///     fn public_fields(&self) -> Option<HalResult<FieldMap>> {
///         Some(fields_from_serialize(self))
///     }
/// }
/// ```
pub trait HalObject: Any + Send + Sync {
	fn as_any(&self) -> &dyn Any;

	/// Name and ancestors used for metadata and hydrator lookups.
	///
	/// Defaults to [`TypeInfo::of`]. Override it with a stable name when
	/// metadata or hydrators are configured by name, or to declare ancestors.
	fn type_info(&self) -> TypeInfo {
		TypeInfo::of::<Self>()
	}

	/// Self-describing serialization. Must produce a JSON object.
	fn serialize_fields(&self) -> Option<HalResult<Value>> {
		None
	}

	/// Container capability: the object exposes its contents as a field map.
	fn to_field_map(&self) -> Option<FieldMap> {
		None
	}

	/// The object's public fields.
	fn public_fields(&self) -> Option<HalResult<FieldMap>> {
		None
	}

	/// Iterable capability: the members of a collection-like object.
	fn members(&self) -> Option<CollectionSource> {
		None
	}

	/// Links carried by the object itself.
	fn links(&self) -> Option<LinkCollection> {
		None
	}
}

/// Shared handle to a domain object.
pub type ObjectRef = Arc<dyn HalObject>;

/// Identity of a domain object for the lifetime of its [`ObjectRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

impl ObjectId {
	pub fn of(object: &ObjectRef) -> Self {
		Self(Arc::as_ptr(object) as *const () as usize)
	}
}

/// Ordered field name to value mapping produced by extraction.
pub type FieldMap = IndexMap<String, Field>;

/// A single extracted field.
#[derive(Clone)]
pub enum Field {
	Value(Value),
	Map(FieldMap),
	List(Vec<Field>),
	Object(ObjectRef),
	Entity(Entity),
	Collection(Box<Collection>),
	Link(Link),
	Links(LinkCollection),
}

impl Field {
	pub fn object<T: HalObject>(object: T) -> Self {
		Field::Object(Arc::new(object))
	}

	pub fn as_value(&self) -> Option<&Value> {
		match self {
			Field::Value(value) => Some(value),
			_ => None,
		}
	}

	/// Returns true for `null` values.
	pub fn is_null(&self) -> bool {
		matches!(self, Field::Value(Value::Null))
	}
}

impl fmt::Debug for Field {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Field::Value(value) => f.debug_tuple("Value").field(value).finish(),
			Field::Map(map) => f.debug_tuple("Map").field(map).finish(),
			Field::List(items) => f.debug_tuple("List").field(items).finish(),
			Field::Object(object) => f.debug_tuple("Object").field(&object.type_info().display_name()).finish(),
			Field::Entity(entity) => f.debug_tuple("Entity").field(entity).finish(),
			Field::Collection(collection) => f.debug_tuple("Collection").field(collection).finish(),
			Field::Link(link) => f.debug_tuple("Link").field(link).finish(),
			Field::Links(links) => f.debug_tuple("Links").field(links).finish(),
		}
	}
}

impl From<Value> for Field {
	fn from(value: Value) -> Self {
		Field::Value(value)
	}
}

impl From<FieldMap> for Field {
	fn from(map: FieldMap) -> Self {
		Field::Map(map)
	}
}

impl From<ObjectRef> for Field {
	fn from(object: ObjectRef) -> Self {
		Field::Object(object)
	}
}

impl From<Entity> for Field {
	fn from(entity: Entity) -> Self {
		Field::Entity(entity)
	}
}

impl From<Collection> for Field {
	fn from(collection: Collection) -> Self {
		Field::Collection(Box::new(collection))
	}
}

impl From<Link> for Field {
	fn from(link: Link) -> Self {
		Field::Link(link)
	}
}

impl From<LinkCollection> for Field {
	fn from(links: LinkCollection) -> Self {
		Field::Links(links)
	}
}

/// Converts a JSON object into a field map of plain values.
pub fn fields_from_value(class: &str, value: Value) -> HalResult<FieldMap> {
	match value {
		Value::Object(map) => Ok(map.into_iter().map(|(k, v)| (k, Field::Value(v))).collect()),
		other => Err(HalError::Extraction {
			class: class.to_string(),
			message: format!("expected a JSON object, found {}", json_kind(&other)),
		}),
	}
}

/// Serializes `value` with serde and converts the result into a field map.
///
/// # Errors
///
/// Fails when serialization fails or does not produce a JSON object.
pub fn fields_from_serialize<T: Serialize + ?Sized>(value: &T) -> HalResult<FieldMap> {
	let class = short_type_name(std::any::type_name::<T>());
	fields_from_value(class, serde_json::to_value(value)?)
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
