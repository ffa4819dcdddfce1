//! Ordered, relation-keyed link storage.

use crate::error::{LinkError, LinkResult};
use crate::link::Link;
use indexmap::IndexMap;
use serde_json::Value;

/// Relation reserved for the canonical link of a resource.
pub const SELF_RELATION: &str = "self";

/// Links stored under one relation name.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
	Single(Link),
	Many(Vec<Link>),
}

impl Relation {
	/// Iterates the links stored under this relation.
	pub fn iter(&self) -> std::slice::Iter<'_, Link> {
		match self {
			Relation::Single(link) => std::slice::from_ref(link).iter(),
			Relation::Many(links) => links.iter(),
		}
	}

	pub fn len(&self) -> usize {
		match self {
			Relation::Single(_) => 1,
			Relation::Many(links) => links.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns true when this relation already holds the given link object.
	pub fn contains_same(&self, link: &Link) -> bool {
		self.iter().any(|stored| stored.is_same(link))
	}

	/// The single stored link, if this relation holds exactly one.
	pub fn as_single(&self) -> Option<&Link> {
		match self {
			Relation::Single(link) => Some(link),
			Relation::Many(_) => None,
		}
	}

	fn push(&mut self, link: Link) {
		match self {
			Relation::Single(existing) => {
				let first = existing.clone();
				*self = Relation::Many(vec![first, link]);
			}
			Relation::Many(links) => links.push(link),
		}
	}
}

/// Relation name to link(s) mapping, in insertion order.
///
/// # Examples
///
/// ```
/// use reinhardt_hal_links::{Link, LinkCollection, Relation};
///
/// let mut links = LinkCollection::new();
/// links.add(Link::new("item").with_url("/items/1").unwrap());
/// links.add(Link::new("item").with_url("/items/2").unwrap());
///
/// assert!(matches!(links.get("item"), Some(Relation::Many(items)) if items.len() == 2));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkCollection {
	relations: IndexMap<String, Relation>,
}

impl LinkCollection {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a link under each of its relations.
	///
	/// A new relation stores the link directly. A relation that already exists
	/// is converted to a list and the link appended, except for `self`, which
	/// is always replaced.
	pub fn add(&mut self, link: Link) -> &mut Self {
		self.insert(link, false)
	}

	/// Adds a link under each of its relations, replacing whatever was stored.
	pub fn overwrite(&mut self, link: Link) -> &mut Self {
		self.insert(link, true)
	}

	/// Adds a link without ever storing the same link object twice under a
	/// relation (RFC 5988 allows repeated relations, not repeated links).
	pub fn idempotent_add(&mut self, link: Link) -> &mut Self {
		for rel in link.rels().to_vec() {
			match self.relations.get_mut(&rel) {
				Some(existing) => {
					if !existing.contains_same(&link) {
						existing.push(link.clone());
					}
				}
				None => {
					self.relations.insert(rel, Relation::Single(link.clone()));
				}
			}
		}
		self
	}

	/// Idempotently merges every link of `other` into this collection.
	pub fn merge(&mut self, other: &LinkCollection) -> &mut Self {
		for link in other.links() {
			self.idempotent_add(link.clone());
		}
		self
	}

	fn insert(&mut self, link: Link, overwrite: bool) -> &mut Self {
		for rel in link.rels().to_vec() {
			let replace = overwrite || rel == SELF_RELATION;
			match self.relations.get_mut(&rel) {
				Some(existing) if !replace => existing.push(link.clone()),
				Some(existing) => *existing = Relation::Single(link.clone()),
				None => {
					self.relations.insert(rel, Relation::Single(link.clone()));
				}
			}
		}
		self
	}

	pub fn has(&self, rel: &str) -> bool {
		self.relations.contains_key(rel)
	}

	pub fn get(&self, rel: &str) -> Option<&Relation> {
		self.relations.get(rel)
	}

	/// Removes a relation, keeping the order of the remaining ones.
	pub fn remove(&mut self, rel: &str) -> Option<Relation> {
		self.relations.shift_remove(rel)
	}

	/// Number of relations (not links).
	pub fn len(&self) -> usize {
		self.relations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.relations.is_empty()
	}

	/// Iterates relations in insertion order.
	pub fn iter(&self) -> indexmap::map::Iter<'_, String, Relation> {
		self.relations.iter()
	}

	/// Iterates every stored link. A link declaring several relations is
	/// yielded once per relation.
	pub fn links(&self) -> impl Iterator<Item = &Link> {
		self.relations.values().flat_map(Relation::iter)
	}

	/// Builds a collection from a JSON object mapping relations to link
	/// specifications or arrays of link specifications.
	///
	/// The relation key is used when a specification omits `rel`.
	///
	/// # Errors
	///
	/// Returns [`LinkError::Malformed`] when a relation maps to anything other
	/// than an object or an array of objects.
	pub fn from_value(value: &Value) -> LinkResult<Self> {
		let Value::Object(relations) = value else {
			return Err(LinkError::InvalidSpec(
				"link collection must be a JSON object keyed by relation".to_string(),
			));
		};

		let mut collection = LinkCollection::new();
		for (rel, definition) in relations {
			match definition {
				Value::Object(_) => {
					collection.add(link_from_relation_spec(rel, definition)?);
				}
				Value::Array(entries) => {
					for entry in entries {
						if !entry.is_object() {
							return Err(LinkError::Malformed { rel: rel.clone() });
						}
						collection.add(link_from_relation_spec(rel, entry)?);
					}
				}
				_ => return Err(LinkError::Malformed { rel: rel.clone() }),
			}
		}
		Ok(collection)
	}
}

fn link_from_relation_spec(rel: &str, spec: &Value) -> LinkResult<Link> {
	let mut spec = spec.clone();
	if let Value::Object(map) = &mut spec {
		map.entry("rel").or_insert_with(|| Value::String(rel.to_string()));
	}
	Link::from_value(&spec)
}

impl<'a> IntoIterator for &'a LinkCollection {
	type Item = (&'a String, &'a Relation);
	type IntoIter = indexmap::map::Iter<'a, String, Relation>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl FromIterator<Link> for LinkCollection {
	fn from_iter<T: IntoIterator<Item = Link>>(iter: T) -> Self {
		let mut collection = LinkCollection::new();
		for link in iter {
			collection.add(link);
		}
		collection
	}
}
