use super::{Metadata, MetadataOptions};
use crate::error::HalResult;
use crate::hydrator::HydratorRegistry;
use crate::object::{HalObject, TypeInfo};
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable class name to [`Metadata`] lookup.
///
/// Lookups walk the ancestor chain of a type, so a subclass without its own
/// entry shares the metadata of its nearest configured parent.
///
/// # Examples
///
/// ```
/// use reinhardt_hal_core::{Metadata, MetadataMap, TypeInfo};
///
/// let map = MetadataMap::builder()
///     .insert(Metadata::new("User").with_route("user"))
///     .build()
///     .unwrap();
///
/// let admin = TypeInfo::new("Admin").with_ancestors(&["User"]);
/// assert_eq!(map.get_type(&admin).unwrap().class(), "User");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetadataMap {
	entries: HashMap<String, Arc<Metadata>>,
}

impl MetadataMap {
	pub fn builder() -> MetadataMapBuilder {
		MetadataMapBuilder::default()
	}

	pub fn has(&self, object: &dyn HalObject) -> bool {
		self.get(object).is_some()
	}

	pub fn get(&self, object: &dyn HalObject) -> Option<&Arc<Metadata>> {
		self.get_type(&object.type_info())
	}

	pub fn has_type(&self, info: &TypeInfo) -> bool {
		self.get_type(info).is_some()
	}

	pub fn get_type(&self, info: &TypeInfo) -> Option<&Arc<Metadata>> {
		info.lineage().find_map(|class| self.entries.get(class))
	}

	/// Looks up an exact class name, ignoring ancestry.
	pub fn get_class(&self, class: &str) -> Option<&Arc<Metadata>> {
		self.entries.get(class)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Collects metadata and option entries, then builds a [`MetadataMap`].
#[derive(Debug, Default)]
pub struct MetadataMapBuilder {
	hydrators: HydratorRegistry,
	metadata: Vec<Metadata>,
	options: Vec<(String, MetadataOptions)>,
}

impl MetadataMapBuilder {
	/// Hydrators that option entries may refer to by name.
	pub fn hydrators(mut self, hydrators: HydratorRegistry) -> Self {
		self.hydrators = hydrators;
		self
	}

	pub fn insert(mut self, metadata: Metadata) -> Self {
		self.metadata.push(metadata);
		self
	}

	pub fn insert_options(mut self, class: impl Into<String>, options: MetadataOptions) -> Self {
		self.options.push((class.into(), options));
		self
	}

	/// Materializes every option entry. A later entry for the same class
	/// replaces an earlier one; option entries are applied after metadata.
	///
	/// # Errors
	///
	/// Fails on the first option entry that cannot be materialized.
	pub fn build(self) -> HalResult<MetadataMap> {
		let mut entries = HashMap::new();
		for metadata in self.metadata {
			entries.insert(metadata.class().to_string(), Arc::new(metadata));
		}
		for (class, options) in self.options {
			let metadata = Metadata::from_options(class, options, &self.hydrators)?;
			entries.insert(metadata.class().to_string(), Arc::new(metadata));
		}

		tracing::debug!(classes = entries.len(), "built metadata map");
		Ok(MetadataMap { entries })
	}
}
