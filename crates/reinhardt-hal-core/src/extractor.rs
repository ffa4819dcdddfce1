//! Memoized field extraction for domain objects.

use crate::error::{HalError, HalResult};
use crate::hydrator::EntityHydratorManager;
use crate::object::{FieldMap, HalObject, ObjectId, ObjectRef, fields_from_value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A way of turning an object into fields, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
	/// The hydrator resolved by the [`EntityHydratorManager`].
	Hydrator,
	/// [`HalObject::serialize_fields`].
	SelfSerializing,
	/// [`HalObject::to_field_map`].
	Container,
	/// [`HalObject::public_fields`].
	PublicFields,
}

impl ExtractionStrategy {
	pub const DEFAULT_ORDER: [ExtractionStrategy; 4] = [
		ExtractionStrategy::Hydrator,
		ExtractionStrategy::SelfSerializing,
		ExtractionStrategy::Container,
		ExtractionStrategy::PublicFields,
	];
}

/// Extraction results remembered for the duration of one render call.
///
/// Each entry holds a handle to its object, so an identity cannot be reused
/// by another allocation while the cache is alive.
#[derive(Default)]
pub struct ExtractionCache {
	entries: RefCell<HashMap<ObjectId, (ObjectRef, FieldMap)>>,
}

impl ExtractionCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, object: &ObjectRef) -> Option<FieldMap> {
		self.entries
			.borrow()
			.get(&ObjectId::of(object))
			.map(|(_, fields)| fields.clone())
	}

	pub fn insert(&self, object: &ObjectRef, fields: FieldMap) {
		self.entries
			.borrow_mut()
			.insert(ObjectId::of(object), (object.clone(), fields));
	}

	/// Forgets every remembered extraction.
	pub fn clear(&self) {
		self.entries.borrow_mut().clear();
	}

	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}
}

impl fmt::Debug for ExtractionCache {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ExtractionCache")
			.field("entries", &self.len())
			.finish()
	}
}

/// Extracts objects into field maps.
pub struct EntityExtractor {
	hydrators: Arc<EntityHydratorManager>,
	strategies: Vec<ExtractionStrategy>,
}

impl EntityExtractor {
	pub fn new(hydrators: Arc<EntityHydratorManager>) -> Self {
		Self {
			hydrators,
			strategies: ExtractionStrategy::DEFAULT_ORDER.to_vec(),
		}
	}

	/// Replaces the strategy order.
	pub fn with_strategies(mut self, strategies: Vec<ExtractionStrategy>) -> Self {
		self.strategies = strategies;
		self
	}

	pub fn hydrators(&self) -> &Arc<EntityHydratorManager> {
		&self.hydrators
	}

	/// Extracts `object`, returning the fields remembered in `cache` when it
	/// was seen before.
	pub fn extract(&self, object: &ObjectRef, cache: &ExtractionCache) -> HalResult<FieldMap> {
		if let Some(fields) = cache.get(object) {
			tracing::trace!(class = object.type_info().display_name(), "extraction cache hit");
			return Ok(fields);
		}

		let fields = self.extract_uncached(object.as_ref())?;
		cache.insert(object, fields.clone());
		Ok(fields)
	}

	/// Extracts `object` without consulting or filling the cache.
	pub fn extract_uncached(&self, object: &dyn HalObject) -> HalResult<FieldMap> {
		let class = object.type_info().display_name();
		for strategy in &self.strategies {
			let attempt = match strategy {
				ExtractionStrategy::Hydrator => self
					.hydrators
					.hydrator_for_entity(object)
					.map(|hydrator| hydrator.extract(object)),
				ExtractionStrategy::SelfSerializing => object
					.serialize_fields()
					.map(|value| value.and_then(|value| fields_from_value(class, value))),
				ExtractionStrategy::Container => object.to_field_map().map(Ok),
				ExtractionStrategy::PublicFields => object.public_fields(),
			};
			if let Some(result) = attempt {
				return result;
			}
		}

		Err(HalError::Extraction {
			class: class.to_string(),
			message: "no extraction strategy applies".to_string(),
		})
	}

}
