//! Hydrators and per-class hydrator resolution.

use crate::error::{HalError, HalResult};
use crate::metadata::MetadataMap;
use crate::object::{FieldMap, HalObject, fields_from_serialize};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Extracts the fields of a domain object.
pub trait Hydrator: Send + Sync {
	fn extract(&self, object: &dyn HalObject) -> HalResult<FieldMap>;
}

/// Hydrator serializing objects of type `T` through serde.
///
/// Objects of any other type are rejected.
pub struct SerdeHydrator<T> {
	_marker: PhantomData<fn() -> T>,
}

impl<T> SerdeHydrator<T> {
	pub fn new() -> Self {
		Self {
			_marker: PhantomData,
		}
	}
}

impl<T> Default for SerdeHydrator<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Serialize + 'static> Hydrator for SerdeHydrator<T> {
	fn extract(&self, object: &dyn HalObject) -> HalResult<FieldMap> {
		let typed = object.as_any().downcast_ref::<T>().ok_or_else(|| HalError::Extraction {
			class: object.type_info().display_name().to_string(),
			message: format!("hydrator expects {}", std::any::type_name::<T>()),
		})?;
		fields_from_serialize(typed)
	}
}

/// Hydrator backed by a closure.
pub struct ClosureHydrator<F> {
	extract: F,
}

impl<F> ClosureHydrator<F>
where
	F: Fn(&dyn HalObject) -> HalResult<FieldMap> + Send + Sync,
{
	pub fn new(extract: F) -> Self {
		Self { extract }
	}
}

impl<F> Hydrator for ClosureHydrator<F>
where
	F: Fn(&dyn HalObject) -> HalResult<FieldMap> + Send + Sync,
{
	fn extract(&self, object: &dyn HalObject) -> HalResult<FieldMap> {
		(self.extract)(object)
	}
}

/// Named hydrators available to configuration.
///
/// Configuration files refer to hydrators by name; the registry resolves
/// those names while metadata is being built.
#[derive(Clone, Default)]
pub struct HydratorRegistry {
	hydrators: HashMap<String, Arc<dyn Hydrator>>,
}

impl HydratorRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, name: impl Into<String>, hydrator: Arc<dyn Hydrator>) -> &mut Self {
		self.hydrators.insert(name.into(), hydrator);
		self
	}

	/// Builder form of [`HydratorRegistry::register`].
	pub fn with(mut self, name: impl Into<String>, hydrator: Arc<dyn Hydrator>) -> Self {
		self.register(name, hydrator);
		self
	}

	pub fn get(&self, name: &str) -> Option<Arc<dyn Hydrator>> {
		self.hydrators.get(name).cloned()
	}

	/// Resolves a hydrator name configured for `class`.
	pub fn resolve(&self, class: &str, name: &str) -> HalResult<Arc<dyn Hydrator>> {
		self.get(name).ok_or_else(|| HalError::UnknownHydrator {
			class: class.to_string(),
			name: name.to_string(),
		})
	}
}

impl fmt::Debug for HydratorRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<&String> = self.hydrators.keys().collect();
		names.sort();
		f.debug_struct("HydratorRegistry").field("hydrators", &names).finish()
	}
}

/// Resolves the hydrator to use for a given object.
pub struct EntityHydratorManager {
	hydrators: RwLock<HashMap<String, Arc<dyn Hydrator>>>,
	resolved: RwLock<HashMap<&'static str, Arc<dyn Hydrator>>>,
	metadata_map: Arc<MetadataMap>,
	default_hydrator: RwLock<Option<Arc<dyn Hydrator>>>,
}

impl EntityHydratorManager {
	pub fn new(metadata_map: Arc<MetadataMap>) -> Self {
		Self {
			hydrators: RwLock::new(HashMap::new()),
			resolved: RwLock::new(HashMap::new()),
			metadata_map,
			default_hydrator: RwLock::new(None),
		}
	}

	pub fn metadata_map(&self) -> &Arc<MetadataMap> {
		&self.metadata_map
	}

	/// Maps an exact class name to a hydrator.
	pub fn add_hydrator(&self, class: impl Into<String>, hydrator: Arc<dyn Hydrator>) -> &Self {
		self.hydrators.write().insert(class.into(), hydrator);
		self
	}

	/// Sets the hydrator used when nothing more specific applies.
	pub fn set_default_hydrator(&self, hydrator: Option<Arc<dyn Hydrator>>) -> &Self {
		*self.default_hydrator.write() = hydrator;
		self
	}

	/// Returns the hydrator for `object`.
	///
	/// Resolution order: a hydrator registered for the exact class, the
	/// hydrator declared in the class metadata (remembered for the class
	/// afterwards), then the default hydrator. `None` means no hydrator
	/// applies and the extractor falls back to its other strategies.
	pub fn hydrator_for_entity(&self, object: &dyn HalObject) -> Option<Arc<dyn Hydrator>> {
		let info = object.type_info();

		if let Some(hydrator) = self.hydrators.read().get(info.name) {
			return Some(hydrator.clone());
		}
		if let Some(hydrator) = self.resolved.read().get(info.name) {
			return Some(hydrator.clone());
		}

		if let Some(hydrator) = self
			.metadata_map
			.get_type(&info)
			.and_then(|metadata| metadata.hydrator().cloned())
		{
			tracing::debug!(class = info.display_name(), "using hydrator declared in metadata");
			self.resolved.write().insert(info.name, hydrator.clone());
			return Some(hydrator);
		}

		self.default_hydrator.read().clone()
	}

	/// Forgets hydrators remembered from metadata. Explicit registrations and
	/// the default hydrator are kept.
	pub fn clear_resolved(&self) {
		self.resolved.write().clear();
	}
}

impl fmt::Debug for EntityHydratorManager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut classes: Vec<String> = self.hydrators.read().keys().cloned().collect();
		classes.sort();
		f.debug_struct("EntityHydratorManager")
			.field("hydrators", &classes)
			.field("resolved", &self.resolved.read().len())
			.field("has_default", &self.default_hydrator.read().is_some())
			.finish()
	}
}
