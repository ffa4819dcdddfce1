//! Renderer configuration loaded from TOML or JSON.
//!
//! ```toml
//! render_collections = false
//! default_hydrator = "serde"
//!
//! [hydrators]
//! Order = "order"
//!
//! [metadata_map.User]
//! route = "user"
//! identifier_name = "user_id"
//!
//! [metadata_map.UserList]
//! is_collection = true
//! collection_name = "users"
//! route = "users"
//! entity_route = "user"
//! ```
//!
//! Class keys are matched exactly against [`HalObject::type_info`] names, so
//! types configured here declare a stable name instead of relying on the
//! default full type path. Hydrators are named in configuration and resolved
//! against a [`HydratorRegistry`] when the renderer is built.
//!
//! [`HalObject::type_info`]: crate::HalObject::type_info

use crate::error::{HalError, HalResult};
use crate::hydrator::HydratorRegistry;
use crate::metadata::{MetadataMap, MetadataOptions};
use crate::renderer::HalOptions;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top level renderer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HalConfig {
	pub render_embedded_entities: bool,
	pub render_collections: bool,
	/// Registry name of the hydrator used when nothing more specific applies.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub default_hydrator: Option<String>,
	/// Class name to registry name.
	pub hydrators: IndexMap<String, String>,
	/// Class name to metadata options.
	pub metadata_map: IndexMap<String, MetadataOptions>,
}

impl Default for HalConfig {
	fn default() -> Self {
		Self {
			render_embedded_entities: true,
			render_collections: true,
			default_hydrator: None,
			hydrators: IndexMap::new(),
			metadata_map: IndexMap::new(),
		}
	}
}

impl HalConfig {
	/// Parses a TOML document.
	///
	/// # Errors
	///
	/// Returns [`HalError::Config`] on syntax errors and unknown keys.
	pub fn from_toml_str(source: &str) -> HalResult<Self> {
		toml::from_str(source).map_err(|e| HalError::Config(e.to_string()))
	}

	/// Reads configuration from an already parsed JSON value.
	pub fn from_json_value(value: Value) -> HalResult<Self> {
		serde_json::from_value(value).map_err(|e| HalError::Config(e.to_string()))
	}

	pub fn options(&self) -> HalOptions {
		HalOptions {
			render_embedded_entities: self.render_embedded_entities,
			render_collections: self.render_collections,
		}
	}

	/// Materializes every metadata entry.
	pub fn build_metadata_map(&self, registry: &HydratorRegistry) -> HalResult<MetadataMap> {
		self.metadata_map
			.iter()
			.fold(
				MetadataMap::builder().hydrators(registry.clone()),
				|builder, (class, options)| builder.insert_options(class.clone(), options.clone()),
			)
			.build()
	}
}
