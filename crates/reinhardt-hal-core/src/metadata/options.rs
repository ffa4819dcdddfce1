//! Serializable metadata options, as written in configuration files.

use reinhardt_hal_links::{LinkSpec, RouteOptions, RouteParams};
use serde::{Deserialize, Serialize};

/// Rendering options for one class, before hydrator names are resolved.
///
/// Unknown keys are rejected. `route` and `entity_route` are accepted as
/// aliases of `route_name` and `entity_route_name`, and `identifier_name`
/// fills both identifier names when they are not given.
///
/// ```toml
/// route = "api.user"
/// identifier_name = "user_id"
/// max_depth = 2
///
/// [[links]]
/// rel = "describedby"
/// url = "http://example.com/docs/user"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataOptions {
	/// Accepted for compatibility; the class is always the map key.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub class: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub collection_name: Option<String>,
	/// Name of a hydrator in the registry.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hydrator: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub entity_identifier_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub route_identifier_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub identifier_name: Option<String>,
	pub is_collection: bool,
	pub links: Vec<LinkSpec>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub force_self_link: Option<bool>,
	#[serde(alias = "route", skip_serializing_if = "Option::is_none")]
	pub route_name: Option<String>,
	pub route_options: RouteOptions,
	pub route_params: RouteParams,
	#[serde(alias = "entity_route", skip_serializing_if = "Option::is_none")]
	pub entity_route_name: Option<String>,
	pub entity_route_params: RouteParams,
	pub entity_route_options: RouteOptions,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_depth: Option<usize>,
}
