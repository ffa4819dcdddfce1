//! Error types for HAL rendering.

use reinhardt_hal_links::LinkError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while configuring or rendering HAL resources.
#[derive(Debug, Error)]
pub enum HalError {
	/// Link construction or extraction failed.
	#[error(transparent)]
	Link(#[from] LinkError),

	/// Metadata options could not be turned into metadata.
	#[error("invalid metadata for \"{class}\": {message}")]
	InvalidMetadata { class: String, message: String },

	/// A hydrator name does not resolve to a registered hydrator.
	#[error("unknown hydrator \"{name}\" configured for \"{class}\"")]
	UnknownHydrator { class: String, name: String },

	/// The configured identifier field is absent from the extracted fields.
	#[error(
		"unable to determine entity identifier for object of type \"{class}\"; no fields matching \"{field}\""
	)]
	MissingIdentifier { class: String, field: String },

	/// A self link is forced but neither a route nor a URL is configured.
	#[error("unable to create self link for \"{class}\"; metadata declares neither a route nor a URL")]
	MissingSelfRoute { class: String },

	/// An object was revisited on the active rendering path.
	#[error(
		"circular reference detected in \"{class}\"; either set a max_depth metadata attribute or remove the reference"
	)]
	CircularReference { class: String },

	#[error("invalid page provided: {0}; must be a positive integer")]
	InvalidPage(i64),

	#[error("invalid page size provided: {0}; must be a positive integer or -1")]
	InvalidPageSize(i64),

	/// Collection metadata was applied to an object exposing no members.
	#[error("\"{class}\" is configured as a collection but is not iterable")]
	NotIterable { class: String },

	/// No extraction strategy could produce fields for an object.
	#[error("unable to extract fields from \"{class}\": {message}")]
	Extraction { class: String, message: String },

	/// Pagination links were requested for a collection without a route.
	#[error("collection has no route; cannot generate pagination links")]
	MissingCollectionRoute,

	/// Configuration could not be loaded.
	#[error("configuration error: {0}")]
	Config(String),

	#[error(transparent)]
	Serialization(#[from] serde_json::Error),
}

/// Result type for HAL operations.
pub type HalResult<T> = std::result::Result<T, HalError>;

/// A structured problem report in the shape of `application/problem+json`.
///
/// Returned (not raised) when a collection is asked for a page outside of its
/// bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiProblem {
	pub status: u16,
	pub title: String,
	pub detail: String,
	#[serde(rename = "type")]
	pub kind: String,
}

impl ApiProblem {
	pub fn new(status: u16, detail: impl Into<String>) -> Self {
		Self {
			status,
			title: status_title(status).to_string(),
			detail: detail.into(),
			kind: "http://www.w3.org/Protocols/rfc2616/rfc2616-sec10.html".to_string(),
		}
	}

	/// The problem reported for an out of range page.
	pub fn invalid_page() -> Self {
		Self::new(409, "Invalid page provided")
	}
}

fn status_title(status: u16) -> &'static str {
	match status {
		400 => "Bad Request",
		404 => "Not Found",
		409 => "Conflict",
		422 => "Unprocessable Entity",
		500 => "Internal Server Error",
		_ => "Unknown",
	}
}
