//! Error types for link construction and extraction.

use thiserror::Error;

/// Errors that can occur while building or extracting hypermedia links.
#[derive(Debug, Error)]
pub enum LinkError {
	/// A link was created without any relation name.
	#[error("a link requires at least one relation")]
	MissingRelation,

	/// A URL was assigned to a link that already targets a route.
	#[error("link for relation(s) \"{rels}\" already has a route; cannot set a URL")]
	RouteAlreadySet { rels: String },

	/// A route was assigned to a link that already targets a URL.
	#[error("link for relation(s) \"{rels}\" already has a URL; cannot set a route")]
	UrlAlreadySet { rels: String },

	/// The URL could not be parsed.
	#[error("invalid URL provided for link: {url}")]
	InvalidUrl {
		url: String,
		#[source]
		source: url::ParseError,
	},

	/// Extraction was attempted on a link with neither URL nor route.
	#[error("link for relation(s) \"{rels}\" is incomplete; must contain a URL or a route")]
	Incomplete { rels: String },

	/// A link specification could not be turned into a link.
	#[error("invalid link specification: {0}")]
	InvalidSpec(String),

	/// A relation entry is neither a link nor a list of links.
	#[error("link object for relation \"{rel}\" is malformed; cannot generate link")]
	Malformed { rel: String },

	/// The URL builder failed to assemble a URL for a route.
	#[error("unable to build URL for route \"{route}\": {message}")]
	UrlBuild { route: String, message: String },
}

/// Result type for link operations.
pub type LinkResult<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	fn test_error_send_sync() {
		fn assert_send_sync<T: Send + Sync>() {}
		assert_send_sync::<LinkError>();
	}

	#[rstest]
	#[case(LinkError::MissingRelation, "at least one relation")]
	#[case(LinkError::Incomplete { rels: "self".to_string() }, "incomplete")]
	#[case(LinkError::Malformed { rel: "items".to_string() }, "relation \"items\" is malformed")]
	#[case(
		LinkError::UrlBuild { route: "user".to_string(), message: "missing param: id".to_string() },
		"route \"user\": missing param: id"
	)]
	fn test_error_display(#[case] error: LinkError, #[case] expected: &str) {
		assert!(
			error.to_string().contains(expected),
			"unexpected message: {}",
			error
		);
	}
}
