//! A small route table implementing [`UrlBuilder`].
//!
//! Applications normally adapt their own router to [`UrlBuilder`]; this table
//! covers the common case of named `{param}` path patterns and is what the
//! test suites use.

use crate::error::{LinkError, LinkResult};
use crate::extractor::UrlBuilder;
use crate::link::{RouteOptions, RouteParams};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use url::{Position, Url};

const PLACEHOLDER_BASE: &str = "http://localhost/";

/// Named path patterns resolved into URLs.
///
/// # Examples
///
/// ```
/// use reinhardt_hal_links::{RouteOptions, RouteParams, RouteTable, UrlBuilder};
/// use serde_json::json;
///
/// let table = RouteTable::new().route("user", "/users/{id}");
/// let mut params = RouteParams::new();
/// params.insert("id".to_string(), json!(42));
///
/// let url = table.build("user", &params, &RouteOptions::default(), true).unwrap();
/// assert_eq!(url, "/users/42");
/// ```
#[derive(Debug, Default)]
pub struct RouteTable {
	base_url: Option<Url>,
	routes: HashMap<String, String>,
	matched_params: RwLock<RouteParams>,
}

impl RouteTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Emits absolute URLs rooted at `base_url`.
	pub fn with_base_url(mut self, base_url: &str) -> LinkResult<Self> {
		let parsed = Url::parse(base_url).map_err(|source| LinkError::InvalidUrl {
			url: base_url.to_string(),
			source,
		})?;
		self.base_url = Some(parsed);
		Ok(self)
	}

	/// Registers a named path pattern such as `/users/{id}/posts/{post_id}`.
	pub fn route(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
		self.register(name, pattern);
		self
	}

	pub fn register(&mut self, name: impl Into<String>, pattern: impl Into<String>) {
		self.routes.insert(name.into(), pattern.into());
	}

	pub fn has_route(&self, name: &str) -> bool {
		self.routes.contains_key(name)
	}

	/// Sets the parameters matched for the current request.
	pub fn set_matched_params(&self, params: RouteParams) {
		*self.matched_params.write() = params;
	}

	pub fn matched_params(&self) -> RouteParams {
		self.matched_params.read().clone()
	}

	fn resolve_path(&self, route: &str, pattern: &str, params: &RouteParams) -> LinkResult<String> {
		let mut path = String::with_capacity(pattern.len());
		let mut chars = pattern.chars();

		while let Some(ch) = chars.next() {
			if ch != '{' {
				path.push(ch);
				continue;
			}
			let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
			let value = params
				.get(&name)
				.and_then(param_to_string)
				.ok_or_else(|| LinkError::UrlBuild {
					route: route.to_string(),
					message: format!("missing param: {}", name),
				})?;
			if !is_safe_segment(&value) {
				return Err(LinkError::UrlBuild {
					route: route.to_string(),
					message: format!("invalid param '{}': contains dangerous characters", name),
				});
			}
			path.push_str(&value);
		}

		Ok(path)
	}
}

impl UrlBuilder for RouteTable {
	fn build(
		&self,
		route: &str,
		params: &RouteParams,
		options: &RouteOptions,
		reuse_matched_params: bool,
	) -> LinkResult<String> {
		let pattern = self.routes.get(route).ok_or_else(|| LinkError::UrlBuild {
			route: route.to_string(),
			message: "route not found".to_string(),
		})?;

		let mut merged = if reuse_matched_params {
			self.matched_params()
		} else {
			RouteParams::new()
		};
		for (key, value) in params {
			merged.insert(key.clone(), value.clone());
		}

		let path = self.resolve_path(route, pattern, &merged)?;

		let query: Vec<(String, String)> = options
			.query
			.iter()
			.filter_map(|(key, value)| param_to_string(value).map(|v| (key.clone(), v)))
			.collect();
		let query = serde_urlencoded::to_string(&query).map_err(|e| LinkError::UrlBuild {
			route: route.to_string(),
			message: e.to_string(),
		})?;

		if options.force_canonical && self.base_url.is_none() {
			return Err(LinkError::UrlBuild {
				route: route.to_string(),
				message: "canonical URL requested but no base URL is configured".to_string(),
			});
		}

		let base = match &self.base_url {
			Some(base) => base.clone(),
			None => Url::parse(PLACEHOLDER_BASE).map_err(|source| LinkError::InvalidUrl {
				url: PLACEHOLDER_BASE.to_string(),
				source,
			})?,
		};
		let mut url = base.join(&path).map_err(|source| LinkError::InvalidUrl {
			url: path.clone(),
			source,
		})?;
		url.set_query((!query.is_empty()).then_some(query.as_str()));
		url.set_fragment(options.fragment.as_deref());

		if self.base_url.is_some() {
			Ok(url.to_string())
		} else {
			Ok(url[Position::BeforePath..].to_string())
		}
	}
}

fn param_to_string(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		other => Some(other.to_string()),
	}
}

fn is_safe_segment(value: &str) -> bool {
	!value.is_empty() && !value.contains(['/', '?', '#', '%', '\\']) && value != ".."
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn table() -> RouteTable {
		RouteTable::new()
			.route("users", "/users")
			.route("user", "/users/{id}")
			.route("post", "/users/{user_id}/posts/{id}")
	}

	fn params(pairs: &[(&str, Value)]) -> RouteParams {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.clone()))
			.collect()
	}

	#[rstest]
	fn test_build_substitutes_params(table: RouteTable) {
		let url = table
			.build(
				"post",
				&params(&[("user_id", json!(1)), ("id", json!("hello"))]),
				&RouteOptions::default(),
				true,
			)
			.unwrap();
		assert_eq!(url, "/users/1/posts/hello");
	}

	#[rstest]
	fn test_build_appends_query_and_fragment(table: RouteTable) {
		// Arrange
		let options = RouteOptions::new()
			.with_query_param("page", Some(json!(2)))
			.with_query_param("q", Some(json!("a b")))
			.with_query_param("skip", Some(Value::Null));
		let options = RouteOptions {
			fragment: Some("top".to_string()),
			..options
		};

		// Act
		let url = table.build("users", &RouteParams::new(), &options, true).unwrap();

		// Assert
		assert_eq!(url, "/users?page=2&q=a+b#top");
	}

	#[rstest]
	fn test_build_reuses_matched_params(table: RouteTable) {
		// Arrange
		table.set_matched_params(params(&[("user_id", json!(9))]));

		// Act
		let reused = table
			.build("post", &params(&[("id", json!(3))]), &RouteOptions::default(), true)
			.unwrap();
		let not_reused = table.build(
			"post",
			&params(&[("id", json!(3))]),
			&RouteOptions::default(),
			false,
		);

		// Assert
		assert_eq!(reused, "/users/9/posts/3");
		assert!(matches!(not_reused, Err(LinkError::UrlBuild { .. })));
	}

	#[rstest]
	fn test_explicit_params_override_matched(table: RouteTable) {
		table.set_matched_params(params(&[("id", json!(1))]));
		let url = table
			.build("user", &params(&[("id", json!(2))]), &RouteOptions::default(), true)
			.unwrap();
		assert_eq!(url, "/users/2");
	}

	#[rstest]
	fn test_build_with_base_url() {
		let table = RouteTable::new()
			.with_base_url("https://api.example.com/")
			.unwrap()
			.route("user", "/users/{id}");
		let url = table
			.build("user", &params(&[("id", json!(5))]), &RouteOptions::default(), true)
			.unwrap();
		assert_eq!(url, "https://api.example.com/users/5");
	}

	#[rstest]
	#[case("unknown", &[], "route not found")]
	#[case("user", &[], "missing param: id")]
	#[case("user", &[("id", Value::Null)], "missing param: id")]
	#[case("user", &[("id", json!("../etc"))], "dangerous characters")]
	fn test_build_errors(
		table: RouteTable,
		#[case] route: &str,
		#[case] pairs: &[(&str, Value)],
		#[case] expected: &str,
	) {
		let result = table.build(route, &params(pairs), &RouteOptions::default(), true);
		match result {
			Err(LinkError::UrlBuild { message, .. }) => assert!(message.contains(expected), "{}", message),
			other => panic!("expected UrlBuild error, got {:?}", other),
		}
	}

	#[rstest]
	fn test_force_canonical_requires_base(table: RouteTable) {
		let options = RouteOptions {
			force_canonical: true,
			..RouteOptions::default()
		};
		assert!(table.build("users", &RouteParams::new(), &options, true).is_err());
	}
}
