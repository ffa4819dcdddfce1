//! The `Link` value object and its route description.
//!
//! A link names one or more relations and targets either an explicit URL or a
//! named route. The two targets are mutually exclusive: once one is set the
//! other can no longer be assigned.

use crate::error::{LinkError, LinkResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// Parameters substituted into a route pattern.
pub type RouteParams = IndexMap<String, Value>;

/// Base used to validate relative link URLs.
const RELATIVE_URL_BASE: &str = "http://localhost/";

static NEXT_LINK_ID: AtomicU64 = AtomicU64::new(1);

/// Options passed to the URL builder together with a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteOptions {
	/// Query string parameters appended to the generated URL.
	pub query: IndexMap<String, Value>,
	/// Optional fragment appended to the generated URL.
	pub fragment: Option<String>,
	/// Generate an absolute URL even when the builder would emit a path.
	pub force_canonical: bool,
	/// Whether route parameters of the current request are merged in.
	///
	/// `None` means the builder default (`true`).
	pub reuse_matched_params: Option<bool>,
}

impl RouteOptions {
	/// Creates empty route options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Merges `other` on top of `self`; values from `other` win.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_hal_links::RouteOptions;
	/// use serde_json::json;
	///
	/// let base = RouteOptions::new().with_query_param("sort", Some(json!("name")));
	/// let page = RouteOptions::new().with_query_param("page", Some(json!(2)));
	/// let merged = base.merged_with(&page);
	/// assert_eq!(merged.query.len(), 2);
	/// ```
	pub fn merged_with(&self, other: &RouteOptions) -> RouteOptions {
		let mut merged = self.clone();
		for (key, value) in &other.query {
			merged.query.insert(key.clone(), value.clone());
		}
		if other.fragment.is_some() {
			merged.fragment = other.fragment.clone();
		}
		merged.force_canonical = merged.force_canonical || other.force_canonical;
		if other.reuse_matched_params.is_some() {
			merged.reuse_matched_params = other.reuse_matched_params;
		}
		merged
	}

	/// Sets a query parameter, or removes it when `value` is `None`.
	pub fn with_query_param(mut self, key: impl Into<String>, value: Option<Value>) -> Self {
		let key = key.into();
		match value {
			Some(value) => {
				self.query.insert(key, value);
			}
			None => {
				self.query.shift_remove(&key);
			}
		}
		self
	}

	/// Sets the `page` query parameter, or removes it when `page` is `None`.
	pub fn with_page(self, page: Option<u64>) -> Self {
		self.with_query_param("page", page.map(Value::from))
	}
}

/// A named route together with its parameters and options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
	pub name: String,
	pub params: RouteParams,
	pub options: RouteOptions,
}

impl Route {
	/// Creates a route reference without parameters.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			params: RouteParams::new(),
			options: RouteOptions::default(),
		}
	}

	/// Replaces the route parameters.
	pub fn with_params(mut self, params: RouteParams) -> Self {
		self.params = params;
		self
	}

	/// Sets a single route parameter.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.params.insert(key.into(), value.into());
		self
	}

	/// Replaces the route options.
	pub fn with_options(mut self, options: RouteOptions) -> Self {
		self.options = options;
		self
	}
}

impl From<&str> for Route {
	fn from(name: &str) -> Self {
		Route::new(name)
	}
}

impl From<String> for Route {
	fn from(name: String) -> Self {
		Route::new(name)
	}
}

#[derive(Debug, Clone, PartialEq)]
enum LinkTarget {
	Url(String),
	Route(Route),
}

/// A hypermedia relation pointing at a URL or a route.
///
/// Every link carries an identity that survives cloning. Link collections use
/// it to decide whether a link object is already present under a relation.
///
/// # Examples
///
/// ```
/// use reinhardt_hal_links::Link;
///
/// let mut link = Link::new("self");
/// link.set_url("http://example.com/users/1").unwrap();
/// assert!(link.is_complete());
/// assert!(link.set_route("user").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Link {
	id: u64,
	rels: Vec<String>,
	target: Option<LinkTarget>,
	props: IndexMap<String, Value>,
}

impl Link {
	/// Creates an incomplete link for a single relation.
	pub fn new(rel: impl Into<String>) -> Self {
		Self {
			id: NEXT_LINK_ID.fetch_add(1, Ordering::Relaxed),
			rels: vec![rel.into()],
			target: None,
			props: IndexMap::new(),
		}
	}

	/// Creates an incomplete link declaring several relations.
	///
	/// Duplicate relation names are collapsed, keeping first-seen order.
	pub fn with_relations<I, S>(rels: I) -> LinkResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut unique: Vec<String> = Vec::new();
		for rel in rels {
			let rel = rel.into();
			if !unique.contains(&rel) {
				unique.push(rel);
			}
		}
		if unique.is_empty() {
			return Err(LinkError::MissingRelation);
		}

		let mut link = Link::new(unique.remove(0));
		link.rels.extend(unique);
		Ok(link)
	}

	/// Builds a link from its declarative specification.
	///
	/// A URL takes precedence over a route when both are present.
	pub fn from_spec(spec: &LinkSpec) -> LinkResult<Self> {
		let mut link = Self::with_relations(spec.rel.names())?;
		link.set_props(spec.props.clone());

		if let Some(url) = &spec.url {
			link.set_url(url.clone())?;
			return Ok(link);
		}

		match &spec.route {
			Some(RouteSpec::Name(name)) => {
				link.set_route(name.as_str())?;
				Ok(link)
			}
			Some(RouteSpec::Full {
				name,
				params,
				options,
			}) => {
				link.set_route(
					Route::new(name.clone())
						.with_params(params.clone())
						.with_options(options.clone()),
				)?;
				Ok(link)
			}
			None => Err(LinkError::InvalidSpec(format!(
				"link for relation(s) \"{}\" must contain either a \"url\" or \"route\" element; neither found",
				spec.rel.names().join(", ")
			))),
		}
	}

	/// Builds a link from a JSON link specification.
	pub fn from_value(value: &Value) -> LinkResult<Self> {
		let spec: LinkSpec = serde_json::from_value(value.clone())
			.map_err(|e| LinkError::InvalidSpec(e.to_string()))?;
		Self::from_spec(&spec)
	}

	/// The first declared relation.
	pub fn relation(&self) -> &str {
		&self.rels[0]
	}

	/// All declared relations, in declaration order.
	pub fn rels(&self) -> &[String] {
		&self.rels
	}

	/// Returns true when `other` is the same link object (or a clone of it).
	pub fn is_same(&self, other: &Link) -> bool {
		self.id == other.id
	}

	/// Targets an explicit URL.
	///
	/// # Errors
	///
	/// Fails when a route is already set or when the URL cannot be parsed.
	/// Relative references are accepted.
	pub fn set_url(&mut self, url: impl Into<String>) -> LinkResult<&mut Self> {
		let url = url.into();
		if matches!(self.target, Some(LinkTarget::Route(_))) {
			return Err(LinkError::RouteAlreadySet {
				rels: self.rels.join(", "),
			});
		}
		validate_url(&url)?;
		self.target = Some(LinkTarget::Url(url));
		Ok(self)
	}

	/// Targets a named route.
	///
	/// # Errors
	///
	/// Fails when a URL is already set.
	pub fn set_route(&mut self, route: impl Into<Route>) -> LinkResult<&mut Self> {
		if matches!(self.target, Some(LinkTarget::Url(_))) {
			return Err(LinkError::UrlAlreadySet {
				rels: self.rels.join(", "),
			});
		}
		self.target = Some(LinkTarget::Route(route.into()));
		Ok(self)
	}

	/// Builder form of [`Link::set_url`].
	pub fn with_url(mut self, url: impl Into<String>) -> LinkResult<Self> {
		self.set_url(url)?;
		Ok(self)
	}

	/// Builder form of [`Link::set_route`].
	pub fn with_route(mut self, route: impl Into<Route>) -> LinkResult<Self> {
		self.set_route(route)?;
		Ok(self)
	}

	/// The explicit URL, if this link targets one.
	pub fn url(&self) -> Option<&str> {
		match &self.target {
			Some(LinkTarget::Url(url)) => Some(url),
			_ => None,
		}
	}

	/// The route reference, if this link targets one.
	pub fn route(&self) -> Option<&Route> {
		match &self.target {
			Some(LinkTarget::Route(route)) => Some(route),
			_ => None,
		}
	}

	pub fn has_url(&self) -> bool {
		self.url().is_some()
	}

	pub fn has_route(&self) -> bool {
		self.route().is_some()
	}

	/// A link is complete once it targets a URL or a route.
	pub fn is_complete(&self) -> bool {
		self.target.is_some()
	}

	/// Extra attributes rendered next to `href`.
	pub fn props(&self) -> &IndexMap<String, Value> {
		&self.props
	}

	/// Replaces the extra attributes. An `href` entry is discarded.
	pub fn set_props(&mut self, props: IndexMap<String, Value>) -> &mut Self {
		self.props.clear();
		for (key, value) in props {
			self.set_prop(key, value);
		}
		self
	}

	/// Sets one extra attribute. `href` is reserved and discarded.
	pub fn set_prop(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
		let key = key.into();
		if key == "href" {
			tracing::warn!(
				rels = %self.rels.join(", "),
				"discarding \"href\" link property; use a URL or route instead"
			);
			return self;
		}
		self.props.insert(key, value.into());
		self
	}

	/// Builder form of [`Link::set_prop`].
	pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.set_prop(key, value);
		self
	}
}

impl PartialEq for Link {
	fn eq(&self, other: &Self) -> bool {
		self.rels == other.rels && self.target == other.target && self.props == other.props
	}
}

fn validate_url(url: &str) -> LinkResult<()> {
	let parsed = match Url::parse(url) {
		Err(url::ParseError::RelativeUrlWithoutBase) => {
			Url::parse(RELATIVE_URL_BASE).and_then(|base| base.join(url))
		}
		other => other,
	};
	parsed.map(|_| ()).map_err(|source| LinkError::InvalidUrl {
		url: url.to_string(),
		source,
	})
}

/// Relation names of a link specification: a single name or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelSpec {
	One(String),
	Many(Vec<String>),
}

impl RelSpec {
	pub fn names(&self) -> Vec<String> {
		match self {
			RelSpec::One(name) => vec![name.clone()],
			RelSpec::Many(names) => names.clone(),
		}
	}
}

/// Route part of a link specification: a bare route name or a full route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteSpec {
	Name(String),
	Full {
		name: String,
		#[serde(default)]
		params: RouteParams,
		#[serde(default)]
		options: RouteOptions,
	},
}

/// Declarative description of a link, as found in metadata configuration.
///
/// ```toml
/// rel = "describedby"
/// url = "http://example.com/docs/user"
/// props = { title = "User documentation" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkSpec {
	pub rel: RelSpec,
	#[serde(default)]
	pub props: IndexMap<String, Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub route: Option<RouteSpec>,
}

impl LinkSpec {
	/// A specification targeting a URL.
	pub fn url(rel: impl Into<String>, url: impl Into<String>) -> Self {
		Self {
			rel: RelSpec::One(rel.into()),
			props: IndexMap::new(),
			url: Some(url.into()),
			route: None,
		}
	}

	/// A specification targeting a route.
	pub fn route(rel: impl Into<String>, route: Route) -> Self {
		Self {
			rel: RelSpec::One(rel.into()),
			props: IndexMap::new(),
			url: None,
			route: Some(RouteSpec::Full {
				name: route.name,
				params: route.params,
				options: route.options,
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_set_url_after_route_fails() {
		// Arrange
		let mut link = Link::new("self");
		link.set_route("user").unwrap();

		// Act
		let result = link.set_url("http://example.com/");

		// Assert
		assert!(matches!(result, Err(LinkError::RouteAlreadySet { .. })));
		assert!(link.has_route());
	}

	#[rstest]
	fn test_set_route_after_url_fails() {
		// Arrange
		let mut link = Link::new("self");
		link.set_url("http://example.com/").unwrap();

		// Act
		let result = link.set_route("user");

		// Assert
		assert!(matches!(result, Err(LinkError::UrlAlreadySet { .. })));
		assert_eq!(link.url(), Some("http://example.com/"));
	}

	#[rstest]
	fn test_link_without_target_is_incomplete() {
		let link = Link::new("self");
		assert!(!link.is_complete());
		assert!(!link.has_url());
		assert!(!link.has_route());
	}

	#[rstest]
	#[case("http://example.com/users/1")]
	#[case("/users/1")]
	#[case("users?page=2")]
	fn test_valid_urls_are_accepted(#[case] url: &str) {
		let mut link = Link::new("self");
		assert!(link.set_url(url).is_ok());
	}

	#[rstest]
	#[case("http://[::1")]
	#[case("http://exa mple.com/")]
	fn test_invalid_urls_are_rejected(#[case] url: &str) {
		let mut link = Link::new("self");
		let result = link.set_url(url);
		assert!(matches!(result, Err(LinkError::InvalidUrl { .. })));
		assert!(!link.is_complete());
	}

	#[rstest]
	fn test_with_relations_deduplicates() {
		let link = Link::with_relations(["self", "canonical", "self"]).unwrap();
		assert_eq!(link.rels(), &["self".to_string(), "canonical".to_string()]);
		assert_eq!(link.relation(), "self");
	}

	#[rstest]
	fn test_with_relations_requires_one() {
		let result = Link::with_relations(Vec::<String>::new());
		assert!(matches!(result, Err(LinkError::MissingRelation)));
	}

	#[rstest]
	fn test_href_prop_is_discarded() {
		let link = Link::new("self")
			.with_prop("title", "User")
			.with_prop("href", "http://evil.example.com/");
		assert_eq!(link.props().len(), 1);
		assert_eq!(link.props()["title"], json!("User"));
	}

	#[rstest]
	fn test_clone_preserves_identity() {
		let link = Link::new("self");
		let clone = link.clone();
		let other = Link::new("self");

		assert!(link.is_same(&clone));
		assert!(!link.is_same(&other));
		assert_eq!(link, other);
	}

	#[rstest]
	fn test_from_value_with_full_route() {
		// Arrange
		let spec = json!({
			"rel": "author",
			"props": {"title": "Author"},
			"route": {"name": "user", "params": {"id": 5}, "options": {"query": {"expand": true}}}
		});

		// Act
		let link = Link::from_value(&spec).unwrap();

		// Assert
		let route = link.route().unwrap();
		assert_eq!(route.name, "user");
		assert_eq!(route.params["id"], json!(5));
		assert_eq!(route.options.query["expand"], json!(true));
		assert_eq!(link.props()["title"], json!("Author"));
	}

	#[rstest]
	fn test_from_value_url_wins_over_route() {
		let spec = json!({"rel": ["describedby", "help"], "url": "/docs", "route": "docs"});
		let link = Link::from_value(&spec).unwrap();
		assert_eq!(link.url(), Some("/docs"));
		assert_eq!(link.rels().len(), 2);
	}

	#[rstest]
	#[case(json!({"url": "/docs"}))]
	#[case(json!({"rel": "docs"}))]
	#[case(json!({"rel": "docs", "route": {"params": {}}}))]
	#[case(json!({"rel": "docs", "url": "/docs", "unexpected": 1}))]
	fn test_from_value_rejects_invalid_specs(#[case] spec: Value) {
		assert!(matches!(
			Link::from_value(&spec),
			Err(LinkError::InvalidSpec(_))
		));
	}

	#[rstest]
	fn test_route_options_query_override() {
		let options = RouteOptions::new()
			.with_query_param("page", Some(json!(3)))
			.with_query_param("page", None);
		assert!(options.query.is_empty());
	}
}
