//! Conversion of links into their HAL document representation.

use crate::collection::{LinkCollection, Relation};
use crate::error::{LinkError, LinkResult};
use crate::link::{Link, RouteOptions, RouteParams};
use serde_json::{Map, Value};
use std::sync::Arc;

/// URL building capability used to resolve route based links.
///
/// Implement this trait to plug the application router into link extraction.
/// The engine never matches routes itself.
///
/// # Example
///
/// ```rust
/// use reinhardt_hal_links::{LinkResult, RouteOptions, RouteParams, UrlBuilder};
///
/// struct Fixed;
///
/// impl UrlBuilder for Fixed {
///     fn build(
///         &self,
///         route: &str,
///         _params: &RouteParams,
///         _options: &RouteOptions,
///         _reuse_matched_params: bool,
///     ) -> LinkResult<String> {
///         Ok(format!("http://example.com/{}", route))
///     }
/// }
/// ```
pub trait UrlBuilder: Send + Sync {
	/// Builds the URL for `route`.
	///
	/// # Arguments
	///
	/// * `route` - The route name
	/// * `params` - Route parameters
	/// * `options` - Query, fragment and canonical flags
	/// * `reuse_matched_params` - Merge parameters matched for the current request
	fn build(
		&self,
		route: &str,
		params: &RouteParams,
		options: &RouteOptions,
		reuse_matched_params: bool,
	) -> LinkResult<String>;
}

/// Renders a single [`Link`] as `{...props, "href": url}`.
#[derive(Clone)]
pub struct LinkExtractor {
	url_builder: Arc<dyn UrlBuilder>,
}

impl LinkExtractor {
	pub fn new(url_builder: Arc<dyn UrlBuilder>) -> Self {
		Self { url_builder }
	}

	pub fn url_builder(&self) -> &Arc<dyn UrlBuilder> {
		&self.url_builder
	}

	/// Extracts the representation of a link.
	///
	/// # Errors
	///
	/// Fails when the link is incomplete or the URL builder cannot resolve its
	/// route.
	pub fn extract(&self, link: &Link) -> LinkResult<Map<String, Value>> {
		let mut representation: Map<String, Value> = link
			.props()
			.iter()
			.map(|(key, value)| (key.clone(), value.clone()))
			.collect();

		if let Some(url) = link.url() {
			representation.insert("href".to_string(), Value::String(url.to_string()));
			return Ok(representation);
		}

		let Some(route) = link.route() else {
			return Err(LinkError::Incomplete {
				rels: link.rels().join(", "),
			});
		};

		let mut options = route.options.clone();
		let reuse_matched_params = options.reuse_matched_params.take().unwrap_or(true);
		let href = self
			.url_builder
			.build(&route.name, &route.params, &options, reuse_matched_params)?;
		representation.insert("href".to_string(), Value::String(href));
		Ok(representation)
	}
}

/// Renders a [`LinkCollection`] as the `_links` object of a document.
#[derive(Clone)]
pub struct LinkCollectionExtractor {
	link_extractor: LinkExtractor,
}

impl LinkCollectionExtractor {
	pub fn new(link_extractor: LinkExtractor) -> Self {
		Self { link_extractor }
	}

	pub fn link_extractor(&self) -> &LinkExtractor {
		&self.link_extractor
	}

	/// Extracts every relation: one object for a single link, an array for
	/// an aggregate.
	pub fn extract(&self, collection: &LinkCollection) -> LinkResult<Map<String, Value>> {
		let mut links = Map::new();
		for (rel, relation) in collection {
			let rendered = match relation {
				Relation::Single(link) => Value::Object(self.link_extractor.extract(link)?),
				Relation::Many(aggregate) => Value::Array(
					aggregate
						.iter()
						.map(|link| self.link_extractor.extract(link).map(Value::Object))
						.collect::<LinkResult<Vec<_>>>()?,
				),
			};
			links.insert(rel.clone(), rendered);
		}
		Ok(links)
	}
}
