//! Self link and pagination link injection.

use crate::error::{ApiProblem, HalError, HalResult};
use crate::resource::{Collection, LinkCollectionAware};
use reinhardt_hal_links::{Link, Route, SELF_RELATION};

/// Adds a `self` link to resources that do not have one yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfLinkInjector;

impl SelfLinkInjector {
	/// Injects a route based `self` link unless one exists.
	///
	/// Entities contribute their identifier under `route_identifier_name`;
	/// collections contribute their collection route params and options.
	pub fn inject_self_link<R: LinkCollectionAware>(
		&self,
		resource: &mut R,
		route: impl Into<Route>,
		route_identifier_name: &str,
	) -> HalResult<()> {
		if resource.links().has(SELF_RELATION) {
			return Ok(());
		}

		let route = resource.extend_self_route(route.into(), route_identifier_name);
		let link = Link::new(SELF_RELATION).with_route(route)?;
		resource.links_mut().overwrite(link);
		Ok(())
	}
}

/// Outcome of pagination link injection.
#[derive(Debug, Clone, PartialEq)]
pub enum Pagination {
	/// The collection is not paginated.
	Skipped,
	/// The paginator has no pages; nothing to link.
	Empty,
	/// Links were injected for a collection of `page_count` pages.
	Injected { page_count: u64 },
	/// The requested page is outside the available pages.
	OutOfRange(ApiProblem),
}

/// Adds `self`, `first`, `last`, `prev` and `next` links to paginated
/// collections.
///
/// The injector owns those relations: injecting again replaces them, so a
/// collection can be re-rendered or moved to another page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationInjector;

impl PaginationInjector {
	/// Configures the collection's paginator and injects navigation links.
	///
	/// An out of range page is reported as [`Pagination::OutOfRange`], not as
	/// an error.
	///
	/// # Errors
	///
	/// Returns [`HalError::MissingCollectionRoute`] when links are needed but
	/// the collection has no route.
	pub fn inject_pagination_links(&self, collection: &mut Collection) -> HalResult<Pagination> {
		let Some(paginator) = collection.paginator().cloned() else {
			return Ok(Pagination::Skipped);
		};

		let page = collection.page();
		let page_count = {
			let mut paginator = paginator.lock();
			paginator.set_item_count_per_page(collection.page_size());
			paginator.set_current_page_number(page);
			paginator.count()
		};

		if page_count == 0 {
			tracing::debug!("paginator has no pages; skipping pagination links");
			return Ok(Pagination::Empty);
		}

		if page < 1 || page > page_count {
			tracing::debug!(page, page_count, "requested page is out of range");
			return Ok(Pagination::OutOfRange(ApiProblem::invalid_page()));
		}

		let route = collection
			.collection_route()
			.ok_or(HalError::MissingCollectionRoute)?
			.to_string();
		let params = collection.collection_route_params().clone();
		let options = collection.collection_route_options().clone();

		let page_link = |rel: &str, target: Option<u64>| -> HalResult<Link> {
			let route = Route::new(route.clone())
				.with_params(params.clone())
				.with_options(options.clone().with_page(target));
			Ok(Link::new(rel).with_route(route)?)
		};

		let links = collection.links_mut();
		links.overwrite(page_link(SELF_RELATION, Some(page))?);
		links.overwrite(page_link("first", None)?);
		links.overwrite(page_link("last", Some(page_count))?);
		links.remove("prev");
		links.remove("next");
		if page > 1 {
			links.add(page_link("prev", Some(page - 1))?);
		}
		if page < page_count {
			links.add(page_link("next", Some(page + 1))?);
		}

		tracing::debug!(page, page_count, "injected pagination links");
		Ok(Pagination::Injected { page_count })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::resource::{ArrayPaginator, CollectionSource, Entity};
	use crate::object::FieldMap;
	use reinhardt_hal_links::Relation;
	use rstest::rstest;
	use serde_json::json;

	fn paginated(total: usize, page: i64) -> Collection {
		let paginator = ArrayPaginator::from_values((0..total).map(|n| json!(n)));
		let mut collection = Collection::new(CollectionSource::paginated(paginator));
		collection.set_collection_route("users");
		collection.set_page_size(10).unwrap();
		collection.set_page(page).unwrap();
		collection
	}

	fn page_query(collection: &Collection, rel: &str) -> Option<serde_json::Value> {
		let link = collection.links().get(rel).and_then(Relation::as_single)?;
		link.route().and_then(|route| route.options.query.get("page").cloned())
	}

	#[rstest]
	#[case(1, false, true)]
	#[case(2, true, true)]
	#[case(3, true, false)]
	fn test_prev_and_next_presence(#[case] page: i64, #[case] has_prev: bool, #[case] has_next: bool) {
		// Arrange
		let mut collection = paginated(25, page);

		// Act
		let outcome = PaginationInjector.inject_pagination_links(&mut collection).unwrap();

		// Assert
		assert_eq!(outcome, Pagination::Injected { page_count: 3 });
		assert_eq!(collection.links().has("prev"), has_prev);
		assert_eq!(collection.links().has("next"), has_next);
		assert!(collection.links().has("first"));
		assert!(collection.links().has("last"));
	}

	#[rstest]
	fn test_page_queries() {
		let mut collection = paginated(25, 2);

		PaginationInjector.inject_pagination_links(&mut collection).unwrap();

		assert_eq!(page_query(&collection, "self"), Some(json!(2)));
		assert_eq!(page_query(&collection, "first"), None);
		assert_eq!(page_query(&collection, "last"), Some(json!(3)));
		assert_eq!(page_query(&collection, "prev"), Some(json!(1)));
		assert_eq!(page_query(&collection, "next"), Some(json!(3)));
	}

	#[rstest]
	fn test_injecting_again_replaces_navigation_links() {
		// Arrange
		let mut collection = paginated(25, 2);
		PaginationInjector.inject_pagination_links(&mut collection).unwrap();

		// Act
		collection.set_page(1).unwrap();
		PaginationInjector.inject_pagination_links(&mut collection).unwrap();

		// Assert
		for rel in ["self", "first", "last", "next"] {
			assert!(collection.links().get(rel).and_then(Relation::as_single).is_some(), "{rel}");
		}
		assert!(!collection.links().has("prev"));
		assert_eq!(page_query(&collection, "self"), Some(json!(1)));
		assert_eq!(page_query(&collection, "next"), Some(json!(2)));
	}

	#[rstest]
	fn test_page_beyond_count_is_a_problem() {
		let mut collection = paginated(25, 4);

		let outcome = PaginationInjector.inject_pagination_links(&mut collection).unwrap();

		assert_eq!(outcome, Pagination::OutOfRange(ApiProblem::invalid_page()));
		assert!(collection.links().is_empty());
	}

	#[rstest]
	fn test_empty_paginator_is_not_an_error() {
		let mut collection = paginated(0, 1);

		let outcome = PaginationInjector.inject_pagination_links(&mut collection).unwrap();

		assert_eq!(outcome, Pagination::Empty);
	}

	#[rstest]
	fn test_unpaginated_collection_is_skipped() {
		let mut collection = Collection::new(CollectionSource::Items(Vec::new()));
		let outcome = PaginationInjector.inject_pagination_links(&mut collection).unwrap();
		assert_eq!(outcome, Pagination::Skipped);
	}

	#[rstest]
	fn test_pagination_requires_route() {
		let paginator = ArrayPaginator::from_values([json!(1)]);
		let mut collection = Collection::new(CollectionSource::paginated(paginator));

		let result = PaginationInjector.inject_pagination_links(&mut collection);

		assert!(matches!(result, Err(HalError::MissingCollectionRoute)));
	}

	#[rstest]
	fn test_self_link_injection_is_idempotent() {
		// Arrange
		let mut entity = Entity::new(FieldMap::new(), Some(json!(9)));
		let injector = SelfLinkInjector;

		// Act
		injector.inject_self_link(&mut entity, "user", "user_id").unwrap();
		injector.inject_self_link(&mut entity, "other", "id").unwrap();

		// Assert
		let link = entity.links().get("self").and_then(Relation::as_single).unwrap();
		let route = link.route().unwrap();
		assert_eq!(route.name, "user");
		assert_eq!(route.params["user_id"], json!(9));
	}
}
