//! Paginated collection sources.

use crate::object::Field;
use parking_lot::Mutex;
use std::sync::Arc;

/// A source that serves one page of items at a time.
pub trait Paginator: Send {
	/// Sets the page size. Values below 1 put every item on a single page.
	fn set_item_count_per_page(&mut self, count: i64);

	/// Sets the current page. Out of range numbers are clamped.
	fn set_current_page_number(&mut self, page: u64);

	fn item_count_per_page(&self) -> i64;

	fn current_page_number(&self) -> u64;

	/// Number of pages.
	fn count(&self) -> u64;

	fn total_item_count(&self) -> u64;

	/// Items of the current page.
	fn current_items(&self) -> Vec<Field>;
}

/// A paginator shared between a collection and the code that created it.
pub type SharedPaginator = Arc<Mutex<dyn Paginator>>;

/// Wraps a paginator for use as a collection source.
pub fn shared<P: Paginator + 'static>(paginator: P) -> SharedPaginator {
	Arc::new(Mutex::new(paginator))
}

/// In-memory paginator over a list of items.
///
/// # Examples
///
/// ```
/// use reinhardt_hal_core::{ArrayPaginator, Paginator};
/// use serde_json::json;
///
/// let mut paginator = ArrayPaginator::from_values((1..=25).map(|n| json!(n)));
/// paginator.set_item_count_per_page(10);
/// paginator.set_current_page_number(3);
///
/// assert_eq!(paginator.count(), 3);
/// assert_eq!(paginator.current_items().len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct ArrayPaginator {
	items: Vec<Field>,
	per_page: i64,
	current_page: u64,
}

impl ArrayPaginator {
	pub const DEFAULT_ITEM_COUNT_PER_PAGE: i64 = 10;

	pub fn new(items: Vec<Field>) -> Self {
		Self {
			items,
			per_page: Self::DEFAULT_ITEM_COUNT_PER_PAGE,
			current_page: 1,
		}
	}

	pub fn from_values<I>(values: I) -> Self
	where
		I: IntoIterator<Item = serde_json::Value>,
	{
		Self::new(values.into_iter().map(Field::Value).collect())
	}

	fn effective_per_page(&self) -> u64 {
		if self.per_page < 1 {
			self.items.len() as u64
		} else {
			self.per_page as u64
		}
	}
}

impl Paginator for ArrayPaginator {
	fn set_item_count_per_page(&mut self, count: i64) {
		self.per_page = count;
		self.current_page = self.current_page.clamp(1, self.count().max(1));
	}

	fn set_current_page_number(&mut self, page: u64) {
		self.current_page = page.clamp(1, self.count().max(1));
	}

	fn item_count_per_page(&self) -> i64 {
		self.per_page
	}

	fn current_page_number(&self) -> u64 {
		self.current_page
	}

	fn count(&self) -> u64 {
		let total = self.total_item_count();
		if total == 0 {
			return 0;
		}
		total.div_ceil(self.effective_per_page())
	}

	fn total_item_count(&self) -> u64 {
		self.items.len() as u64
	}

	fn current_items(&self) -> Vec<Field> {
		let per_page = self.effective_per_page() as usize;
		let start = (self.current_page as usize - 1) * per_page;
		self.items.iter().skip(start).take(per_page).cloned().collect()
	}
}
