//! Per-call traversal state.

use crate::extractor::ExtractionCache;
use crate::object::ObjectId;
use std::collections::HashSet;
use std::rc::Rc;

/// Depth, the objects on the active rendering path and the extraction cache
/// of one render call.
///
/// Each nested render works on its own copy, so an object only counts as
/// visited while one of its ancestors in the output tree is being rendered.
/// Copies share the extraction cache, which is dropped with the last of them.
#[derive(Debug, Clone, Default)]
pub struct TraversalContext {
	depth: usize,
	visited: HashSet<ObjectId>,
	cache: Rc<ExtractionCache>,
}

impl TraversalContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// A root context starting at `depth`.
	pub fn at_depth(depth: usize) -> Self {
		Self {
			depth,
			..Self::default()
		}
	}

	pub fn depth(&self) -> usize {
		self.depth
	}

	pub fn cache(&self) -> &ExtractionCache {
		&self.cache
	}

	/// Marks `id` as being rendered.
	///
	/// Returns `false` if it already is, meaning the graph loops back on
	/// itself.
	pub fn visit(&mut self, id: ObjectId) -> bool {
		self.visited.insert(id)
	}

	pub fn is_visited(&self, id: ObjectId) -> bool {
		self.visited.contains(&id)
	}

	/// Context for content nested one level deeper.
	pub fn child(&self) -> Self {
		Self {
			depth: self.depth + 1,
			visited: self.visited.clone(),
			cache: self.cache.clone(),
		}
	}
}
