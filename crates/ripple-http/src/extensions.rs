//! Type-keyed attributes attached to a request.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Request attribute storage keyed by type.
///
/// Clones share the same storage, so attributes set by a mapping are visible
/// to the adapter and result handler of the same exchange.
#[derive(Clone, Default)]
pub struct Extensions {
	map: Arc<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>>,
}

impl Extensions {
	/// # Examples
	///
	/// ```
	/// use ripple_http::Extensions;
	///
	/// let extensions = Extensions::new();
	/// assert!(!extensions.contains::<String>());
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `value`, replacing any previous value of the same type.
	///
	/// # Examples
	///
	/// ```
	/// use ripple_http::Extensions;
	///
	/// let extensions = Extensions::new();
	/// extensions.insert(7u16);
	/// assert_eq!(extensions.get::<u16>(), Some(7));
	/// ```
	pub fn insert<T: Send + Sync + 'static>(&self, value: T) {
		let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		map.insert(TypeId::of::<T>(), Box::new(value));
	}

	pub fn get<T>(&self) -> Option<T>
	where
		T: Clone + Send + Sync + 'static,
	{
		let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		map.get(&TypeId::of::<T>())
			.and_then(|boxed| boxed.downcast_ref::<T>())
			.cloned()
	}

	pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
		let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		map.contains_key(&TypeId::of::<T>())
	}

	pub fn remove<T>(&self) -> Option<T>
	where
		T: Send + Sync + 'static,
	{
		let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		let boxed = map.remove(&TypeId::of::<T>())?;
		boxed.downcast::<T>().ok().map(|value| *value)
	}

	pub fn len(&self) -> usize {
		let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
		map.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl std::fmt::Debug for Extensions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Extensions").field("len", &self.len()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[derive(Clone, Debug, PartialEq)]
	struct MatchedPattern(&'static str);

	#[rstest]
	fn test_clones_share_storage() {
		// Arrange
		let extensions = Extensions::new();
		let shared = extensions.clone();

		// Act
		shared.insert(MatchedPattern("/users"));

		// Assert
		assert_eq!(extensions.get::<MatchedPattern>(), Some(MatchedPattern("/users")));
		assert_eq!(extensions.len(), 1);
	}

	#[rstest]
	fn test_insert_replaces_same_type() {
		let extensions = Extensions::new();

		extensions.insert(MatchedPattern("/a"));
		extensions.insert(MatchedPattern("/b"));

		assert_eq!(extensions.get::<MatchedPattern>(), Some(MatchedPattern("/b")));
	}

	#[rstest]
	fn test_remove_takes_value_out() {
		let extensions = Extensions::new();
		extensions.insert(3u8);

		assert_eq!(extensions.remove::<u8>(), Some(3));
		assert!(extensions.is_empty());
		assert_eq!(extensions.remove::<u8>(), None);
	}
}
