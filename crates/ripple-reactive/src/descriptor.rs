//! Runtime type descriptions and type-erased handler return values.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a concrete Rust type, comparable at runtime.
///
/// Two descriptors are equal exactly when they describe the same type; the
/// name only serves diagnostics.
///
/// # Examples
///
/// ```
/// use ripple_reactive::TypeDescriptor;
///
/// assert_eq!(TypeDescriptor::of::<String>(), TypeDescriptor::of::<String>());
/// assert_ne!(TypeDescriptor::of::<String>(), TypeDescriptor::of::<&'static str>());
/// ```
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
	id: TypeId,
	name: &'static str,
}

impl TypeDescriptor {
	pub fn of<X: Any + ?Sized>() -> Self {
		Self {
			id: TypeId::of::<X>(),
			name: std::any::type_name::<X>(),
		}
	}

	pub fn id(&self) -> TypeId {
		self.id
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Whether this descriptor describes `X`.
	pub fn is<X: Any + ?Sized>(&self) -> bool {
		self.id == TypeId::of::<X>()
	}
}

impl PartialEq for TypeDescriptor {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

impl fmt::Display for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// A value whose concrete type is only known at runtime.
///
/// Handlers hand their return value to the dispatcher as a `ReturnValue`; the
/// adapter chain and the result handlers inspect its [`TypeDescriptor`] and
/// downcast to the type they support. An absent value stands for a handler
/// that returned nothing.
pub struct ReturnValue {
	value: Option<Box<dyn Any + Send>>,
	descriptor: TypeDescriptor,
}

impl ReturnValue {
	pub fn new<X: Any + Send>(value: X) -> Self {
		Self {
			value: Some(Box::new(value)),
			descriptor: TypeDescriptor::of::<X>(),
		}
	}

	/// The "no value" return value.
	pub fn absent() -> Self {
		Self {
			value: None,
			descriptor: TypeDescriptor::of::<()>(),
		}
	}

	pub fn is_absent(&self) -> bool {
		self.value.is_none()
	}

	pub fn descriptor(&self) -> TypeDescriptor {
		self.descriptor
	}

	pub fn is<X: Any>(&self) -> bool {
		self.value.is_some() && self.descriptor.is::<X>()
	}

	pub fn downcast_ref<X: Any>(&self) -> Option<&X> {
		self.value.as_ref()?.downcast_ref::<X>()
	}

	/// Takes the value out as `X`, handing `self` back untouched on mismatch.
	pub fn downcast<X: Any>(self) -> Result<X, Self> {
		match self.value {
			Some(value) => match value.downcast::<X>() {
				Ok(value) => Ok(*value),
				Err(value) => Err(Self {
					value: Some(value),
					descriptor: self.descriptor,
				}),
			},
			None => Err(self),
		}
	}
}

impl fmt::Debug for ReturnValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_absent() {
			f.write_str("ReturnValue(<absent>)")
		} else {
			write!(f, "ReturnValue({})", self.descriptor)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_descriptor_equality_ignores_name() {
		let a = TypeDescriptor::of::<Vec<u8>>();
		let b = TypeDescriptor::of::<Vec<u8>>();

		assert_eq!(a, b);
		assert!(a.is::<Vec<u8>>());
		assert!(!a.is::<Vec<u16>>());
	}

	#[rstest]
	fn test_downcast_mismatch_returns_original() {
		// Arrange
		let value = ReturnValue::new(42u32);

		// Act
		let mismatch = value.downcast::<String>();

		// Assert
		let value = mismatch.unwrap_err();
		assert_eq!(value.downcast::<u32>().ok(), Some(42));
	}

	#[rstest]
	fn test_absent_value() {
		let value = ReturnValue::absent();

		assert!(value.is_absent());
		assert!(!value.is::<()>());
		assert!(value.downcast_ref::<()>().is_none());
		assert_eq!(format!("{value:?}"), "ReturnValue(<absent>)");
	}
}
