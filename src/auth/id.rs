//! Typed identifiers for sessions and catalog resources.
//!
//! Session ids are opaque values chosen by the caller. Location and product ids follow the
//! catalog's shapes (eight alphanumerics and a 13-digit UPC), so malformed values are rejected
//! before they are spliced into a request path.

// std
use std::{
	borrow::Borrow,
	cmp::Ordering,
	hash::{Hash, Hasher},
	marker::PhantomData,
	ops::Deref,
};
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
// self
use crate::_prelude::*;

/// Longest accepted session identifier.
pub const SESSION_ID_MAX_LEN: usize = 128;

const LOCATION_ID_LEN: usize = 8;
const PRODUCT_ID_LEN: usize = 13;

/// Why an identifier was rejected.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Identifier kind.
		kind: &'static str,
	},
	/// The identifier is longer than its kind allows.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Identifier kind.
		kind: &'static str,
		/// Maximum accepted length.
		max: usize,
	},
	/// The identifier does not have the shape its kind requires.
	#[error("{kind} identifier must be {expected}.")]
	Malformed {
		/// Identifier kind.
		kind: &'static str,
		/// Human-readable shape description.
		expected: &'static str,
	},
}

/// Validation rules distinguishing one identifier kind from another.
pub trait IdentifierKind {
	/// Label used in errors and `Debug` output.
	const KIND: &'static str;

	/// Checks a non-empty candidate value.
	fn validate(value: &str) -> Result<(), IdentifierError>;
}

/// Marker for [`SessionId`].
#[derive(Debug)]
pub enum SessionKind {}
impl IdentifierKind for SessionKind {
	const KIND: &'static str = "Session";

	fn validate(value: &str) -> Result<(), IdentifierError> {
		if value.len() > SESSION_ID_MAX_LEN {
			return Err(IdentifierError::TooLong { kind: Self::KIND, max: SESSION_ID_MAX_LEN });
		}
		if !value.bytes().all(|b| b.is_ascii_graphic()) {
			return Err(IdentifierError::Malformed {
				kind: Self::KIND,
				expected: "printable ASCII without whitespace",
			});
		}

		Ok(())
	}
}

/// Marker for [`LocationId`].
#[derive(Debug)]
pub enum LocationKind {}
impl IdentifierKind for LocationKind {
	const KIND: &'static str = "Location";

	fn validate(value: &str) -> Result<(), IdentifierError> {
		exact_shape(Self::KIND, value, LOCATION_ID_LEN, u8::is_ascii_alphanumeric, "8 letters or digits")
	}
}

/// Marker for [`ProductId`].
#[derive(Debug)]
pub enum ProductKind {}
impl IdentifierKind for ProductKind {
	const KIND: &'static str = "Product";

	fn validate(value: &str) -> Result<(), IdentifierError> {
		exact_shape(Self::KIND, value, PRODUCT_ID_LEN, u8::is_ascii_digit, "a 13-digit UPC")
	}
}

/// Opaque key correlating a browser session to its stored user token.
pub type SessionId = Identifier<SessionKind>;
/// Store location identifier, e.g. `01400943`.
pub type LocationId = Identifier<LocationKind>;
/// Product identifier (13-digit UPC), e.g. `0001111041700`.
pub type ProductId = Identifier<ProductKind>;

/// Validated string identifier of kind `K`.
pub struct Identifier<K> {
	value: String,
	kind: PhantomData<fn() -> K>,
}
impl<K> Identifier<K>
where
	K: IdentifierKind,
{
	/// Validates `value` as an identifier of kind `K`.
	pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
		let value = value.into();

		if value.is_empty() {
			return Err(IdentifierError::Empty { kind: K::KIND });
		}

		K::validate(&value)?;

		Ok(Self { value, kind: PhantomData })
	}
}
impl<K> Identifier<K> {
	/// Borrows the raw value.
	pub fn as_str(&self) -> &str {
		&self.value
	}
}
impl<K> Clone for Identifier<K> {
	fn clone(&self) -> Self {
		Self { value: self.value.clone(), kind: PhantomData }
	}
}
impl<K> PartialEq for Identifier<K> {
	fn eq(&self, other: &Self) -> bool {
		self.value == other.value
	}
}
impl<K> Eq for Identifier<K> {}
impl<K> PartialOrd for Identifier<K> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
impl<K> Ord for Identifier<K> {
	fn cmp(&self, other: &Self) -> Ordering {
		self.value.cmp(&other.value)
	}
}
// Must hash exactly like `str` for `Borrow<str>` lookups.
impl<K> Hash for Identifier<K> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.value.hash(state);
	}
}
impl<K> Deref for Identifier<K> {
	type Target = str;

	fn deref(&self) -> &str {
		&self.value
	}
}
impl<K> AsRef<str> for Identifier<K> {
	fn as_ref(&self) -> &str {
		&self.value
	}
}
impl<K> Borrow<str> for Identifier<K> {
	fn borrow(&self) -> &str {
		&self.value
	}
}
impl<K> Debug for Identifier<K>
where
	K: IdentifierKind,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}({})", K::KIND, self.value)
	}
}
impl<K> Display for Identifier<K> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.value)
	}
}
impl<K> FromStr for Identifier<K>
where
	K: IdentifierKind,
{
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl<K> From<Identifier<K>> for String {
	fn from(value: Identifier<K>) -> Self {
		value.value
	}
}
impl<K> Serialize for Identifier<K> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.value)
	}
}
impl<'de, K> Deserialize<'de> for Identifier<K>
where
	K: IdentifierKind,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		Self::new(String::deserialize(deserializer)?).map_err(DeError::custom)
	}
}

fn exact_shape(
	kind: &'static str,
	value: &str,
	len: usize,
	allowed: fn(&u8) -> bool,
	expected: &'static str,
) -> Result<(), IdentifierError> {
	if value.len() == len && value.bytes().all(|b| allowed(&b)) {
		Ok(())
	} else {
		Err(IdentifierError::Malformed { kind, expected })
	}
}
