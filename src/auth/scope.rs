//! OAuth scope lists as sent on the `scope` parameter.

// std
use std::collections::BTreeSet;
// self
use crate::_prelude::*;

/// Reasons a scope list is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ScopeValidationError {
	/// A scope entry was empty.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// A scope entry contained whitespace, which would split it on the wire.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The rejected entry.
		scope: String,
	},
}

/// Deduplicated, sorted scope list.
///
/// Serializes as the space-delimited string the token and authorize endpoints expect, so
/// `"cart.basic:write profile.compact"` in a config file and `["profile.compact",
/// "cart.basic:write"]` through the builder produce the same value.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScopeSet(Arc<[String]>);
impl ScopeSet {
	/// Validates and normalizes `scopes`.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let scopes = scopes
			.into_iter()
			.map(|scope| {
				let scope = scope.into();

				if scope.is_empty() {
					Err(ScopeValidationError::Empty)
				} else if scope.chars().any(char::is_whitespace) {
					Err(ScopeValidationError::ContainsWhitespace { scope })
				} else {
					Ok(scope)
				}
			})
			.collect::<Result<BTreeSet<_>, _>>()?;

		Ok(Self(scopes.into_iter().collect()))
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no scope is requested.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Scopes in sorted order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Space-delimited wire form.
	pub fn normalized(&self) -> String {
		self.0.join(" ")
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ScopeSet({})", self.normalized())
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if !s.is_empty() && s.trim().is_empty() {
			return Err(ScopeValidationError::Empty);
		}

		Self::new(s.split_whitespace())
	}
}
impl TryFrom<String> for ScopeSet {
	type Error = ScopeValidationError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}
impl From<ScopeSet> for String {
	fn from(value: ScopeSet) -> Self {
		value.normalized()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn order_and_duplicates_do_not_matter() {
		let listed = ScopeSet::new(["profile.compact", "cart.basic:write", "cart.basic:write"])
			.expect("Listed scopes should be valid.");
		let parsed = ScopeSet::from_str("cart.basic:write  profile.compact")
			.expect("Space-delimited scopes should parse.");

		assert_eq!(listed, parsed);
		assert_eq!(listed.len(), 2);
		assert_eq!(listed.iter().collect::<Vec<_>>(), ["cart.basic:write", "profile.compact"]);
		assert_eq!(format!("{listed:?}"), "ScopeSet(cart.basic:write profile.compact)");
	}

	#[test]
	fn malformed_entries_are_rejected() {
		assert_eq!(ScopeSet::new([""]), Err(ScopeValidationError::Empty));
		assert!(matches!(
			ScopeSet::new(["product compact"]),
			Err(ScopeValidationError::ContainsWhitespace { .. })
		));
		assert!(ScopeSet::from_str("").expect("Empty input means no scope.").is_empty());
		assert_eq!(ScopeSet::from_str("   "), Err(ScopeValidationError::Empty));
	}

	#[test]
	fn serde_uses_the_wire_string() {
		let set: ScopeSet = serde_json::from_str("\"product.compact\"")
			.expect("Scope string should deserialize.");

		assert_eq!(
			serde_json::to_string(&set).expect("Scope set should serialize."),
			"\"product.compact\""
		);
		assert!(serde_json::from_str::<ScopeSet>("\"  \"").is_err());
	}
}
