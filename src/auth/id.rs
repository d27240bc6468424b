//! Strongly typed user identifiers.

// std
use std::{borrow::Borrow, ops::Deref};
// crates.io
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $validate:path) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				$validate($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				$validate($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), preview(&self.0))
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const DEBUG_DIGEST_BYTES: usize = 4;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier.
		kind: &'static str,
	},
}

def_id! { UserId, "Opaque user key; the provider's identity-token string as issued.", "User", validate_user }

// The identity token is never decoded; any non-empty string is a valid key.
fn validate_user(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}

	Ok(())
}

// Identity tokens share their header prefix, so logs carry a short digest instead.
fn preview(value: &str) -> String {
	let digest = Sha256::digest(value.as_bytes());

	digest[..DEBUG_DIGEST_BYTES].iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn user_ids_accept_any_non_empty_token() {
		assert!(UserId::new("").is_err());

		let token = format!("eyJhbGciOiJSUzI1NiJ9.{}.sig", "a".repeat(900));
		let user = UserId::new(&token).expect("Long identity tokens must be accepted verbatim.");

		assert_eq!(user.as_ref(), token);
		assert!(UserId::new("with space").is_ok());
	}

	#[test]
	fn debug_output_distinguishes_tokens_with_shared_prefix() {
		let alice = UserId::new("eyJhbGciOiJSUzI1NiJ9.alice.signature")
			.expect("User fixture should be valid.");
		let bob =
			UserId::new("eyJhbGciOiJSUzI1NiJ9.bob.signature").expect("User fixture should be valid.");
		let alice_debug = format!("{alice:?}");

		assert_ne!(alice_debug, format!("{bob:?}"));
		assert_eq!(alice_debug, format!("{:?}", alice.clone()));
		assert!(!alice_debug.contains("eyJ"), "Debug output must not leak the token: {alice_debug}");
		assert_eq!(alice_debug.len(), "User()".len() + DEBUG_DIGEST_BYTES * 2);
		assert_eq!(format!("{alice}"), "eyJhbGciOiJSUzI1NiJ9.alice.signature");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let user: UserId =
			serde_json::from_str("\"user-42\"").expect("User should deserialize successfully.");

		assert_eq!(user.as_ref(), "user-42");
		assert!(serde_json::from_str::<UserId>("\"\"").is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<UserId, u8> =
			HashMap::from_iter([(UserId::new("user-123").expect("User should be valid."), 7_u8)]);

		assert_eq!(map.get("user-123"), Some(&7));
	}
}
