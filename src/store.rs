//! Storage contract and the built-in in-memory backend for per-user credentials.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Credentials, UserId},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for credential records keyed by user.
///
/// Handlers only ever see `Arc<dyn CredentialStore>`, so a persistent or shared backend can be
/// swapped in without touching request logic. Implementations must keep the overwrite
/// contract: a second [`set`](CredentialStore::set) for the same user replaces the previous
/// record entirely.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the credentials for `user`.
	fn set(&self, user: UserId, credentials: Credentials) -> StoreFuture<'_, ()>;

	/// Fetches the credentials for `user`, if any were stored.
	fn get<'a>(&'a self, user: &'a UserId) -> StoreFuture<'a, Option<Credentials>>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use std::error::Error as StdError;

	#[test]
	fn store_error_converts_into_gateway_error_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let gateway_error: Error = store_error.clone().into();

		assert!(matches!(gateway_error, Error::Storage(_)));
		assert!(gateway_error.to_string().contains("database unreachable"));

		let source = StdError::source(&gateway_error)
			.expect("Gateway error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
