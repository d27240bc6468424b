//! Thread-safe in-memory [`CredentialStore`]; records live for the process lifetime.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, UserId},
	store::{CredentialStore, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<UserId, Credentials>>>;

/// Process-local credential table. Nothing is persisted and nothing expires.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of users with stored credentials.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no credentials have been stored yet.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Synchronous lookup for callers that already hold the store directly.
	pub fn credentials(&self, user: &str) -> Option<Credentials> {
		Self::get_now(self.0.clone(), user)
	}

	fn set_now(map: StoreMap, user: UserId, credentials: Credentials) {
		map.write().insert(user, credentials);
	}

	fn get_now(map: StoreMap, user: &str) -> Option<Credentials> {
		map.read().get(user).cloned()
	}
}
impl CredentialStore for MemoryStore {
	fn set(&self, user: UserId, credentials: Credentials) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			Self::set_now(map, user, credentials);

			Ok(())
		})
	}

	fn get<'a>(&'a self, user: &'a UserId) -> StoreFuture<'a, Option<Credentials>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::get_now(map, user)) })
	}
}
