//! Process-local session table backing the `tower-sessions` layer.

// std
use std::time::Duration as StdDuration;
// crates.io
use async_trait::async_trait;
use tokio::task::JoinHandle;
use tower_sessions::{
	session::{Id, Record},
	session_store::{self, ExpiredDeletion, SessionStore},
};
// self
use crate::_prelude::*;

/// How often [`spawn_expired_sweep`] purges expired sessions in the server binary.
pub const SESSION_SWEEP_PERIOD: StdDuration = StdDuration::from_secs(15 * 60);

/// Session records keyed by `tower-sessions` [`Id`].
///
/// Expired records are never served and are reclaimed by [`ExpiredDeletion::delete_expired`],
/// whether or not their cookie is ever presented again.
#[derive(Clone, Debug, Default)]
pub struct SessionTable(Arc<RwLock<HashMap<Id, Record>>>);
impl SessionTable {
	/// Drops every record whose expiry is at or before `now`; returns how many were dropped.
	pub fn purge_expired(&self, now: OffsetDateTime) -> usize {
		let mut table = self.0.write();
		let before = table.len();

		table.retain(|_, record| record.expiry_date > now);

		before - table.len()
	}

	/// Number of records currently held, expired or not.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no records are held.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
#[async_trait]
impl SessionStore for SessionTable {
	async fn create(&self, record: &mut Record) -> session_store::Result<()> {
		let mut table = self.0.write();

		while table.contains_key(&record.id) {
			record.id = Id::default();
		}

		table.insert(record.id, record.clone());

		Ok(())
	}

	async fn save(&self, record: &Record) -> session_store::Result<()> {
		self.0.write().insert(record.id, record.clone());

		Ok(())
	}

	async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
		let now = OffsetDateTime::now_utc();

		Ok(self.0.read().get(id).filter(|record| record.expiry_date > now).cloned())
	}

	async fn delete(&self, id: &Id) -> session_store::Result<()> {
		self.0.write().remove(id);

		Ok(())
	}
}
#[async_trait]
impl ExpiredDeletion for SessionTable {
	async fn delete_expired(&self) -> session_store::Result<()> {
		let purged = self.purge_expired(OffsetDateTime::now_utc());

		if purged > 0 {
			tracing::debug!(purged, remaining = self.len(), "Purged expired sessions.");
		}

		Ok(())
	}
}

/// Spawns a task that calls [`ExpiredDeletion::delete_expired`] on `store` every `period`.
pub fn spawn_expired_sweep<S>(store: S, period: StdDuration) -> JoinHandle<()>
where
	S: ExpiredDeletion,
{
	tokio::spawn(async move {
		let mut timer = tokio::time::interval(period);

		loop {
			timer.tick().await;

			if let Err(e) = store.delete_expired().await {
				tracing::warn!(error = %e, "Failed to purge expired sessions.");
			}
		}
	})
}
