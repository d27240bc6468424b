//! Observability helpers for gateway flows.
//!
//! Every flow runs inside a `drive_proxy.flow` span carrying `flow` and `stage` fields.
//!
//! # Feature Flags
//!
//! - Enable `metrics` to increment the `drive_proxy_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Gateway flows that are observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization-code exchange on the callback.
	Handshake,
	/// Binding a client-supplied user id to the session.
	SessionSync,
	/// Filtered top-level listing.
	ListFiles,
	/// Folder children listing.
	ListFolder,
	/// Streamed file download.
	Download,
	/// Single-file upload.
	Upload,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Handshake => "handshake",
			FlowKind::SessionSync => "session_sync",
			FlowKind::ListFiles => "list_files",
			FlowKind::ListFolder => "list_folder",
			FlowKind::Download => "download",
			FlowKind::Upload => "upload",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure reported back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a flow span and records attempt plus outcome.
pub async fn observe<T, Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = FlowSpan::new(kind, stage).wrap(fut).await;

	record_flow_outcome(
		kind,
		if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure },
	);

	result
}
