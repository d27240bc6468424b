//! Provider-facing descriptors (data) and the authenticated Drive client (behavior).
//!
//! `descriptor` exposes validated endpoint metadata (`ProviderDescriptor`) for the identity
//! provider and the Drive REST and upload bases, plus the scopes requested during the
//! handshake. `drive` is the thin REST client issued per request by the client factory.

pub mod descriptor;
pub mod drive;

pub use descriptor::*;
pub use drive::*;
