//! Caller-scoped store clients for Kiln.
//!
//! Each inbound request carries its caller's credential. This crate turns
//! that credential into a [`ScopedClient`] whose store calls authenticate as
//! the caller, so the store's own role-based access control decides what the
//! caller may do. A separate privileged factory authenticates as a fixed
//! service identity for platform-internal objects.
//!
//! # Modules
//!
//! - [`auth`] -- [`AuthInfo`] and the `Authorization` header resolver
//! - [`context`] -- [`RequestContext`]: per-request deadline and cancellation
//! - [`factory`] -- [`ClientFactory`] with unprivileged and privileged variants
//! - [`scoped`] -- [`ScopedClient`], the typed handle repositories use
//! - [`error`] -- [`ClientError`]
//!
//! Scoped clients are owned by one request and never cached: reusing one
//! would carry a caller's authorization into another caller's operations.

pub mod auth;
pub mod context;
pub mod error;
pub mod factory;
pub mod scoped;

pub use auth::{auth_info_from_header, AuthInfo};
pub use context::{CancelHandle, RequestContext};
pub use error::{ClientError, ClientResult};
pub use factory::{
    decode_client_certificate, ClientFactory, PrivilegedClientFactory, UnprivilegedClientFactory,
};
pub use scoped::ScopedClient;
