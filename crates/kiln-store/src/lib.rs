//! Resource-store protocol for Kiln.
//!
//! The resource store is an external, namespaced, versioned object database
//! that authorizes every call against the identity embedded in the client
//! that made it. Kiln never implements that store; this crate describes the
//! protocol Kiln speaks to it and ships an in-memory cluster that honours the
//! same contract for tests and embedding.
//!
//! # Protocol
//!
//! - `get(kind, namespace, name)` returns the object or `NotFound`
//! - `list(kind, namespace?)` returns the unfiltered collection
//! - `create(object)` returns the persisted object, `AlreadyExists` or `Invalid`
//! - `patch(kind, namespace, name, patch)` merges into the object spec, optionally
//!   conditioned on a resource version, and returns the object or `Conflict`
//!
//! Every object carries a name (unique within its namespace), a namespace,
//! a creation timestamp, an opaque resource version and a spec/status split.
//! Writes are atomic per object only. There are no transactions.
//!
//! # Design Rules
//!
//! 1. Errors expose a structured [`StatusReason`]; callers switch on the reason.
//! 2. Clients are built from a [`ClientConfig`] by a [`StoreConnector`].
//! 3. The [`SchemaRegistry`] is the REST mapping: it knows each kind's scope,
//!    validates specs on write, and declares uniqueness constraints.
//! 4. Only spec fields are written by patches; status belongs to controllers.

pub mod clock;
pub mod config;
pub mod error;
pub mod memory;
pub mod object;
pub mod schema;
pub mod traits;

pub use clock::{Clock, SteppingClock, SystemClock};
pub use config::{ClientConfig, Credentials};
pub use error::{FieldViolation, StatusReason, StoreError, StoreResult};
pub use memory::{InMemoryCluster, RoleBinding, Verb};
pub use object::{apply_merge_patch, ObjectMeta, OwnerReference, Patch, ResourceKind, StoredObject};
pub use schema::{KindSchema, SchemaRegistry, Scope};
pub use traits::{ResourceStore, StoreConnector};
