//! Foundation types for Kiln.
//!
//! Kiln translates the platform's resource model (apps, packages, routes,
//! domains) into objects held by an external, namespaced resource store. This
//! crate carries the small set of types every other Kiln crate agrees on.
//!
//! # Key Types
//!
//! - [`ErrorKind`] -- the closed failure taxonomy returned to the handler layer
//! - [`Guid`] -- platform identifiers, equal to store object names
//! - [`format_timestamp`] / [`parse_timestamp`] -- the fixed record timestamp format

pub mod error;
pub mod guid;
pub mod timestamp;

pub use error::{ErrorKind, TypeError};
pub use guid::Guid;
pub use timestamp::{format_timestamp, parse_timestamp};
