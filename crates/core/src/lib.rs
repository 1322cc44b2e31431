//! Domain building blocks for the event stream.
//!
//! Everything in this crate is free of I/O: identifiers, error types, the
//! per-tenant setting keys, the entity field catalogue used to normalize
//! host records, the payload signer, and the collaborator traits through
//! which the pipeline reaches configuration storage and entity lookups.

pub mod error;
pub mod lookup;
pub mod normalize;
pub mod settings;
pub mod signing;
pub mod types;
