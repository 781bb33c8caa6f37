//! Database access: schema bootstrap, identity registry and variant store

pub mod individuals;
pub mod init;
pub mod variants;

pub use individuals::{DuplicateLabelPolicy, IdentityRegistry};
pub use init::{connect_in_memory, create_tables, init_database};
pub use variants::VariantStore;
