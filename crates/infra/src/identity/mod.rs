//! Adapters implementing `formgate_auth::IdentityRepository`.
//!
//! Both adapters enforce uniqueness of the identity key inside the store
//! itself; the syncer depends on that to resolve first-use races.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryIdentityRepository;
pub use postgres::PostgresIdentityRepository;
