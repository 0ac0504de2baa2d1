//! Infrastructure layer: identity storage adapters, form storage, configuration.

pub mod config;
pub mod forms;
pub mod identity;

pub use config::{AppConfig, ConfigError};
pub use forms::{FormRecord, FormStore, FormStoreError, InMemoryFormStore};
pub use identity::{InMemoryIdentityRepository, PostgresIdentityRepository};
