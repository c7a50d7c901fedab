//! learnpath-store: Data sources for the learnpath engine.
//!
//! Implements the core collaborator traits over modules loaded from TOML and
//! completion records loaded from JSON, and owns learnpath's configuration.

pub mod config;
pub mod error;
pub mod memory;

pub use config::{load_config_from, LearnpathConfig};
pub use error::StoreError;
pub use memory::{Classroom, MemoryStore, RecordsFile};
