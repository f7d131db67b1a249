//! Pipeline module - ingest, profile, clean, combine and persist

pub mod combine;
pub mod economic;
pub mod error;
pub mod fetch;
pub mod health;
pub mod loader;
pub mod missing;
pub mod persist;

pub use combine::*;
pub use economic::*;
pub use error::WrangleError;
pub use fetch::*;
pub use health::*;
pub use loader::*;
pub use missing::*;
pub use persist::*;
