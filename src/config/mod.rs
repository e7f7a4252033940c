//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PoolerConfig (validated, immutable)
//!     → route templates compiled into RouteRules, owned by the router actor
//! ```
//!
//! # Design Decisions
//! - Config is immutable for the lifetime of the router
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ObservabilityConfig;
pub use schema::PoolerConfig;
pub use schema::RouteConfig;
pub use schema::RouterConfig;
