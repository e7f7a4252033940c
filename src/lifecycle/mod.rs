//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Router::init → Router::start
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → router loop exits after current message
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl+C) / SIGTERM → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then the route table, then the actor
//! - The actor never stops mid-message

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, RouterRuntime, StartupError};
