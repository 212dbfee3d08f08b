//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

// Internal modules - not part of public API
pub(crate) mod account_loader;
pub(crate) mod countdown;
pub(crate) mod logger;
pub(crate) mod runner;
pub(crate) mod scheduler;

// Selective exports - only public utilities
pub use account_loader::AccountLoader;
pub use countdown::{format_remaining, wait_with_countdown};
pub use logger::{setup_logger, setup_logger_with_file, SUCCESS_TARGET};
pub use runner::WorkerRunner;
pub use scheduler::{compute_wait, RunState};
