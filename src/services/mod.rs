//! Service layer for business logic
//!
//! This module provides the link lifecycle rules and the background expiry
//! sweep, shared by every interface (CLI commands and the interactive shell).

mod link_service;
mod reclaimer;

pub use link_service::*;
pub use reclaimer::{ExpiryReclaimer, ReclaimerHandle};
