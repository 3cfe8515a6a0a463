//! ttlink - Short links with a time-to-live and a visit budget
//!
//! Every link has an owner UUID, a short URL derived from it, an expiry
//! instant and a maximum number of visits. Resolving a short URL consumes one
//! visit atomically, so concurrent visitors can never exceed the budget.
//!
//! # Architecture
//! - `storage`: `LinkStore` trait with SeaORM (SQLite/MySQL/PostgreSQL) and in-memory backends
//! - `services`: Link lifecycle rules and the background expiry reclaimer
//! - `interfaces`: One-shot CLI commands and the interactive menu shell
//! - `config`: Configuration management
//! - `system`: Logging setup

pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
