//! Macro Monitor CLI
//!
//! Host for the estimation core: keeps profiles in a local data directory and
//! exposes profile management and estimation as subcommands.
//!
//! ## Layout
//!
//! - `cli`: argument definitions
//! - `commands`: one handler per subcommand
//! - `storage`: file-backed profile store
//! - `config`: layered configuration

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod storage;
