//! CLI subcommands.

pub mod preview;
pub mod update;
