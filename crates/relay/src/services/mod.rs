//! Business logic shared by the HTTP handler and the CLI.

pub mod profile;
