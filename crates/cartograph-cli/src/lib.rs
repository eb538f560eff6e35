//! Cartograph CLI library.
//!
//! Argument parsing, command handlers and terminal output for the
//! `cartograph` binary.

pub mod cli;
pub mod commands;
pub mod output;
