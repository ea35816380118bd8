//! imglift CLI library
//!
//! Exposes the argument parser, configuration loading, and command
//! implementations for the `ilf` binary.

pub mod cli;
pub mod commands;
pub mod config;
