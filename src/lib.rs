//! Submodule update library.
//!
//! This crate bumps one shared git submodule across many consumer repos by:
//! - Cloning the submodule's own repo and resolving its target branch HEAD
//! - Cloning each selected consumer repo and checking out its branch
//! - Skipping repos whose submodule pointer already matches
//! - Pulling the submodule to latest, committing the new pointer, and pushing

pub mod cli;
pub mod command;
pub mod config;
pub mod constants;
pub mod error;
pub mod git;
pub mod menu;
pub mod output;
pub mod prompt;
pub mod repo;
pub mod settings;
