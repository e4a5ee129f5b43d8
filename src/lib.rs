//! tasklist - local todo-list library
//!
//! This library provides the core functionality for the tasklist CLI:
//! a task store persisted to a key-value blob store, and two sorted views
//! (active and completed) derived from it.
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `tasklist.toml`
//! - `error`: Error types and result aliases
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON output formatting
//! - `persistence`: Typed load/save of state blobs
//! - `prefs`: Theme and view sort preferences
//! - `storage`: Key-value blob stores (file and in-memory)
//! - `task`: Task model and the task store
//! - `view`: Sorted active/completed projections

pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod output;
pub mod persistence;
pub mod prefs;
pub mod storage;
pub mod task;
pub mod view;

pub use error::{Error, Result};
