//! Configuration module for Sumi-Mirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; command-line flags are applied on top of whatever the
//! file provides.
//!
//! # Example
//!
//! ```no_run
//! use sumi_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, HttpConfig, StorageConfig, DEFAULT_INDEX_FILE, DEFAULT_MAX_DEPTH,
};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config, parse_duration};
pub use validation::{validate, validate_seed, MAX_WORKERS};
