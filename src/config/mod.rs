//! Configuration module for Mail-Ripple
//!
//! This module handles loading, parsing, and validating optional TOML
//! configuration files. Every field has a default, so an empty file (or no
//! file at all) yields a usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use mail_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mail-ripple.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserConfig, Config, CrawlerConfig, HttpConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
