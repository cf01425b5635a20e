//! # pupfmt
//!
//! A parser and canonical formatter for Puppet-style manifests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pupfmt::manifest::{format_source, PupfmtConfig};
//!
//! let formatted = format_source("file{'/tmp/a':ensure=>present}", &PupfmtConfig::default())?;
//! ```
//!
//! See the [manifest] module for the pipeline, and [manifest::config] for the knobs.

pub mod manifest;
