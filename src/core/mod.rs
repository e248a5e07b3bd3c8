//! Ambient plumbing: configuration, errors, logging, path mapping

pub mod config;
pub mod error;
pub mod logging;
pub mod project;
