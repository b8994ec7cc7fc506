//! Public-prefix path rewriting.
//!
//! # Responsibilities
//! - Strip the configured public prefix from an inbound path
//! - Leave everything after the prefix intact; the query string is not
//!   part of the rewrite
//!
//! # Design Decisions
//! - Exact string match at path start, case-sensitive, first occurrence only
//! - A path without the prefix passes through unchanged; routing only
//!   delivers prefixed paths here in normal operation
//! - Stripping the entire path yields the upstream root

/// Rewrites inbound paths into the upstream's native path space.
#[derive(Debug, Clone)]
pub struct PathRewriter {
    prefix: String,
}

impl PathRewriter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Strip the prefix from `path` once.
    pub fn rewrite(&self, path: &str) -> String {
        match path.strip_prefix(&self.prefix) {
            Some("") => "/".to_string(),
            Some(rest) => rest.to_string(),
            None => path.to_string(),
        }
    }
}
