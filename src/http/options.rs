//! Per-request options and their query-parameter encoding.
//!
//! Recognized options are encoded into the query string; `timeout` and
//! `cache` are transport-only and extracted onto the
//! [`HttpRequest`](super::HttpRequest) instead. Unrecognized parameters
//! pass through verbatim.
//!
//! # Example
//!
//! ```
//! use flowthings::http::RequestOptions;
//! use flowthings::filter::Filter;
//! use serde_json::json;
//!
//! let opts = RequestOptions::new()
//!     .with_only(["id", "path"])
//!     .with_refs(true)
//!     .with_filter(Filter::query(json!({"foo": "bar"})));
//!
//! assert_eq!(
//!     opts.query_pairs(),
//!     vec![
//!         ("only".to_string(), "id,path".to_string()),
//!         ("refs".to_string(), "1".to_string()),
//!         ("filter".to_string(), r#"(foo == "bar")"#.to_string()),
//!     ]
//! );
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::filter::Filter;

// ============================================================================
// RequestOptions
// ============================================================================

/// Options applied to one REST request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Restrict returned fields; encoded as a comma-joined `only` parameter.
    pub only: Vec<String>,
    /// Request reference expansion; encoded as `refs=1`/`refs=0`.
    pub refs: Option<bool>,
    /// Result filter; compiled to the textual expression language.
    pub filter: Option<Filter>,
    /// Transport-only: per-request timeout, not part of the query string.
    pub timeout: Option<Duration>,
    /// Transport-only: response-cache hint, not part of the query string.
    pub cache: bool,
    /// Additional parameters passed through verbatim.
    pub params: Vec<(String, String)>,
}

// ============================================================================
// Builder Methods
// ============================================================================

impl RequestOptions {
    /// Creates empty options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts returned fields.
    #[inline]
    #[must_use]
    pub fn with_only(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.only = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Requests (or suppresses) reference expansion.
    #[inline]
    #[must_use]
    pub fn with_refs(mut self, refs: bool) -> Self {
        self.refs = Some(refs);
        self
    }

    /// Sets the result filter.
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sets a per-request timeout.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enables the transport cache hint.
    #[inline]
    #[must_use]
    pub fn with_cache(mut self) -> Self {
        self.cache = true;
        self
    }

    /// Adds a verbatim query parameter.
    #[inline]
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Returns `true` if reference expansion was requested.
    #[inline]
    #[must_use]
    pub fn wants_refs(&self) -> bool {
        self.refs == Some(true)
    }
}

// ============================================================================
// Query Encoding
// ============================================================================

impl RequestOptions {
    /// Encodes the recognized options plus passthrough parameters as
    /// query pairs. `timeout` and `cache` are deliberately absent.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if !self.only.is_empty() {
            pairs.push(("only".to_string(), self.only.join(",")));
        }
        if let Some(refs) = self.refs {
            let flag = if refs { "1" } else { "0" };
            pairs.push(("refs".to_string(), flag.to_string()));
        }
        if let Some(filter) = &self.filter {
            pairs.push(("filter".to_string(), filter.compile()));
        }
        for (key, value) in &self.params {
            pairs.push((key.clone(), value.clone()));
        }

        pairs
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_empty_options_encode_empty() {
        assert!(RequestOptions::new().query_pairs().is_empty());
    }

    #[test]
    fn test_only_comma_joined() {
        let opts = RequestOptions::new().with_only(["id", "path", "name"]);
        assert_eq!(
            opts.query_pairs(),
            vec![("only".to_string(), "id,path,name".to_string())]
        );
    }

    #[test]
    fn test_refs_flag_encoding() {
        let on = RequestOptions::new().with_refs(true);
        let off = RequestOptions::new().with_refs(false);

        assert_eq!(on.query_pairs(), vec![("refs".to_string(), "1".to_string())]);
        assert_eq!(off.query_pairs(), vec![("refs".to_string(), "0".to_string())]);
        assert!(on.wants_refs());
        assert!(!off.wants_refs());
    }

    #[test]
    fn test_filter_compiled_into_query() {
        let opts = RequestOptions::new().with_filter(Filter::query(json!({"a": 1})));
        assert_eq!(
            opts.query_pairs(),
            vec![("filter".to_string(), "(a == 1)".to_string())]
        );
    }

    #[test]
    fn test_raw_filter_passes_through() {
        let opts = RequestOptions::new().with_filter("(a > 2)");
        assert_eq!(
            opts.query_pairs(),
            vec![("filter".to_string(), "(a > 2)".to_string())]
        );
    }

    #[test]
    fn test_transport_options_excluded() {
        let opts = RequestOptions::new()
            .with_timeout(Duration::from_secs(5))
            .with_cache()
            .with_param("hints", "0");

        assert_eq!(
            opts.query_pairs(),
            vec![("hints".to_string(), "0".to_string())]
        );
        assert_eq!(opts.timeout, Some(Duration::from_secs(5)));
        assert!(opts.cache);
    }
}
