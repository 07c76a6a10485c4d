//! Header containers the trace context is read from and written to
//!
//! Header names are matched case-insensitively. When a name carries several
//! values the first one is read, and writing replaces all of them.

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use std::collections::HashMap;
use tracing::warn;

/// Ordered, string-keyed header carrier.
///
/// `Clone` must produce an independent copy: mutating the clone never
/// affects the original.
pub trait HeaderContainer: Clone {
    /// Get the first value of a header
    fn get_header(&self, name: &str) -> Option<&str>;

    /// Replace all values of a header with a single value
    fn set_header(&mut self, name: &str, value: String);

    /// Remove a header entirely
    fn delete_header(&mut self, name: &str);
}

impl HeaderContainer for HeaderMap {
    fn get_header(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }

    fn set_header(&mut self, name: &str, value: String) {
        let name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => name,
            Err(e) => {
                warn!(header = name, error = %e, "Refusing to write invalid header name");
                return;
            },
        };
        match HeaderValue::try_from(value) {
            Ok(value) => {
                self.insert(name, value);
            },
            Err(e) => {
                warn!(header = %name, error = %e, "Refusing to write invalid header value");
            },
        }
    }

    fn delete_header(&mut self, name: &str) {
        self.remove(name);
    }
}

/// An exact-case key wins. Otherwise, when several keys differ only in case,
/// which of them is read is unspecified.
impl HeaderContainer for HashMap<String, String> {
    fn get_header(&self, name: &str) -> Option<&str> {
        self.get(name)
            .or_else(|| {
                self.iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    fn set_header(&mut self, name: &str, value: String) {
        self.delete_header(name);
        self.insert(name.to_string(), value);
    }

    fn delete_header(&mut self, name: &str) {
        self.retain(|k, _| !k.eq_ignore_ascii_case(name));
    }
}

/// Multi-valued map, as handed over by proxies that expose raw header lists.
///
/// Key lookup follows the single-valued map.
impl HeaderContainer for HashMap<String, Vec<String>> {
    fn get_header(&self, name: &str) -> Option<&str> {
        self.get(name)
            .or_else(|| {
                self.iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, values)| values)
            })
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    fn set_header(&mut self, name: &str, value: String) {
        self.delete_header(name);
        self.insert(name.to_string(), vec![value]);
    }

    fn delete_header(&mut self, name: &str) {
        self.retain(|k, _| !k.eq_ignore_ascii_case(name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_map() {
        let mut headers = HeaderMap::new();
        headers.append("traceparent", HeaderValue::from_static("first"));
        headers.append("traceparent", HeaderValue::from_static("second"));

        assert_eq!(headers.get_header("TraceParent"), Some("first"));

        headers.set_header("traceparent", "replaced".to_string());
        assert_eq!(headers.get_all("traceparent").iter().count(), 1);
        assert_eq!(headers.get_header("traceparent"), Some("replaced"));

        headers.delete_header("TRACEPARENT");
        assert_eq!(headers.get_header("traceparent"), None);
    }

    #[test]
    fn test_header_map_rejects_invalid_value() {
        let mut headers = HeaderMap::new();
        headers.set_header("tracestate", "bad\nvalue".to_string());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_hash_map_case_insensitive() {
        let mut headers: HashMap<String, String> = HashMap::new();
        headers.insert("TraceState".to_string(), "a=1".to_string());

        assert_eq!(headers.get_header("tracestate"), Some("a=1"));

        headers.set_header("tracestate", "b=2".to_string());
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get_header("TRACESTATE"), Some("b=2"));

        headers.delete_header("tracestate");
        assert!(headers.is_empty());
    }

    #[test]
    fn test_hash_map_prefers_exact_name() {
        let mut headers: HashMap<String, String> = HashMap::new();
        headers.insert("traceparent".to_string(), "lower".to_string());
        headers.insert("Traceparent".to_string(), "title".to_string());

        assert_eq!(headers.get_header("traceparent"), Some("lower"));
        assert_eq!(headers.get_header("Traceparent"), Some("title"));

        let mut multi: HashMap<String, Vec<String>> = HashMap::new();
        multi.insert("tracestate".to_string(), vec!["lower".to_string()]);
        multi.insert("TRACESTATE".to_string(), vec!["upper".to_string()]);

        assert_eq!(multi.get_header("tracestate"), Some("lower"));
        assert_eq!(multi.get_header("TRACESTATE"), Some("upper"));
    }

    #[test]
    fn test_multi_map() {
        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        headers.insert(
            "traceparent".to_string(),
            vec!["one".to_string(), "two".to_string()],
        );
        headers.insert("empty".to_string(), Vec::new());

        assert_eq!(headers.get_header("traceparent"), Some("one"));
        assert_eq!(headers.get_header("empty"), None);

        headers.set_header("traceparent", "three".to_string());
        assert_eq!(headers["traceparent"], vec!["three".to_string()]);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original: HashMap<String, String> = HashMap::new();
        original.set_header("traceparent", "a".to_string());

        let mut copy = original.clone();
        copy.set_header("traceparent", "b".to_string());
        copy.delete_header("traceparent");

        assert_eq!(original.get_header("traceparent"), Some("a"));
    }
}
