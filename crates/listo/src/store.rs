//! Session-scoped key/value store with template interpolation.
//!
//! The store publishes an immutable snapshot that is replaced wholesale on
//! every write: a `put` clones the current mapping, inserts, and swaps the
//! snapshot pointer. Writes are O(n), which is acceptable for test state
//! written a handful of times per test, and any snapshot handed out earlier
//! stays valid and unchanged.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::result::{ListoError, ListoResult};

/// Maximum interpolation passes before giving up on a template.
///
/// A stored value may itself contain a placeholder, so expansion loops until
/// the template settles; this cap turns a cyclic substitution into an error
/// instead of a hang.
pub const MAX_EXPANSIONS: usize = 64;

/// Matches a single `${identifier}` placeholder
const INTERPOLATE_SINGLE: &str = r"\$\{(\w+)\}";

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(INTERPOLATE_SINGLE).expect("placeholder pattern is valid"))
}

/// Session-scoped associative snapshot
#[derive(Debug, Clone, Default)]
pub struct Store {
    snapshot: Arc<HashMap<String, Value>>,
}

impl Store {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, republishing the snapshot.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::EmptyKey`] for an empty key, or a JSON error
    /// if the value cannot be serialized.
    pub fn put(&mut self, key: impl Into<String>, value: impl Serialize) -> ListoResult<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(ListoError::EmptyKey);
        }
        let value = serde_json::to_value(value)?;
        let mut next: HashMap<String, Value> = (*self.snapshot).clone();
        next.insert(key, value);
        self.snapshot = Arc::new(next);
        Ok(())
    }

    /// Look a value up.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::EmptyKey`] for an empty key and
    /// [`ListoError::KeyNotFound`] for an absent one.
    pub fn get(&self, key: &str) -> ListoResult<&Value> {
        if key.is_empty() {
            return Err(ListoError::EmptyKey);
        }
        self.snapshot
            .get(key)
            .ok_or_else(|| ListoError::KeyNotFound {
                key: key.to_string(),
            })
    }

    /// Look a value up and deserialize it into `T`.
    ///
    /// The type is caller-asserted; a stored value of the wrong shape fails
    /// deserialization at the call site, not at `put` time.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> ListoResult<T> {
        Ok(serde_json::from_value(self.get(key)?.clone())?)
    }

    /// Whether a key is present
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.snapshot.contains_key(key)
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// The current immutable snapshot.
    ///
    /// The returned mapping never changes; later writes publish a new one.
    #[must_use]
    pub fn snapshot(&self) -> Arc<HashMap<String, Value>> {
        Arc::clone(&self.snapshot)
    }

    /// Expand every `${identifier}` placeholder in `template` against stored
    /// values.
    ///
    /// The first placeholder is replaced with the stringified stored value
    /// (strings verbatim, everything else rendered as JSON) and the updated
    /// string is re-scanned, so a value containing another placeholder is
    /// expanded on the next pass.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::InterpolationKeyNotFound`] naming the
    /// placeholder that missed, or [`ListoError::InterpolationDepthExceeded`]
    /// if expansion does not settle within [`MAX_EXPANSIONS`] passes.
    pub fn interpolate(&self, template: &str) -> ListoResult<String> {
        let pattern = placeholder_pattern();
        let mut result = template.to_string();

        for _ in 0..MAX_EXPANSIONS {
            let found = pattern.captures(&result).map(|captures| {
                let range = captures.get(0).map_or(0..0, |whole| whole.range());
                let placeholder = captures
                    .get(1)
                    .map(|group| group.as_str().to_string())
                    .unwrap_or_default();
                (range, placeholder)
            });
            let Some((range, placeholder)) = found else {
                return Ok(result);
            };

            let value =
                self.get(&placeholder)
                    .map_err(|source| ListoError::InterpolationKeyNotFound {
                        placeholder: placeholder.clone(),
                        source: Box::new(source),
                    })?;
            let rendered = render(value);
            result.replace_range(range, &rendered);
        }

        Err(ListoError::InterpolationDepthExceeded {
            limit: MAX_EXPANSIONS,
        })
    }
}

/// Stringify a stored value for interpolation
fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    mod put_get_tests {
        use super::*;

        #[test]
        fn test_round_trip() {
            let mut store = Store::new();
            store.put("x", 42).unwrap();
            assert_eq!(store.get("x").unwrap(), &Value::from(42));
        }

        #[test]
        fn test_missing_key() {
            let store = Store::new();
            let result = store.get("missing");
            assert!(matches!(
                result,
                Err(ListoError::KeyNotFound { key }) if key == "missing"
            ));
        }

        #[test]
        fn test_empty_key_rejected_on_read_and_write() {
            let mut store = Store::new();
            assert!(matches!(store.get(""), Err(ListoError::EmptyKey)));
            assert!(matches!(store.put("", 1), Err(ListoError::EmptyKey)));
        }

        #[test]
        fn test_overwrite_replaces_value() {
            let mut store = Store::new();
            store.put("host", "staging").unwrap();
            store.put("host", "production").unwrap();
            assert_eq!(store.get("host").unwrap(), "production");
            assert_eq!(store.len(), 1);
        }

        #[test]
        fn test_typed_read() {
            #[derive(Debug, PartialEq, Serialize, Deserialize)]
            struct Credentials {
                user: String,
                attempts: u32,
            }

            let mut store = Store::new();
            store
                .put(
                    "credentials",
                    Credentials {
                        user: "ana".to_string(),
                        attempts: 3,
                    },
                )
                .unwrap();
            let read: Credentials = store.get_as("credentials").unwrap();
            assert_eq!(read.user, "ana");
            assert_eq!(read.attempts, 3);
        }

        #[test]
        fn test_typed_read_wrong_shape_is_caller_error() {
            let mut store = Store::new();
            store.put("count", "three").unwrap();
            let result: ListoResult<u32> = store.get_as("count");
            assert!(matches!(result, Err(ListoError::Json(_))));
        }

        #[test]
        fn test_reads_do_not_mutate() {
            let mut store = Store::new();
            store.put("k", 1).unwrap();
            let _ = store.get("k").unwrap();
            let _ = store.get("k").unwrap();
            assert_eq!(store.len(), 1);
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn test_earlier_snapshot_unchanged_by_later_writes() {
            let mut store = Store::new();
            store.put("step", "one").unwrap();
            let before = store.snapshot();
            store.put("step", "two").unwrap();

            assert_eq!(before.get("step").unwrap(), "one");
            assert_eq!(store.get("step").unwrap(), "two");
        }
    }

    mod interpolation_tests {
        use super::*;

        #[test]
        fn test_simple_substitution() {
            let mut store = Store::new();
            store.put("name", "world").unwrap();
            assert_eq!(store.interpolate("hello ${name}").unwrap(), "hello world");
        }

        #[test]
        fn test_multiple_placeholders() {
            let mut store = Store::new();
            store.put("user", "ana").unwrap();
            store.put("id", 7).unwrap();
            assert_eq!(
                store.interpolate("/users/${id}?by=${user}").unwrap(),
                "/users/7?by=ana"
            );
        }

        #[test]
        fn test_repeated_placeholder() {
            let mut store = Store::new();
            store.put("x", "a").unwrap();
            assert_eq!(store.interpolate("${x}${x}${x}").unwrap(), "aaa");
        }

        #[test]
        fn test_value_containing_placeholder_expands_on_next_pass() {
            let mut store = Store::new();
            store.put("greeting", "hello ${name}").unwrap();
            store.put("name", "world").unwrap();
            assert_eq!(store.interpolate("${greeting}!").unwrap(), "hello world!");
        }

        #[test]
        fn test_missing_placeholder_names_it() {
            let store = Store::new();
            let result = store.interpolate("${missing}");
            match result {
                Err(ListoError::InterpolationKeyNotFound {
                    placeholder,
                    source,
                }) => {
                    assert_eq!(placeholder, "missing");
                    assert!(matches!(*source, ListoError::KeyNotFound { .. }));
                }
                other => panic!("expected InterpolationKeyNotFound, got {other:?}"),
            }
        }

        #[test]
        fn test_template_without_placeholders_is_returned_as_is() {
            let store = Store::new();
            assert_eq!(store.interpolate("plain text").unwrap(), "plain text");
        }

        #[test]
        fn test_cyclic_substitution_hits_depth_limit() {
            let mut store = Store::new();
            store.put("a", "${b}").unwrap();
            store.put("b", "${a}").unwrap();
            let result = store.interpolate("${a}");
            assert!(matches!(
                result,
                Err(ListoError::InterpolationDepthExceeded { limit: MAX_EXPANSIONS })
            ));
        }

        #[test]
        fn test_non_string_values_render_as_json() {
            let mut store = Store::new();
            store.put("flag", true).unwrap();
            store.put("ids", vec![1, 2]).unwrap();
            assert_eq!(
                store.interpolate("${flag}:${ids}").unwrap(),
                "true:[1,2]"
            );
        }
    }
}
