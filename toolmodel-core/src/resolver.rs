//! `$ref` pointer resolution.
//!
//! Only fragment-local pointers (`#` and `#/a/b/c`) are supported. Pointers
//! are always resolved against the document root, never a subtree.

use serde_json::Value as JsonValue;

use crate::errors::{BuildError, BuildResult};

/// Resolve a local `$ref` pointer against a schema document.
///
/// # Example
///
/// ```rust
/// use toolmodel_core::resolver::resolve;
///
/// let doc = serde_json::json!({"$defs": {"Point": {"type": "object"}}});
/// let point = resolve(&doc, "#/$defs/Point").unwrap();
/// assert_eq!(point["type"], "object");
/// ```
pub fn resolve<'a>(document: &'a JsonValue, pointer: &str) -> BuildResult<&'a JsonValue> {
    let Some(fragment) = pointer.strip_prefix('#') else {
        return Err(BuildError::non_local(pointer));
    };
    if fragment.is_empty() {
        return Ok(document);
    }
    let Some(path) = fragment.strip_prefix('/') else {
        return Err(BuildError::non_local(pointer));
    };

    let mut current = document;
    for raw in path.split('/') {
        let segment = unescape_segment(raw);
        current = match current {
            JsonValue::Object(map) => map.get(segment.as_str()).ok_or_else(|| {
                BuildError::missing_segment(pointer, &segment, map.keys().cloned().collect())
            })?,
            JsonValue::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .ok_or_else(|| {
                    BuildError::missing_segment(
                        pointer,
                        &segment,
                        (0..items.len()).map(|i| i.to_string()).collect(),
                    )
                })?,
            _ => return Err(BuildError::missing_segment(pointer, segment, Vec::new())),
        };
    }

    tracing::trace!(pointer = %pointer, "Resolved reference");
    Ok(current)
}

/// The last segment of a `#/$defs/<name>` or `#/definitions/<name>` pointer.
#[must_use]
pub fn definition_key(pointer: &str) -> Option<String> {
    let rest = pointer
        .strip_prefix("#/$defs/")
        .or_else(|| pointer.strip_prefix("#/definitions/"))?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(unescape_segment(rest))
}

/// Append an escaped segment to a JSON pointer.
#[must_use]
pub fn join_pointer(base: &str, segment: &str) -> String {
    let escaped = segment.replace('~', "~0").replace('/', "~1");
    format!("{base}/{escaped}")
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
