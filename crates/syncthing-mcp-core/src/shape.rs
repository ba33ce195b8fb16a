//! Response shaper
//!
//! Every tool result passes through [`shape`] before it reaches the
//! assistant. A result type decides what its compact and verbose projections
//! contain by implementing [`Project`]; the shaper serializes the projection
//! and enforces [`CHARACTER_LIMIT`].
//!
//! Compact output is serialized without whitespace; verbose output is
//! pretty-printed with two-space indentation. Oversized output is replaced by
//! a bounded summary that is still valid JSON and tells the reader how to
//! narrow the request.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::domain::{shorten_id, DeviceId, ELLIPSIS};

/// Maximum serialized response size, in characters
pub const CHARACTER_LIMIT: usize = 25_000;

/// Longest string kept verbatim in a truncation summary
const SUMMARY_STRING_LIMIT: usize = 200;

/// Nesting depth expanded in a truncation summary
const SUMMARY_DEPTH: usize = 2;

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

// ============================================================================
// Project
// ============================================================================

/// A result that can be rendered as a compact or verbose JSON projection
///
/// Implementations must be pure: the same value and flag always produce the
/// same projection, and the verbose projection carries every field of the
/// compact one.
pub trait Project {
    /// Builds the JSON projection for the requested detail level
    fn project(&self, concise: bool) -> Value;
}

/// Passthrough payloads are already JSON and project to themselves
impl Project for Value {
    fn project(&self, _concise: bool) -> Value {
        self.clone()
    }
}

impl<T: Project + ?Sized> Project for &T {
    fn project(&self, concise: bool) -> Value {
        (**self).project(concise)
    }
}

// ============================================================================
// shape
// ============================================================================

/// Projects and serializes a result, enforcing [`CHARACTER_LIMIT`]
pub fn shape<P: Project + ?Sized>(result: &P, concise: bool) -> String {
    shape_with_limit(result, concise, CHARACTER_LIMIT)
}

/// Same as [`shape`] with an explicit character limit
///
/// The limit is checked against the verbose rendering in both modes, so a
/// compact response is summarized exactly when the verbose one would be.
pub fn shape_with_limit<P: Project + ?Sized>(result: &P, concise: bool, limit: usize) -> String {
    let verbose = result.project(false);
    let verbose_rendered = render(&verbose, false);
    let original_chars = verbose_rendered.chars().count();

    if original_chars <= limit {
        if !concise {
            return verbose_rendered;
        }
        let rendered = render(&result.project(true), true);
        if rendered.chars().count() <= limit {
            return rendered;
        }
    }

    debug!(original_chars, limit, concise, "Response over limit, summarizing");
    render(&truncated(&verbose, original_chars, limit), concise)
}

/// Serializes a value compactly or pretty-printed
#[must_use]
pub fn render(value: &Value, concise: bool) -> String {
    if concise {
        value.to_string()
    } else {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }
}

/// Reader guidance attached to every truncated response
#[must_use]
pub fn truncation_guidance(original_chars: usize, limit: usize) -> String {
    format!(
        "Response truncated: the full result is {original_chars} characters, over the \
         {limit}-character limit, so the data above is incomplete. Use pagination \
         (page/per_page) or narrower filters (folder, device, prefix) to retrieve the rest."
    )
}

/// Builds the summary envelope, sized so its verbose rendering fits
///
/// The compact rendering of the same envelope is never longer.
fn truncated(projected: &Value, original_chars: usize, limit: usize) -> Value {
    let guidance = truncation_guidance(original_chars, limit);

    let mut envelope = Map::new();
    envelope.insert("truncated".to_string(), Value::Bool(true));
    envelope.insert("originalChars".to_string(), json!(original_chars));
    envelope.insert("limit".to_string(), json!(limit));
    envelope.insert("summary".to_string(), summarize(projected, SUMMARY_DEPTH));
    envelope.insert("guidance".to_string(), Value::String(guidance));

    let full = Value::Object(envelope.clone());
    if render(&full, false).chars().count() <= limit {
        return full;
    }

    envelope.remove("summary");
    let bare = Value::Object(envelope);
    if render(&bare, false).chars().count() <= limit {
        return bare;
    }

    // Limit smaller than the envelope itself
    json!({
        "truncated": true,
        "guidance": "Use pagination or narrower filters."
    })
}

/// Reduces a value to its shape: scalars kept, collections counted
fn summarize(value: &Value, depth: usize) -> Value {
    match value {
        Value::Object(map) if depth > 0 => Value::Object(
            map.iter()
                .map(|(key, v)| (key.clone(), summarize(v, depth - 1)))
                .collect(),
        ),
        Value::Object(map) => json!({ "fields": map.len() }),
        Value::Array(items) => json!({ "count": items.len() }),
        Value::String(s) => Value::String(clip(s, SUMMARY_STRING_LIMIT)),
        scalar => scalar.clone(),
    }
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut clipped: String = s.chars().take(max).collect();
    clipped.push(ELLIPSIS);
    clipped
}

// ============================================================================
// Projection helpers
// ============================================================================

/// Formats a byte count with base-1024 units and one decimal
///
/// `0` renders as `"0.0 B"`, `2048` as `"2.0 KB"`.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in BYTE_UNITS {
        if value < 1024.0 {
            return format!("{value:.1} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1} PB")
}

/// Inserts a byte count under `key`
///
/// Compact projections get the human-scaled string. Verbose projections get
/// the raw integer plus the human string under `<key>Human`.
pub fn insert_bytes(map: &mut Map<String, Value>, key: &str, bytes: u64, concise: bool) {
    if concise {
        map.insert(key.to_string(), Value::String(format_bytes(bytes)));
    } else {
        map.insert(key.to_string(), json!(bytes));
        map.insert(format!("{key}Human"), Value::String(format_bytes(bytes)));
    }
}

/// Device ID as shown in a projection
#[must_use]
pub fn device_ref(id: &DeviceId, concise: bool) -> Value {
    Value::String(device_str(id.as_str(), concise))
}

/// Raw device ID string as shown in a projection
#[must_use]
pub fn device_str(id: &str, concise: bool) -> String {
    if concise {
        shorten_id(id)
    } else {
        id.to_string()
    }
}

/// Rounds a percentage to two decimals
#[must_use]
pub fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
