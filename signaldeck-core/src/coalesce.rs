//! Field coalescer: first present value along an ordered list of dotted paths.
//!
//! A path "hits" when every segment resolves to a non-null value. Object keys
//! are addressed by name; a numeric segment also indexes into arrays, so
//! `recommendation.take_profit.0` reaches the first target. Absence is an
//! ordinary outcome and never an error. Values are passed through untouched;
//! converting them to display text is a separate step (`display_value`).

use serde_json::{Number, Value};

/// Sentinel shown for any display field the source did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Walk a single dotted path. Returns `None` on any absent or null segment.
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
        if current.is_null() {
            return None;
        }
    }
    Some(current)
}

/// Borrowing variant of [`coalesce`]: the first hit, if any.
pub fn first_present<'a>(doc: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths.iter().find_map(|path| lookup(doc, path))
}

/// Like [`first_present`], but an object or array hit does not count and
/// the search moves on to the next path.
pub fn first_scalar<'a>(doc: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| lookup(doc, path))
        .find(|v| !v.is_object() && !v.is_array())
}

/// Return the first hit among `paths` (in order), else `default`.
pub fn coalesce(doc: &Value, paths: &[&str], default: Value) -> Value {
    first_present(doc, paths).cloned().unwrap_or(default)
}

/// Coalesce and render the hit as display text.
pub fn coalesce_display(doc: &Value, paths: &[&str], default: &str) -> String {
    first_present(doc, paths)
        .map(display_value)
        .unwrap_or_else(|| default.to_string())
}

/// Render an upstream value the way the dashboard shows it.
///
/// Integral numbers print without a fractional part (`45000.0` → `45000`),
/// arrays are joined with `" - "`, and objects fall back to compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => NOT_AVAILABLE.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => display_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(" - "),
        Value::Object(_) => value.to_string(),
    }
}

fn display_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_walks_nested_objects() {
        let doc = json!({"a": {"b": {"c": 7}}});
        assert_eq!(lookup(&doc, "a.b.c"), Some(&json!(7)));
        assert_eq!(lookup(&doc, "a.b"), Some(&json!({"c": 7})));
    }

    #[test]
    fn lookup_indexes_arrays_with_numeric_segments() {
        let doc = json!({"tp": [48000, 50000]});
        assert_eq!(lookup(&doc, "tp.1"), Some(&json!(50000)));
        assert_eq!(lookup(&doc, "tp.2"), None);
        assert_eq!(lookup(&doc, "tp.x"), None);
    }

    #[test]
    fn null_segment_is_a_miss() {
        let doc = json!({"a": null, "b": {"c": null}});
        assert_eq!(lookup(&doc, "a"), None);
        assert_eq!(lookup(&doc, "a.x"), None);
        assert_eq!(lookup(&doc, "b.c"), None);
    }

    #[test]
    fn traversal_through_scalar_is_a_miss() {
        let doc = json!({"stop_loss": 44000});
        assert_eq!(lookup(&doc, "stop_loss.price"), None);
    }

    #[test]
    fn coalesce_returns_first_hit_in_order() {
        let doc = json!({"expected_win_rate": 72, "win_rate": 60});
        let v = coalesce(&doc, &["expected_win_rate", "win_rate"], json!("N/A"));
        assert_eq!(v, json!(72));
        let v = coalesce(&doc, &["missing", "win_rate"], json!("N/A"));
        assert_eq!(v, json!(60));
    }

    #[test]
    fn first_scalar_skips_structured_hits() {
        let doc = json!({"sl": {"type": "HARD"}, "levels": [1, 2], "pct": 3});
        assert_eq!(first_scalar(&doc, &["sl", "levels", "pct"]), Some(&json!(3)));
        assert_eq!(first_scalar(&doc, &["sl", "levels"]), None);
    }

    #[test]
    fn coalesce_falls_back_to_default() {
        let doc = json!({});
        assert_eq!(coalesce(&doc, &["a", "b.c"], json!("LOW")), json!("LOW"));
        assert_eq!(coalesce(&doc, &[], json!(0)), json!(0));
    }

    #[test]
    fn zero_and_empty_string_are_hits() {
        let doc = json!({"score": 0, "label": ""});
        assert_eq!(coalesce(&doc, &["score"], json!("N/A")), json!(0));
        assert_eq!(coalesce(&doc, &["label"], json!("N/A")), json!(""));
    }

    #[test]
    fn coalesce_does_not_coerce_types() {
        let doc = json!({"n": "8", "m": 8});
        assert_eq!(coalesce(&doc, &["n"], json!(null)), json!("8"));
        assert_eq!(coalesce(&doc, &["m"], json!(null)), json!(8));
    }

    #[test]
    fn display_value_formats_numbers_like_the_dashboard() {
        assert_eq!(display_value(&json!(45000)), "45000");
        assert_eq!(display_value(&json!(45000.0)), "45000");
        assert_eq!(display_value(&json!(2.5)), "2.5");
        assert_eq!(display_value(&json!(-3)), "-3");
        assert_eq!(display_value(&json!(0.1)), "0.1");
    }

    #[test]
    fn display_value_handles_composites() {
        assert_eq!(display_value(&json!([1, 2, 3])), "1 - 2 - 3");
        assert_eq!(display_value(&json!("HIGH")), "HIGH");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!(null)), NOT_AVAILABLE);
        assert_eq!(display_value(&json!({"type": "ATR"})), r#"{"type":"ATR"}"#);
    }

    #[test]
    fn coalesce_display_uses_default_on_miss() {
        let doc = json!({"rr": 2.75});
        assert_eq!(coalesce_display(&doc, &["rr"], NOT_AVAILABLE), "2.75");
        assert_eq!(coalesce_display(&doc, &["x"], NOT_AVAILABLE), "N/A");
    }
}
