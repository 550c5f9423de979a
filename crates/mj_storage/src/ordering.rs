//! Child ordering as the realtime database applies it for `orderBy`.

use serde_json::Value;
use std::cmp::Ordering;

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(false)) => 1,
        Some(Value::Bool(true)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Array(_)) | Some(Value::Object(_)) => 5,
    }
}

/// Compare two records by `field`, falling back to key order on ties.
pub fn compare_children(field: &str, (key_a, a): (&str, &Value), (key_b, b): (&str, &Value)) -> Ordering {
    let va = a.get(field);
    let vb = b.get(field);
    let by_value = rank(va).cmp(&rank(vb)).then_with(|| match (va, vb) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => Ordering::Equal,
    });
    by_value.then_with(|| key_a.cmp(key_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_before_numbers_before_strings() {
        let missing = json!({});
        let number = json!({ "date": 5 });
        let text = json!({ "date": "2024-01-01" });
        assert_eq!(compare_children("date", ("a", &missing), ("b", &number)), Ordering::Less);
        assert_eq!(compare_children("date", ("a", &number), ("b", &text)), Ordering::Less);
    }

    #[test]
    fn test_ties_break_on_key() {
        let v = json!({ "timestamp": 10 });
        assert_eq!(compare_children("timestamp", ("-a", &v), ("-b", &v)), Ordering::Less);
    }

    #[test]
    fn test_iso_strings_sort_chronologically() {
        let early = json!({ "date": "2024-01-01T00:00:00Z" });
        let late = json!({ "date": "2024-03-01T00:00:00Z" });
        assert_eq!(compare_children("date", ("z", &early), ("a", &late)), Ordering::Less);
    }
}
