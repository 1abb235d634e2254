use serde_json::{Number, Value};

pub(crate) static NULL: Value = Value::Null;

/// Merges the results of intersection parts. Objects merge key-wise with later
/// parts winning; for anything else the last part wins.
pub(crate) fn merge_all(values: Vec<Value>) -> Option<Value> {
    let mut values = values.into_iter();
    let mut merged = values.next()?;

    for value in values {
        match (&mut merged, value) {
            (Value::Object(into), Value::Object(from)) => into.extend(from),
            (slot, value) => *slot = value,
        }
    }

    Some(merged)
}

/// Stores whole numbers as JSON integers and everything else as floats.
pub(crate) fn number_value(n: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    if n.fract() == 0.0 && n.abs() < MAX_EXACT {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_objects_later_wins() {
        assert_eq!(
            Some(json!({ "a": 1, "b": 3, "c": 4 })),
            merge_all(vec![json!({ "a": 1, "b": 2 }), json!({ "b": 3, "c": 4 })])
        );
    }

    #[test]
    fn merge_non_objects_takes_last() {
        assert_eq!(Some(json!("b")), merge_all(vec![json!("a"), json!("b")]));
        assert_eq!(None, merge_all(vec![]));
    }

    #[test]
    fn whole_numbers_are_integers() {
        assert_eq!(json!(12), number_value(12.0));
        assert_eq!(json!(120.65), number_value(120.65));
        assert_eq!(Value::Null, number_value(f64::NAN));
    }
}
