use crate::capability::{Capability, Implementation};
use crate::guard::{self, Guard, GuardCapability};
use crate::schema::{Literal, BOOLEAN, NUMBER, STRING};
use crate::value::{merge_all, NULL};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Turns a value of the decoded domain back into raw form.
///
/// Encoding assumes its input belongs to the schema's domain; values outside
/// it are passed through unchanged.
#[derive(Clone)]
pub struct Encoder {
    guard: Guard,
    encode: Arc<dyn Fn(&Value) -> Value + Send + Sync>,
}

impl Encoder {
    pub fn new(guard: Guard, encode: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        Self {
            guard,
            encode: Arc::new(encode),
        }
    }

    /// An encoder whose raw form is the decoded value itself.
    pub fn identity(guard: Guard) -> Self {
        Self::new(guard, Value::clone)
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    pub fn encode(&self, value: &Value) -> Value {
        (self.encode)(value)
    }
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Encoder(..)")
    }
}

pub fn standard() -> Implementation<EncoderCapability> {
    Implementation::register(
        EncoderCapability,
        vec![
            (STRING, Encoder::identity(guard::string())),
            (NUMBER, Encoder::identity(guard::number())),
            (BOOLEAN, Encoder::identity(guard::boolean())),
        ],
    )
}

pub struct EncoderCapability;

impl Capability for EncoderCapability {
    type Behavior = Encoder;

    fn name(&self) -> &'static str {
        "Encoder"
    }

    fn literal(&self, values: &[Literal]) -> Encoder {
        Encoder::identity(GuardCapability.literal(values))
    }

    fn structure(&self, fields: Vec<(String, Encoder)>) -> Encoder {
        let guard = GuardCapability.structure(
            fields
                .iter()
                .map(|(name, encoder)| (name.clone(), encoder.guard.clone()))
                .collect(),
        );

        Encoder::new(guard, move |value| match value.as_object() {
            Some(obj) => {
                let mut out = Map::new();
                for (name, encoder) in &fields {
                    out.insert(name.clone(), encoder.encode(obj.get(name).unwrap_or(&NULL)));
                }
                Value::Object(out)
            }
            None => value.clone(),
        })
    }

    /// Encodes with the first alternative whose guard accepts the value.
    fn union(&self, alternatives: Vec<Encoder>) -> Encoder {
        let guard =
            GuardCapability.union(alternatives.iter().map(|encoder| encoder.guard.clone()).collect());

        Encoder::new(guard, move |value| {
            match alternatives.iter().find(|encoder| encoder.guard.is(value)) {
                Some(encoder) => encoder.encode(value),
                None => value.clone(),
            }
        })
    }

    fn intersection(&self, parts: Vec<Encoder>) -> Encoder {
        let guard =
            GuardCapability.intersection(parts.iter().map(|encoder| encoder.guard.clone()).collect());

        Encoder::new(guard, move |value| {
            merge_all(parts.iter().map(|encoder| encoder.encode(value)).collect())
                .unwrap_or_else(|| value.clone())
        })
    }

    fn array(&self, element: Encoder) -> Encoder {
        let guard = GuardCapability.array(element.guard.clone());

        Encoder::new(guard, move |value| match value.as_array() {
            Some(items) => Value::Array(items.iter().map(|item| element.encode(item)).collect()),
            None => value.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{self, array, intersection, literal, structure, union};
    use serde_json::json;

    /// Encodes booleans as "yes"/"no".
    fn yes_no() -> Encoder {
        Encoder::new(guard::boolean(), |value| match value.as_bool() {
            Some(true) => json!("yes"),
            Some(false) => json!("no"),
            None => value.clone(),
        })
    }

    #[test]
    fn custom_primitive_is_encoded_inside_shapes() {
        let implementation = standard().extend("YesNo", yes_no());
        let schema = structure(vec![
            ("name", schema::string()),
            ("flags", array(schema::primitive("YesNo"))),
        ]);

        let encoder = implementation.interpret(&schema).unwrap();
        assert_eq!(
            json!({ "name": "a", "flags": ["yes", "no"] }),
            encoder.encode(&json!({ "name": "a", "flags": [true, false], "dropped": 1 }))
        );
    }

    #[test]
    fn union_uses_first_accepting_alternative() {
        let implementation = standard().extend("YesNo", yes_no());
        let encoder = implementation
            .interpret(&union(vec![literal(["maybe"]), schema::primitive("YesNo")]))
            .unwrap();

        assert_eq!(json!("maybe"), encoder.encode(&json!("maybe")));
        assert_eq!(json!("yes"), encoder.encode(&json!(true)));
    }

    #[test]
    fn intersection_merges_encodings() {
        let encoder = standard()
            .interpret(&intersection(vec![
                structure(vec![("a", schema::string())]),
                structure(vec![("b", schema::number())]),
            ]))
            .unwrap();

        assert_eq!(
            json!({ "a": "x", "b": 1 }),
            encoder.encode(&json!({ "a": "x", "b": 1 }))
        );
    }
}
