use crate::capability::{Capability, Implementation};
use crate::guard::{self, Guard, GuardCapability};
use crate::schema::{Literal, BOOLEAN, NUMBER, STRING};
use crate::value::NULL;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Equality over the decoded domain of a schema.
///
/// Each equality carries the guard of the same schema node; union equality
/// uses the guards of its alternatives to decide which alternative a value
/// belongs to.
#[derive(Clone)]
pub struct Equality {
    guard: Guard,
    equals: Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>,
}

impl Equality {
    pub fn new(
        guard: Guard,
        equals: impl Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            guard,
            equals: Arc::new(equals),
        }
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    pub fn equals(&self, a: &Value, b: &Value) -> bool {
        (self.equals)(a, b)
    }
}

impl fmt::Debug for Equality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Equality(..)")
    }
}

pub fn string() -> Equality {
    Equality::new(guard::string(), |a, b| match (a.as_str(), b.as_str()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    })
}

/// Numbers compare by value, so `12` equals `12.0`.
pub fn number() -> Equality {
    Equality::new(guard::number(), |a, b| match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    })
}

pub fn boolean() -> Equality {
    Equality::new(guard::boolean(), |a, b| match (a.as_bool(), b.as_bool()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    })
}

pub fn standard() -> Implementation<EqualityCapability> {
    Implementation::register(
        EqualityCapability,
        vec![(STRING, string()), (NUMBER, number()), (BOOLEAN, boolean())],
    )
}

pub struct EqualityCapability;

impl Capability for EqualityCapability {
    type Behavior = Equality;

    fn name(&self) -> &'static str {
        "Equality"
    }

    fn literal(&self, values: &[Literal]) -> Equality {
        let guard = GuardCapability.literal(values);
        let values = values.to_vec();

        Equality::new(guard, move |a, b| {
            let position = |value: &Value| values.iter().position(|literal| literal.matches(value));
            match (position(a), position(b)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        })
    }

    /// Equal iff every declared field is equal; undeclared keys are ignored.
    fn structure(&self, fields: Vec<(String, Equality)>) -> Equality {
        let guard = GuardCapability.structure(
            fields
                .iter()
                .map(|(name, eq)| (name.clone(), eq.guard.clone()))
                .collect(),
        );

        Equality::new(guard, move |a, b| match (a.as_object(), b.as_object()) {
            (Some(a), Some(b)) => fields.iter().all(|(name, eq)| {
                eq.equals(a.get(name).unwrap_or(&NULL), b.get(name).unwrap_or(&NULL))
            }),
            _ => false,
        })
    }

    /// Equal iff both values select the same alternative, the first whose
    /// guard accepts them, and are equal under it.
    fn union(&self, alternatives: Vec<Equality>) -> Equality {
        let guard = GuardCapability.union(alternatives.iter().map(|eq| eq.guard.clone()).collect());

        Equality::new(guard, move |a, b| {
            let select = |value: &Value| alternatives.iter().position(|eq| eq.guard.is(value));
            match (select(a), select(b)) {
                (Some(i), Some(j)) if i == j => alternatives[i].equals(a, b),
                _ => false,
            }
        })
    }

    fn intersection(&self, parts: Vec<Equality>) -> Equality {
        let guard =
            GuardCapability.intersection(parts.iter().map(|eq| eq.guard.clone()).collect());

        Equality::new(guard, move |a, b| parts.iter().all(|eq| eq.equals(a, b)))
    }

    fn array(&self, element: Equality) -> Equality {
        let guard = GuardCapability.array(element.guard.clone());

        Equality::new(guard, move |a, b| match (a.as_array(), b.as_array()) {
            (Some(a), Some(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| element.equals(a, b))
            }
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{self, array, intersection, literal, structure, union};
    use serde_json::json;

    fn eq(schema: &schema::Schema) -> Equality {
        standard().interpret(schema).unwrap()
    }

    #[test]
    fn struct_equality_ignores_field_order_and_extra_keys() {
        let user = eq(&structure(vec![
            ("name", schema::string()),
            ("age", schema::number()),
        ]));

        assert!(user.equals(
            &json!({ "name": "Alex", "age": 39 }),
            &json!({ "age": 39.0, "name": "Alex", "admin": true })
        ));
        assert!(!user.equals(
            &json!({ "name": "Alex", "age": 39 }),
            &json!({ "name": "Alex", "age": 40 })
        ));
    }

    #[test]
    fn array_equality_is_ordered() {
        let numbers = eq(&array(schema::number()));

        assert!(numbers.equals(&json!([1, 2, 3]), &json!([1, 2, 3])));
        assert!(!numbers.equals(&json!([1, 2, 3]), &json!([3, 2, 1])));
        assert!(!numbers.equals(&json!([1, 2]), &json!([1, 2, 3])));
        assert!(numbers.equals(&json!([]), &json!([])));
    }

    #[test]
    fn union_requires_same_alternative() {
        let id = eq(&union(vec![schema::string(), schema::number()]));

        assert!(id.equals(&json!("1"), &json!("1")));
        assert!(id.equals(&json!(1), &json!(1)));
        assert!(!id.equals(&json!("1"), &json!(1)));
        assert!(!id.equals(&json!(true), &json!(true)));
    }

    #[test]
    fn literal_equality() {
        let color = eq(&literal(["white", "black"]));

        assert!(color.equals(&json!("white"), &json!("white")));
        assert!(!color.equals(&json!("white"), &json!("black")));
    }

    #[test]
    fn intersection_requires_every_part() {
        let both = eq(&intersection(vec![
            structure(vec![("a", schema::string())]),
            structure(vec![("b", schema::number())]),
        ]));

        assert!(both.equals(&json!({ "a": "x", "b": 1 }), &json!({ "a": "x", "b": 1 })));
        assert!(!both.equals(&json!({ "a": "x", "b": 1 }), &json!({ "a": "x", "b": 2 })));
    }

    #[test]
    fn degenerate_shapes_compare_trivially() {
        let empty = eq(&structure(Vec::<(String, schema::Schema)>::new()));
        assert!(empty.equals(&json!({ "a": 1 }), &json!({ "b": 2 })));

        let never = eq(&union(vec![]));
        assert!(!never.equals(&json!(1), &json!(1)));
    }
}
