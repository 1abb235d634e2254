use crate::capability::{Capability, Implementation};
use crate::schema::{Literal, BOOLEAN, NUMBER, STRING};
use crate::value::NULL;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Tells whether a value belongs to the decoded domain of a schema.
#[derive(Clone)]
pub struct Guard(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Guard {
    pub fn new(is: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(is))
    }

    pub fn is(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

pub fn string() -> Guard {
    Guard::new(Value::is_string)
}

pub fn number() -> Guard {
    Guard::new(Value::is_number)
}

pub fn boolean() -> Guard {
    Guard::new(Value::is_boolean)
}

pub fn standard() -> Implementation<GuardCapability> {
    Implementation::register(
        GuardCapability,
        vec![(STRING, string()), (NUMBER, number()), (BOOLEAN, boolean())],
    )
}

pub struct GuardCapability;

impl Capability for GuardCapability {
    type Behavior = Guard;

    fn name(&self) -> &'static str {
        "Guard"
    }

    fn literal(&self, values: &[Literal]) -> Guard {
        let values = values.to_vec();
        Guard::new(move |value| values.iter().any(|literal| literal.matches(value)))
    }

    fn structure(&self, fields: Vec<(String, Guard)>) -> Guard {
        Guard::new(move |value| match value.as_object() {
            Some(obj) => fields
                .iter()
                .all(|(name, guard)| guard.is(obj.get(name).unwrap_or(&NULL))),
            None => false,
        })
    }

    fn union(&self, alternatives: Vec<Guard>) -> Guard {
        Guard::new(move |value| alternatives.iter().any(|guard| guard.is(value)))
    }

    fn intersection(&self, parts: Vec<Guard>) -> Guard {
        Guard::new(move |value| parts.iter().all(|guard| guard.is(value)))
    }

    fn array(&self, element: Guard) -> Guard {
        Guard::new(move |value| match value.as_array() {
            Some(items) => items.iter().all(|item| element.is(item)),
            None => false,
        })
    }
}
