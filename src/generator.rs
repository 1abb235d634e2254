use crate::capability::{Capability, Implementation};
use crate::schema::{Literal, BOOLEAN, NUMBER, STRING};
use crate::value::{merge_all, number_value};
use arbitrary::Unstructured;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Produces arbitrary values of a schema's decoded domain from unstructured
/// bytes.
#[derive(Clone)]
pub struct Generator(Arc<dyn Fn(&mut Unstructured<'_>) -> arbitrary::Result<Value> + Send + Sync>);

impl Generator {
    pub fn new(
        generate: impl Fn(&mut Unstructured<'_>) -> arbitrary::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(generate))
    }

    pub fn generate(&self, u: &mut Unstructured<'_>) -> arbitrary::Result<Value> {
        (self.0)(u)
    }

    pub fn generate_from_bytes(&self, bytes: &[u8]) -> arbitrary::Result<Value> {
        self.generate(&mut Unstructured::new(bytes))
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Generator(..)")
    }
}

#[derive(Clone, Debug)]
pub struct GenerateOptions {
    max_array_len: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { max_array_len: 8 }
    }
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_array_len(mut self, max_array_len: usize) -> Self {
        self.max_array_len = max_array_len;
        self
    }
}

pub fn string() -> Generator {
    Generator::new(|u| Ok(Value::String(u.arbitrary()?)))
}

/// Integers and finite floats, about half of each.
pub fn number() -> Generator {
    Generator::new(|u| {
        if u.arbitrary()? {
            Ok(Value::from(u.arbitrary::<i64>()?))
        } else {
            let n: f64 = u.arbitrary()?;
            Ok(number_value(if n.is_finite() { n } else { 0.0 }))
        }
    })
}

pub fn boolean() -> Generator {
    Generator::new(|u| Ok(Value::Bool(u.arbitrary()?)))
}

pub fn standard() -> Implementation<GeneratorCapability> {
    standard_with(GenerateOptions::default())
}

pub fn standard_with(options: GenerateOptions) -> Implementation<GeneratorCapability> {
    Implementation::register(
        GeneratorCapability { options },
        vec![(STRING, string()), (NUMBER, number()), (BOOLEAN, boolean())],
    )
}

/// Picks an index in `0..len`; fails when there is nothing to pick from.
pub(crate) fn choose_index(u: &mut Unstructured<'_>, len: usize) -> arbitrary::Result<usize> {
    if len == 0 {
        return Err(arbitrary::Error::IncorrectFormat);
    }
    u.int_in_range(0..=len - 1)
}

pub struct GeneratorCapability {
    options: GenerateOptions,
}

impl Capability for GeneratorCapability {
    type Behavior = Generator;

    fn name(&self) -> &'static str {
        "Generator"
    }

    fn literal(&self, values: &[Literal]) -> Generator {
        let values = values.to_vec();
        Generator::new(move |u| Ok(values[choose_index(u, values.len())?].to_value()))
    }

    fn structure(&self, fields: Vec<(String, Generator)>) -> Generator {
        Generator::new(move |u| {
            let mut out = Map::new();
            for (name, generator) in &fields {
                out.insert(name.clone(), generator.generate(u)?);
            }
            Ok(Value::Object(out))
        })
    }

    fn union(&self, alternatives: Vec<Generator>) -> Generator {
        Generator::new(move |u| alternatives[choose_index(u, alternatives.len())?].generate(u))
    }

    /// Generates every part and merges them; an empty intersection has no
    /// constraint and yields `null`.
    fn intersection(&self, parts: Vec<Generator>) -> Generator {
        Generator::new(move |u| {
            let values = parts
                .iter()
                .map(|generator| generator.generate(u))
                .collect::<arbitrary::Result<Vec<_>>>()?;
            Ok(merge_all(values).unwrap_or(Value::Null))
        })
    }

    fn array(&self, element: Generator) -> Generator {
        let max_len = self.options.max_array_len;
        Generator::new(move |u| {
            let len = u.int_in_range(0..=max_len)?;
            let items = (0..len)
                .map(|_| element.generate(u))
                .collect::<arbitrary::Result<Vec<_>>>()?;
            Ok(Value::Array(items))
        })
    }
}
