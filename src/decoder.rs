use crate::capability::{Capability, Implementation};
use crate::schema::{Literal, BOOLEAN, NUMBER, STRING};
use crate::value::{merge_all, NULL};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// One step into a value: an object key, an array index, or the union
/// alternative that was attempted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathStep {
    Key(String),
    Index(usize),
    Member(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) => f.write_str(key),
            PathStep::Index(index) => write!(f, "{}", index),
            PathStep::Member(index) => write!(f, "(member {})", index),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecodeError {
    pub path: Vec<PathStep>,
    pub expected: String,
    pub actual: Value,
}

impl DecodeError {
    pub fn new(expected: impl Into<String>, actual: &Value) -> Self {
        Self {
            path: vec![],
            expected: expected.into(),
            actual: actual.clone(),
        }
    }

    fn prefixed(mut self, step: PathStep) -> Self {
        self.path.insert(0, step);
        self
    }

    /// The path rendered as `/`-separated steps, `/` for the root.
    pub fn path_string(&self) -> String {
        if self.path.is_empty() {
            return "/".to_owned();
        }

        self.path
            .iter()
            .map(|step| format!("/{}", step))
            .collect()
    }

    pub fn message(&self) -> String {
        format!("expected {}, got {}", self.expected, self.actual)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path_string(), self.message())
    }
}

/// Every problem found while decoding one value, in the order found.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("failed to decode value ({} error(s))", .errors.len())]
pub struct DecodeFailure {
    errors: Vec<DecodeError>,
}

impl DecodeFailure {
    pub fn new(errors: Vec<DecodeError>) -> Self {
        Self { errors }
    }

    /// A failure with a single error at the current position.
    pub fn leaf(expected: impl Into<String>, actual: &Value) -> Self {
        Self::new(vec![DecodeError::new(expected, actual)])
    }

    pub fn errors(&self) -> &[DecodeError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<DecodeError> {
        self.errors
    }

    fn prefixed(self, step: PathStep) -> Self {
        Self::new(
            self.errors
                .into_iter()
                .map(|error| error.prefixed(step.clone()))
                .collect(),
        )
    }
}

pub type DecodeResult = Result<Value, DecodeFailure>;

/// Collects every result, succeeding only if all of them did. Unlike
/// `collect::<Result<Vec<_>, _>>()`, the errors of every failed result are
/// kept, each prefixed with its index.
pub fn sequence<I>(results: I) -> Result<Vec<Value>, DecodeFailure>
where
    I: IntoIterator<Item = DecodeResult>,
{
    let mut values = vec![];
    let mut errors = vec![];

    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(value) => values.push(value),
            Err(failure) => errors.extend(failure.prefixed(PathStep::Index(index)).errors),
        }
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        Err(DecodeFailure::new(errors))
    }
}

#[derive(Clone, Debug, Default)]
pub struct DecodeOptions {
    max_errors: usize,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps how many errors a failure reports. Zero means no cap.
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }
}

/// Turns raw input into a value of the decoded domain.
#[derive(Clone)]
pub struct Decoder(Arc<dyn Fn(&Value) -> DecodeResult + Send + Sync>);

impl Decoder {
    pub fn new(decode: impl Fn(&Value) -> DecodeResult + Send + Sync + 'static) -> Self {
        Self(Arc::new(decode))
    }

    pub fn decode(&self, raw: &Value) -> DecodeResult {
        (self.0)(raw)
    }

    pub fn decode_with(&self, raw: &Value, options: &DecodeOptions) -> DecodeResult {
        self.decode(raw).map_err(|mut failure| {
            if options.max_errors != 0 {
                failure.errors.truncate(options.max_errors);
            }
            failure
        })
    }

    /// Decodes and then deserializes the decoded value into `T`.
    pub fn decode_into<T: DeserializeOwned>(&self, raw: &Value) -> Result<T, DecodeFailure> {
        let decoded = self.decode(raw)?;
        serde_json::from_value(decoded.clone()).map_err(|err| {
            DecodeFailure::leaf(
                format!("{} ({})", std::any::type_name::<T>(), err),
                &decoded,
            )
        })
    }

    /// Runs `parser` on the output of this decoder.
    pub fn parse(
        self,
        parser: impl Fn(Value) -> DecodeResult + Send + Sync + 'static,
    ) -> Decoder {
        Decoder::new(move |raw| self.decode(raw).and_then(&parser))
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Decoder(..)")
    }
}

pub fn string() -> Decoder {
    Decoder::new(|raw| match raw {
        Value::String(_) => Ok(raw.clone()),
        _ => Err(DecodeFailure::leaf("string", raw)),
    })
}

pub fn number() -> Decoder {
    Decoder::new(|raw| match raw {
        Value::Number(_) => Ok(raw.clone()),
        _ => Err(DecodeFailure::leaf("number", raw)),
    })
}

pub fn boolean() -> Decoder {
    Decoder::new(|raw| match raw {
        Value::Bool(_) => Ok(raw.clone()),
        _ => Err(DecodeFailure::leaf("boolean", raw)),
    })
}

fn describe_literals(values: &[Literal]) -> String {
    if values.is_empty() {
        return "never".to_owned();
    }

    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// The standard decoder implementation: `string`, `number` and `boolean`.
pub fn standard() -> Implementation<DecoderCapability> {
    Implementation::register(
        DecoderCapability,
        vec![(STRING, string()), (NUMBER, number()), (BOOLEAN, boolean())],
    )
}

pub struct DecoderCapability;

impl Capability for DecoderCapability {
    type Behavior = Decoder;

    fn name(&self) -> &'static str {
        "Decoder"
    }

    fn literal(&self, values: &[Literal]) -> Decoder {
        let values = values.to_vec();
        let expected = describe_literals(&values);

        Decoder::new(move |raw| {
            values
                .iter()
                .find(|literal| literal.matches(raw))
                .map(Literal::to_value)
                .ok_or_else(|| DecodeFailure::leaf(expected.as_str(), raw))
        })
    }

    /// Decodes every field and reports the errors of all of them. Keys the
    /// struct does not declare are dropped.
    fn structure(&self, fields: Vec<(String, Decoder)>) -> Decoder {
        Decoder::new(move |raw| {
            let obj = match raw.as_object() {
                Some(obj) => obj,
                None => return Err(DecodeFailure::leaf("object", raw)),
            };

            let mut out = Map::new();
            let mut errors = vec![];

            for (name, decoder) in &fields {
                match decoder.decode(obj.get(name).unwrap_or(&NULL)) {
                    Ok(value) => {
                        out.insert(name.clone(), value);
                    }
                    Err(failure) => {
                        errors.extend(failure.prefixed(PathStep::Key(name.clone())).errors)
                    }
                }
            }

            if errors.is_empty() {
                Ok(Value::Object(out))
            } else {
                Err(DecodeFailure::new(errors))
            }
        })
    }

    /// The first alternative that succeeds wins. If none does, the errors of
    /// every alternative are reported.
    fn union(&self, alternatives: Vec<Decoder>) -> Decoder {
        Decoder::new(move |raw| {
            if alternatives.is_empty() {
                return Err(DecodeFailure::leaf("never", raw));
            }

            let mut errors = vec![];
            for (index, decoder) in alternatives.iter().enumerate() {
                match decoder.decode(raw) {
                    Ok(value) => return Ok(value),
                    Err(failure) => errors.extend(failure.prefixed(PathStep::Member(index)).errors),
                }
            }

            Err(DecodeFailure::new(errors))
        })
    }

    /// Every part decodes the same input. Errors of all failing parts are
    /// reported, the same way struct fields are.
    fn intersection(&self, parts: Vec<Decoder>) -> Decoder {
        Decoder::new(move |raw| {
            let mut values = Vec::with_capacity(parts.len());
            let mut errors = vec![];

            for decoder in &parts {
                match decoder.decode(raw) {
                    Ok(value) => values.push(value),
                    Err(failure) => errors.extend(failure.errors),
                }
            }

            if !errors.is_empty() {
                return Err(DecodeFailure::new(errors));
            }

            Ok(merge_all(values).unwrap_or_else(|| raw.clone()))
        })
    }

    fn array(&self, element: Decoder) -> Decoder {
        Decoder::new(move |raw| match raw.as_array() {
            Some(items) => sequence(items.iter().map(|item| element.decode(item))).map(Value::Array),
            None => Err(DecodeFailure::leaf("array", raw)),
        })
    }
}
