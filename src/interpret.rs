use crate::capability::{Capability, Implementation};
use crate::schema::{Schema, SchemaNode};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InterpretError {
    /// The schema references a primitive the implementation has no binding for.
    #[error("missing {capability} capability for primitive {name:?}")]
    UnboundPrimitive {
        capability: &'static str,
        name: String,
    },
}

/// Interprets `schema` against `implementation`, producing a behavior.
///
/// The whole schema is resolved before anything is returned, so a missing
/// primitive binding is reported here and never while the behavior runs.
/// Results are memoized per implementation, keyed by schema identity.
pub fn interpret<C: Capability>(
    implementation: &Implementation<C>,
    schema: &Schema,
) -> Result<C::Behavior, InterpretError> {
    if let Some(behavior) = implementation.cached(schema) {
        trace!(
            capability = implementation.capability().name(),
            schema = schema.id(),
            "interpretation cache hit"
        );
        return Ok(behavior);
    }

    let capability = implementation.capability();
    let behavior = match schema.node() {
        SchemaNode::Primitive(name) => match implementation.binding(name) {
            Some(behavior) => behavior.clone(),
            None => {
                debug!(
                    capability = capability.name(),
                    implementation = implementation.id(),
                    primitive = %name,
                    "unbound primitive"
                );
                return Err(InterpretError::UnboundPrimitive {
                    capability: capability.name(),
                    name: name.clone(),
                });
            }
        },
        SchemaNode::Literal(values) => capability.literal(values),
        SchemaNode::Struct(fields) => {
            let fields = fields
                .iter()
                .map(|(name, field)| Ok((name.clone(), interpret(implementation, field)?)))
                .collect::<Result<Vec<_>, InterpretError>>()?;
            capability.structure(fields)
        }
        SchemaNode::Union(alternatives) => {
            capability.union(interpret_all(implementation, alternatives)?)
        }
        SchemaNode::Intersection(parts) => {
            capability.intersection(interpret_all(implementation, parts)?)
        }
        SchemaNode::Array(element) => capability.array(interpret(implementation, element)?),
    };

    implementation.remember(schema, behavior.clone());
    Ok(behavior)
}

fn interpret_all<C: Capability>(
    implementation: &Implementation<C>,
    schemas: &[Schema],
) -> Result<Vec<C::Behavior>, InterpretError> {
    schemas
        .iter()
        .map(|schema| interpret(implementation, schema))
        .collect()
}

impl<C: Capability> Implementation<C> {
    /// Shorthand for [`interpret`].
    pub fn interpret(&self, schema: &Schema) -> Result<C::Behavior, InterpretError> {
        interpret(self, schema)
    }
}
