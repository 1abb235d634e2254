use crate::schema::{self, Literal, Schema, SchemaNode};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A JSON representation of schemas, compatible with `serde_json`.
///
/// Exactly one of the form keywords must be present. To convert this into a
/// [`Schema`], see [`Schema::from_serde_schema`].
///
/// ```
/// use schemable::SerdeSchema;
/// use serde_json::json;
///
/// assert_eq!(
///     SerdeSchema { type_: Some("string".to_owned()), ..Default::default() },
///     serde_json::from_value::<SerdeSchema>(json!({ "type": "string" })).unwrap()
/// )
/// ```
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct SerdeSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_: Option<Vec<Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<SerdeProperties>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Box<SerdeSchema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub union: Option<Vec<SerdeSchema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersection: Option<Vec<SerdeSchema>>,
}

/// Struct fields in document order. Deserializing from text keeps the order
/// the fields were written in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SerdeProperties(pub Vec<(String, SerdeSchema)>);

impl Serialize for SerdeProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, schema) in &self.0 {
            map.serialize_entry(name, schema)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SerdeProperties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropertiesVisitor;

        impl<'de> Visitor<'de> for PropertiesVisitor {
            type Value = SerdeProperties;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of property names to schemas")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut fields: Vec<(String, SerdeSchema)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, schema)) = access.next_entry()? {
                    fields.push((name, schema));
                }
                Ok(SerdeProperties(fields))
            }
        }

        deserializer.deserialize_map(PropertiesVisitor)
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum SchemaFromSerdeError {
    #[error("schema has no form keyword")]
    NoForm,

    #[error("schema has more than one form keyword")]
    AmbiguousForm,

    #[error("{0} cannot be used as a literal")]
    InvalidLiteral(Value),
}

impl Schema {
    pub fn from_serde_schema(serde_schema: SerdeSchema) -> Result<Self, SchemaFromSerdeError> {
        Self::try_from(serde_schema)
    }
}

impl TryFrom<SerdeSchema> for Schema {
    type Error = SchemaFromSerdeError;

    fn try_from(serde_schema: SerdeSchema) -> Result<Self, Self::Error> {
        let SerdeSchema {
            type_,
            enum_,
            properties,
            elements,
            union,
            intersection,
        } = serde_schema;

        let forms = [
            type_.is_some(),
            enum_.is_some(),
            properties.is_some(),
            elements.is_some(),
            union.is_some(),
            intersection.is_some(),
        ];
        match forms.iter().filter(|present| **present).count() {
            0 => return Err(SchemaFromSerdeError::NoForm),
            1 => {}
            _ => return Err(SchemaFromSerdeError::AmbiguousForm),
        }

        if let Some(name) = type_ {
            return Ok(schema::primitive(name));
        }

        if let Some(values) = enum_ {
            let literals = values
                .into_iter()
                .map(|value| match Literal::from_value(&value) {
                    Some(literal) => Ok(literal),
                    None => Err(SchemaFromSerdeError::InvalidLiteral(value)),
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(schema::literal(literals));
        }

        if let Some(SerdeProperties(fields)) = properties {
            let fields = fields
                .into_iter()
                .map(|(name, field)| Ok((name, Schema::try_from(field)?)))
                .collect::<Result<Vec<_>, SchemaFromSerdeError>>()?;
            return Ok(schema::structure(fields));
        }

        if let Some(element) = elements {
            return Ok(schema::array(Schema::try_from(*element)?));
        }

        if let Some(alternatives) = union {
            return Ok(schema::union(try_from_all(alternatives)?));
        }

        match intersection {
            Some(parts) => Ok(schema::intersection(try_from_all(parts)?)),
            None => Err(SchemaFromSerdeError::NoForm),
        }
    }
}

fn try_from_all(schemas: Vec<SerdeSchema>) -> Result<Vec<Schema>, SchemaFromSerdeError> {
    schemas.into_iter().map(Schema::try_from).collect()
}

impl From<&Schema> for SerdeSchema {
    fn from(schema: &Schema) -> SerdeSchema {
        let mut out = SerdeSchema::default();

        match schema.node() {
            SchemaNode::Primitive(name) => out.type_ = Some(name.clone()),
            SchemaNode::Literal(values) => {
                out.enum_ = Some(values.iter().map(Literal::to_value).collect())
            }
            SchemaNode::Struct(fields) => {
                out.properties = Some(SerdeProperties(
                    fields
                        .iter()
                        .map(|(name, field)| (name.clone(), field.into()))
                        .collect(),
                ))
            }
            SchemaNode::Union(alternatives) => {
                out.union = Some(alternatives.iter().map(Into::into).collect())
            }
            SchemaNode::Intersection(parts) => {
                out.intersection = Some(parts.iter().map(Into::into).collect())
            }
            SchemaNode::Array(element) => out.elements = Some(Box::new(element.into())),
        }

        out
    }
}
