use crate::capability::Implementation;
use crate::decoder::{self, Decoder, DecoderCapability};
use crate::encoder::{self, Encoder, EncoderCapability};
use crate::eq::{self, Equality, EqualityCapability};
use crate::generator::{self, GenerateOptions, Generator, GeneratorCapability};
use crate::guard::{self, Guard, GuardCapability};
use crate::interpret::InterpretError;
use crate::schema::Schema;
use tracing::debug;

/// A new primitive together with its binding for each capability that should
/// support it. Capabilities left unset will keep reporting
/// [`InterpretError::UnboundPrimitive`] for schemas that use the primitive.
#[derive(Clone, Debug)]
pub struct CustomType {
    name: String,
    decoder: Option<Decoder>,
    encoder: Option<Encoder>,
    equality: Option<Equality>,
    guard: Option<Guard>,
    generator: Option<Generator>,
}

impl CustomType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decoder: None,
            encoder: None,
            equality: None,
            guard: None,
            generator: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn with_encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn with_equality(mut self, equality: Equality) -> Self {
        self.equality = Some(equality);
        self
    }

    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn with_generator(mut self, generator: Generator) -> Self {
        self.generator = Some(generator);
        self
    }
}

/// One implementation per standard capability.
///
/// ```
/// use schemable::{price, schema, Registry};
///
/// let registry = Registry::standard().with_custom(&price::custom_type());
/// let product = schema::structure(vec![("price", price::price())]);
///
/// assert!(registry.decoder(&product).is_ok());
/// assert!(Registry::standard().decoder(&product).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Registry {
    pub decoder: Implementation<DecoderCapability>,
    pub encoder: Implementation<EncoderCapability>,
    pub equality: Implementation<EqualityCapability>,
    pub guard: Implementation<GuardCapability>,
    pub generator: Implementation<GeneratorCapability>,
}

impl Registry {
    pub fn standard() -> Self {
        Self::standard_with(GenerateOptions::default())
    }

    pub fn standard_with(options: GenerateOptions) -> Self {
        Self {
            decoder: decoder::standard(),
            encoder: encoder::standard(),
            equality: eq::standard(),
            guard: guard::standard(),
            generator: generator::standard_with(options),
        }
    }

    /// Returns a registry extended with `custom`. Only the capabilities
    /// `custom` has a binding for are extended; `self` is left as is.
    pub fn with_custom(&self, custom: &CustomType) -> Self {
        fn extend<C: crate::capability::Capability>(
            implementation: &Implementation<C>,
            name: &str,
            binding: &Option<C::Behavior>,
        ) -> Implementation<C> {
            match binding {
                Some(binding) => implementation.extend(name, binding.clone()),
                None => implementation.clone(),
            }
        }

        debug!(primitive = %custom.name, "registering custom type");

        Self {
            decoder: extend(&self.decoder, &custom.name, &custom.decoder),
            encoder: extend(&self.encoder, &custom.name, &custom.encoder),
            equality: extend(&self.equality, &custom.name, &custom.equality),
            guard: extend(&self.guard, &custom.name, &custom.guard),
            generator: extend(&self.generator, &custom.name, &custom.generator),
        }
    }

    pub fn decoder(&self, schema: &Schema) -> Result<Decoder, InterpretError> {
        self.decoder.interpret(schema)
    }

    pub fn encoder(&self, schema: &Schema) -> Result<Encoder, InterpretError> {
        self.encoder.interpret(schema)
    }

    pub fn equality(&self, schema: &Schema) -> Result<Equality, InterpretError> {
        self.equality.interpret(schema)
    }

    pub fn guard(&self, schema: &Schema) -> Result<Guard, InterpretError> {
        self.guard.interpret(schema)
    }

    pub fn generator(&self, schema: &Schema) -> Result<Generator, InterpretError> {
        self.generator.interpret(schema)
    }
}
