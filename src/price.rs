//! `Price`: a currency amount written on the wire as `"<CODE><amount>"`, such
//! as `"EUR12"` or `"USD120.65"`, and decoded into
//! `{ "value": <number>, "currency": <code> }`.

use crate::decoder::{self, DecodeFailure, Decoder};
use crate::encoder::Encoder;
use crate::eq::Equality;
use crate::generator::{choose_index, Generator};
use crate::guard::Guard;
use crate::registry::CustomType;
use crate::schema::{primitive, Schema};
use crate::value::number_value;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Primitive name the price bindings are registered under.
pub const PRICE: &str = "Price";

pub const PRICE_PATTERN: &str = r"^(USD|EUR)(\d+(?:\.\d{1,2})?)$";

static PRICE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(PRICE_PATTERN).expect("PRICE_PATTERN is a valid regex"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Usd, Currency::Eur];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl FromStr for Currency {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub value: f64,
    pub currency: Currency,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{input:?} does not match {}", PRICE_PATTERN)]
pub struct ParsePriceError {
    input: String,
}

impl Price {
    pub fn new(value: f64, currency: Currency) -> Self {
        Self { value, currency }
    }

    /// Reads the decoded form back. `None` unless `value` is an object with a
    /// known currency and a non-negative number.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let currency = obj.get("currency")?.as_str()?.parse().ok()?;
        let amount = obj.get("value")?.as_f64()?;

        if amount < 0.0 {
            return None;
        }

        Some(Self::new(amount, currency))
    }

    pub fn to_value(&self) -> Value {
        json!({
            "value": number_value(self.value),
            "currency": self.currency.code(),
        })
    }
}

impl FromStr for Price {
    type Err = ParsePriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePriceError {
            input: s.to_owned(),
        };

        let captures = PRICE_REGEX.captures(s).ok_or_else(err)?;
        let currency = captures[1].parse().map_err(|_| err())?;
        let value: f64 = captures[2].parse().map_err(|_| err())?;
        if !value.is_finite() {
            return Err(err());
        }

        Ok(Self::new(value, currency))
    }
}

/// Writes the amount with at most two decimals, dropping trailing zeros, so
/// the output always parses back.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = format!("{:.2}", self.value);
        let amount = amount.trim_end_matches('0').trim_end_matches('.');
        write!(f, "{}{}", self.currency.code(), amount)
    }
}

pub fn price() -> Schema {
    primitive(PRICE)
}

pub fn decoder() -> Decoder {
    decoder::string().parse(|raw| match raw.as_str().map(str::parse::<Price>) {
        Some(Ok(price)) => Ok(price.to_value()),
        _ => Err(DecodeFailure::leaf(PRICE_PATTERN, &raw)),
    })
}

pub fn guard() -> Guard {
    Guard::new(|value| Price::from_value(value).is_some())
}

pub fn encoder() -> Encoder {
    Encoder::new(guard(), |value| match Price::from_value(value) {
        Some(price) => Value::String(price.to_string()),
        None => value.clone(),
    })
}

pub fn equality() -> Equality {
    Equality::new(guard(), |a, b| {
        match (Price::from_value(a), Price::from_value(b)) {
            (Some(a), Some(b)) => a.value == b.value && a.currency == b.currency,
            _ => false,
        }
    })
}

/// Amounts up to 10000.00 with cent precision.
pub fn generator() -> Generator {
    Generator::new(|u| {
        let currency = Currency::ALL[choose_index(u, Currency::ALL.len())?];
        let cents = u.int_in_range(0..=1_000_000u64)?;
        Ok(Price::new(cents as f64 / 100.0, currency).to_value())
    })
}

/// The price primitive for every standard capability.
pub fn custom_type() -> CustomType {
    CustomType::new(PRICE)
        .with_decoder(decoder())
        .with_encoder(encoder())
        .with_equality(equality())
        .with_guard(guard())
        .with_generator(generator())
}
