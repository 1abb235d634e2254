//! `Timestamp`: an RFC 3339 date-time string. Decoding normalizes it to UTC
//! with millisecond precision, e.g. `"2024-05-20T23:00:00.000Z"`.

use crate::decoder::{self, DecodeFailure, Decoder};
use crate::encoder::Encoder;
use crate::eq::Equality;
use crate::generator::Generator;
use crate::guard::Guard;
use crate::registry::CustomType;
use crate::schema::{primitive, Schema};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

pub const TIMESTAMP: &str = "Timestamp";

/// Last second of the year 9999.
const MAX_SECONDS: i64 = 253_402_300_799;

fn parse(value: &Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?;
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn format(dt: &DateTime<Utc>) -> Value {
    Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn timestamp() -> Schema {
    primitive(TIMESTAMP)
}

pub fn decoder() -> Decoder {
    decoder::string().parse(|raw| match parse(&raw) {
        Some(dt) => Ok(format(&dt)),
        None => Err(DecodeFailure::leaf("RFC 3339 timestamp", &raw)),
    })
}

pub fn guard() -> Guard {
    Guard::new(|value| parse(value).is_some())
}

pub fn encoder() -> Encoder {
    Encoder::new(guard(), |value| match parse(value) {
        Some(dt) => format(&dt),
        None => value.clone(),
    })
}

/// Equal when both denote the same instant, whatever their offsets.
pub fn equality() -> Equality {
    Equality::new(guard(), |a, b| match (parse(a), parse(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    })
}

pub fn generator() -> Generator {
    Generator::new(|u| {
        let seconds = u.int_in_range(0..=MAX_SECONDS)?;
        let millis = u.int_in_range(0..=999u32)?;
        match Utc.timestamp_opt(seconds, millis * 1_000_000).single() {
            Some(dt) => Ok(format(&dt)),
            None => Err(arbitrary::Error::IncorrectFormat),
        }
    })
}

pub fn custom_type() -> CustomType {
    CustomType::new(TIMESTAMP)
        .with_decoder(decoder())
        .with_encoder(encoder())
        .with_equality(equality())
        .with_guard(guard())
        .with_generator(generator())
}
