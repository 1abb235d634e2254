#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(serde_schema) = serde_json::from_slice::<schemable::SerdeSchema>(data) {
        let _: Result<schemable::Schema, schemable::SchemaFromSerdeError> = serde_schema.try_into();
    }
});
