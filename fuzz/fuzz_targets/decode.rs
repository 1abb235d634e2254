#![no_main]
use libfuzzer_sys::fuzz_target;

use schemable::schema::{array, literal, number, string, structure, union};
use schemable::{price, Registry};

fuzz_target!(|data: &[u8]| {
    let schema = array(structure(vec![
        ("id", number()),
        ("name", string()),
        ("color", union(vec![literal(["white", "black", "green"]), string()])),
        ("price", price::price()),
    ]));

    let decoder = Registry::standard()
        .with_custom(&price::custom_type())
        .decoder(&schema)
        .unwrap();

    // We're only interested in inputs that are valid JSON.
    if let Ok(instance) = serde_json::from_slice(data) {
        let _ = decoder.decode(&instance);
    }
});
