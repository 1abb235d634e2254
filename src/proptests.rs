use crate::price;
use crate::registry::Registry;
use crate::schema::{
    array, boolean, intersection, literal, number, string, structure, union, Schema,
};
use crate::timestamp;
use proptest::prelude::*;
use serde_json::Value;

fn registry() -> Registry {
    Registry::standard()
        .with_custom(&price::custom_type())
        .with_custom(&timestamp::custom_type())
}

fn product() -> Schema {
    structure(vec![
        ("id", number()),
        ("name", string()),
        ("color", literal(["white", "black", "green"])),
        ("price", price::price()),
    ])
}

/// One schema per shape, plus a nested combination of all of them.
fn schemas() -> Vec<Schema> {
    vec![
        string(),
        number(),
        boolean(),
        price::price(),
        timestamp::timestamp(),
        literal(["Foo", "Bar"]),
        product(),
        union(vec![literal(["none"]), price::price()]),
        union(vec![number(), string()]),
        intersection(vec![
            structure(vec![("a", string())]),
            structure(vec![("b", price::price())]),
        ]),
        array(product()),
        structure(vec![
            ("items", array(union(vec![product(), literal(["gone"])]))),
            (
                "audit",
                intersection(vec![
                    structure(vec![("at", timestamp::timestamp())]),
                    structure(vec![("by", union(vec![string(), boolean()]))]),
                ]),
            ),
        ]),
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| serde_json::json!(n)),
        any::<f64>().prop_map(|n| serde_json::json!(n)),
        "(EUR|USD|GBP)?[0-9]{0,4}(\\.[0-9]{0,3})?".prop_map(Value::String),
        "[a-zA-Z0-9_ ]{0,20}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::btree_map(
                prop_oneof![
                    Just("id".to_owned()),
                    Just("name".to_owned()),
                    Just("color".to_owned()),
                    Just("price".to_owned()),
                    Just("items".to_owned()),
                    "[a-z]{1,10}",
                ],
                inner,
                0..8
            )
            .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    /// Encoding a generated value and decoding it again gives back an equal value.
    #[test]
    fn decode_encode_round_trip(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let registry = registry();

        for schema in schemas() {
            let generator = registry.generator(&schema).unwrap();
            let value = match generator.generate_from_bytes(&bytes) {
                Ok(value) => value,
                Err(_) => continue,
            };

            let encoded = registry.encoder(&schema).unwrap().encode(&value);
            let decoded = registry.decoder(&schema).unwrap().decode(&encoded);
            prop_assert!(decoded.is_ok(), "{} from {} failed: {:?}", encoded, value, decoded);

            let decoded = decoded.unwrap();
            prop_assert!(
                registry.equality(&schema).unwrap().equals(&value, &decoded),
                "{} decoded to {}", value, decoded
            );
        }
    }

    /// Decoding returns a value for any input and every failure carries errors.
    #[test]
    fn decode_never_faults(raw in json_value()) {
        let registry = registry();

        for schema in schemas() {
            if let Err(failure) = registry.decoder(&schema).unwrap().decode(&raw) {
                prop_assert!(!failure.errors().is_empty());
            }
        }
    }

    /// Equality is reflexive and symmetric over generated values.
    #[test]
    fn equality_reflexive_and_symmetric(
        a in prop::collection::vec(any::<u8>(), 0..256),
        b in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let registry = registry();

        for schema in schemas() {
            let generator = registry.generator(&schema).unwrap();
            let equality = registry.equality(&schema).unwrap();

            let (a, b) = match (generator.generate_from_bytes(&a), generator.generate_from_bytes(&b)) {
                (Ok(a), Ok(b)) => (a, b),
                _ => continue,
            };

            prop_assert!(equality.equals(&a, &a), "{} is not equal to itself", a);
            prop_assert_eq!(equality.equals(&a, &b), equality.equals(&b, &a));
        }
    }

    /// Generated values are members of their schema.
    #[test]
    fn generated_values_pass_the_guard(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let registry = registry();

        for schema in schemas() {
            if let Ok(value) = registry.generator(&schema).unwrap().generate_from_bytes(&bytes) {
                prop_assert!(registry.guard(&schema).unwrap().is(&value), "{}", value);
            }
        }
    }
}
