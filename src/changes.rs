//! Finding which incoming items differ from what is already stored.

use crate::decoder::{DecodeFailure, Decoder};
use crate::eq::Equality;
use crate::report;
use serde_json::Value;
use tracing::debug;

/// A raw item that could not be decoded, with its position in the input.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemFailure {
    pub index: usize,
    pub failure: DecodeFailure,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeSet {
    /// Decoded items that are new or differ from their stored counterpart, in
    /// input order.
    pub changed: Vec<Value>,
    pub failures: Vec<ItemFailure>,
}

impl ChangeSet {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Every decode error of every failed item, one per line, prefixed with
    /// the item index.
    pub fn failure_report(&self) -> String {
        self.failures
            .iter()
            .flat_map(|item| {
                report::lines(&item.failure)
                    .into_iter()
                    .map(move |line| format!("item {}: {}", item.index, line))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Decodes `raw_items` and compares each with the existing item sharing its
/// key. `key` is a JSON pointer such as `/id`, looked up in decoded and stored
/// items alike.
///
/// An item is changed when no stored item has its key, or when the stored
/// item is not equal to it under `equality`. Items that fail to decode are
/// reported separately and do not stop the others from being processed.
pub fn detect_changes(
    raw_items: &[Value],
    decoder: &Decoder,
    equality: &Equality,
    existing: &[Value],
    key: &str,
) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for (index, raw) in raw_items.iter().enumerate() {
        let item = match decoder.decode(raw) {
            Ok(item) => item,
            Err(failure) => {
                changes.failures.push(ItemFailure { index, failure });
                continue;
            }
        };

        let stored = item
            .pointer(key)
            .and_then(|id| existing.iter().find(|stored| stored.pointer(key) == Some(id)));

        match stored {
            Some(stored) if equality.equals(stored, &item) => {}
            _ => changes.changed.push(item),
        }
    }

    debug!(
        items = raw_items.len(),
        changed = changes.changed.len(),
        failed = changes.failures.len(),
        "detected changes"
    );

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price;
    use crate::registry::Registry;
    use crate::schema::{literal, number, string, structure, Schema};
    use serde_json::json;

    fn product() -> Schema {
        structure(vec![
            ("id", number()),
            ("name", string()),
            ("color", literal(["white", "black", "green"])),
            ("price", price::price()),
        ])
    }

    fn existing() -> Vec<Value> {
        vec![
            json!({ "id": 234, "name": "T-Shirt", "color": "black", "price": { "currency": "EUR", "value": 12 } }),
            json!({ "id": 345, "name": "T-Shirt", "color": "white", "price": { "currency": "EUR", "value": 16 } }),
            json!({ "id": 456, "name": "Pants", "color": "white", "price": { "currency": "EUR", "value": 57 } }),
            json!({ "id": 567, "name": "Jacket", "color": "green", "price": { "currency": "EUR", "value": 120.65 } }),
        ]
    }

    fn detect(raw_items: &[Value]) -> ChangeSet {
        let registry = Registry::standard().with_custom(&price::custom_type());
        let schema = product();

        detect_changes(
            raw_items,
            &registry.decoder(&schema).unwrap(),
            &registry.equality(&schema).unwrap(),
            &existing(),
            "/id",
        )
    }

    #[test]
    fn reports_changed_and_new_items() {
        let changes = detect(&[
            json!({ "id": 234, "name": "T-Shirt", "color": "black", "price": "EUR12" }),
            json!({ "id": 345, "name": "T-Shirt", "color": "white", "price": "EUR15" }),
            json!({ "id": 456, "name": "Pants", "color": "white", "price": "EUR56" }),
            json!({ "id": 567, "name": "Jacket", "color": "green", "price": "EUR120.65" }),
            json!({ "id": 678, "name": "Hat", "color": "green", "price": "USD9.99" }),
        ]);

        let ids: Vec<_> = changes.changed.iter().map(|item| item["id"].clone()).collect();
        assert_eq!(vec![json!(345), json!(456), json!(678)], ids);
        assert!(!changes.has_failures());
    }

    #[test]
    fn failures_are_reported_separately() {
        let changes = detect(&[
            json!({ "id": 234, "name": "T-Shirt", "color": "black", "price": "EUR12" }),
            json!({ "id": 1, "name": "X", "color": "purple", "price": "GBP5" }),
            json!({ "id": 345, "name": "T-Shirt", "color": "white", "price": "EUR15" }),
        ]);

        let ids: Vec<_> = changes.changed.iter().map(|item| item["id"].clone()).collect();
        assert_eq!(vec![json!(345)], ids);

        assert_eq!(1, changes.failures.len());
        assert_eq!(1, changes.failures[0].index);
        assert_eq!(
            format!(
                "item 1: /color: expected \"white\" | \"black\" | \"green\", got \"purple\"\n\
                 item 1: /price: expected {}, got \"GBP5\"",
                price::PRICE_PATTERN
            ),
            changes.failure_report()
        );
    }

    #[test]
    fn items_without_key_are_changed() {
        let schema = structure(vec![("name", string())]);
        let registry = Registry::standard();

        let changes = detect_changes(
            &[json!({ "name": "a" })],
            &registry.decoder(&schema).unwrap(),
            &registry.equality(&schema).unwrap(),
            &[json!({ "name": "a" })],
            "/id",
        );

        assert_eq!(vec![json!({ "name": "a" })], changes.changed);
    }
}
