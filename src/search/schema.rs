//! Validation of structured AI output against the catalog snapshot.
//!
//! Two deliberate postures:
//! - remote payloads are schema-enforced at the service boundary, so any
//!   shape mismatch here is a hard error and fails the whole payload;
//! - local payloads are a best-effort parse of free model text, so unknown
//!   ids are silently dropped and an empty remainder means "no match".

use serde_json::Value;
use thiserror::Error;

use crate::catalog::CatalogSnapshot;
use crate::model::types::Product;

/// Malformed AI output shape.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("expected a JSON array of products, got {0}")]
    NotAnArray(&'static str),
    #[error("product at index {index} is malformed: {reason}")]
    MalformedProduct { index: usize, reason: String },
    #[error("product id {id} is not present in the catalog snapshot")]
    UnknownId { id: u64 },
}

/// Strict, all-or-nothing validation for the remote path.
///
/// The value must be an array whose every element deserializes to a
/// [`Product`] with the correct primitive types, and every id must exist in
/// the snapshot that was sent with the request. One bad element fails the
/// whole payload.
pub fn validate_products(
    raw: &Value,
    catalog: &CatalogSnapshot,
) -> Result<Vec<Product>, ValidationError> {
    let items = raw
        .as_array()
        .ok_or_else(|| ValidationError::NotAnArray(json_kind(raw)))?;

    let mut products = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let product: Product = serde_json::from_value(item.clone()).map_err(|err| {
            ValidationError::MalformedProduct {
                index,
                reason: err.to_string(),
            }
        })?;
        if !catalog.contains_id(product.id) {
            return Err(ValidationError::UnknownId { id: product.id });
        }
        products.push(product);
    }
    Ok(products)
}

/// Lenient id filtering for the local path.
///
/// Ids the snapshot does not know are dropped; order is preserved. An empty
/// result after filtering is "no match", not an error.
pub fn filter_known_ids(ids: &[u64], catalog: &CatalogSnapshot) -> Vec<u64> {
    ids.iter()
        .copied()
        .filter(|id| catalog.contains_id(*id))
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new(vec![
            Product {
                id: 1,
                title: "Red Shirt".into(),
                price: 19.99,
                description: "cotton".into(),
                category: "men's clothing".into(),
                image: "img1".into(),
            },
            Product {
                id: 2,
                title: "Gold Ring".into(),
                price: 149.0,
                description: "band".into(),
                category: "jewelery".into(),
                image: "img2".into(),
            },
        ])
    }

    fn valid_product(id: u64) -> Value {
        json!({
            "id": id,
            "title": "Gold Ring",
            "price": 149.0,
            "description": "band",
            "category": "jewelery",
            "image": "img2"
        })
    }

    #[test]
    fn accepts_well_formed_array() {
        let raw = json!([valid_product(2)]);
        let products = validate_products(&raw, &catalog()).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, 2);
    }

    #[test]
    fn rejects_non_array_payload() {
        let err = validate_products(&json!({"data": []}), &catalog()).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnArray("an object")));
    }

    #[test]
    fn one_malformed_element_fails_the_whole_payload() {
        let mut bad = valid_product(2);
        bad["price"] = json!("expensive");
        let raw = json!([valid_product(1), bad]);
        let err = validate_products(&raw, &catalog()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MalformedProduct { index: 1, .. }
        ));
    }

    #[test]
    fn unknown_id_is_a_hard_error_on_the_remote_path() {
        let raw = json!([valid_product(99)]);
        let err = validate_products(&raw, &catalog()).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownId { id: 99 }));
    }

    #[test]
    fn local_path_drops_unknown_ids_silently() {
        let kept = filter_known_ids(&[99, 2, 7, 1], &catalog());
        assert_eq!(kept, vec![2, 1]);
    }

    #[test]
    fn local_path_empty_after_filter_is_no_match() {
        assert!(filter_known_ids(&[98, 99], &catalog()).is_empty());
    }
}
