//! Lenient batch decoding
//!
//! Listing endpoints return JSON arrays. A single malformed element must not
//! take the whole listing down: it is skipped, logged and counted. Only a
//! body that is not an array at all is an error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Errors decoding a listing body
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Body was valid JSON but not an array
    #[error("{what}: expected a JSON array, got {found}")]
    NotAnArray {
        /// Listing being decoded
        what: &'static str,
        /// JSON type actually received
        found: &'static str,
    },
}

/// Outcome of decoding a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch<T> {
    /// Records that decoded cleanly, in wire order
    pub items: Vec<T>,
    /// Number of elements skipped as malformed
    pub skipped: usize,
}

impl<T> Batch<T> {
    /// Batch with nothing skipped
    #[inline]
    #[must_use]
    pub fn clean(items: Vec<T>) -> Self {
        Self { items, skipped: 0 }
    }

    /// Discard the skip count
    #[inline]
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self::clean(Vec::new())
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode every element of `body` as `T`, skipping the ones that fail.
pub fn decode_batch<T: DeserializeOwned>(
    what: &'static str,
    body: Value,
) -> Result<Batch<T>, DecodeError> {
    let elements = match body {
        Value::Array(elements) => elements,
        other => {
            return Err(DecodeError::NotAnArray {
                what,
                found: json_type(&other),
            })
        }
    };

    let mut batch = Batch::clean(Vec::with_capacity(elements.len()));
    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<T>(element) {
            Ok(item) => batch.items.push(item),
            Err(e) => {
                tracing::warn!(listing = what, index, error = %e, "skipping malformed record");
                batch.skipped += 1;
            }
        }
    }

    if batch.skipped > 0 {
        tracing::debug!(
            listing = what,
            accepted = batch.items.len(),
            skipped = batch.skipped,
            "decoded listing with skipped records"
        );
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::PhaseRecord;
    use serde_json::json;

    #[test]
    fn malformed_elements_are_skipped() {
        let body = json!([
            { "ref_projet": "P1", "id_phase": 1 },
            42,
            { "nom_projet": "no ref" },
            { "ref_projet": "P2", "id_phase": "7" }
        ]);
        let batch: Batch<PhaseRecord> = decode_batch("phases", body).unwrap();
        assert_eq!(batch.items.len(), 2);
        assert_eq!(batch.skipped, 2);
        assert_eq!(batch.items[1].ref_projet.as_str(), "P2");
    }

    #[test]
    fn non_array_body_is_an_error() {
        let err = decode_batch::<PhaseRecord>("phases", json!({ "error": "boom" })).unwrap_err();
        assert!(err.to_string().contains("expected a JSON array, got object"));
    }

    #[test]
    fn empty_array_is_empty_batch() {
        let batch: Batch<PhaseRecord> = decode_batch("phases", json!([])).unwrap();
        assert_eq!(batch, Batch::default());
    }
}
