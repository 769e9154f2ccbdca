use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Minimum number of digits in a minted identifier (`P0001`).
const ID_WIDTH: usize = 4;
const ID_PREFIX: char = 'P';

/// Identifier of one part's lifeline across all of its versions.
///
/// Minted by the store from a sequential counter. The empty identifier is the
/// "not yet assigned" value carried by candidate payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(String);

impl PartId {
    /// Format the `seq`-th identifier, e.g. `P0001`.
    pub fn from_sequence(seq: u64) -> Self {
        Self(format!("{ID_PREFIX}{seq:0width$}", width = ID_WIDTH))
    }

    /// Recover the counter value from a minted identifier.
    /// Returns `None` for identifiers the store could not have minted.
    pub fn sequence(&self) -> Option<u64> {
        let digits = self.0.strip_prefix(ID_PREFIX)?;
        if digits.len() < ID_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for PartId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Shipping characteristics of a part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipmentInfo {
    pub weight: f64,
    /// Free-form size class, e.g. `"small"` or `"oversize"`.
    pub size: String,
    pub hazardous: bool,
    pub fragile: bool,
}

/// A vehicle part record: the payload stored in every version.
///
/// Missing fields decode to their empty defaults, matching the flat JSON
/// objects clients send.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Part {
    pub id: PartId,
    pub name: String,
    pub images: Vec<String>,
    /// Stock-keeping code. Empty means the part carries no SKU.
    pub sku: String,
    pub description: String,
    pub price: f64,
    pub attributes: BTreeMap<String, String>,
    pub fitment_data: Vec<String>,
    pub location: String,
    pub shipment: ShipmentInfo,
    pub metadata: BTreeMap<String, String>,
}

impl Part {
    /// Convenience constructor for the three fields most callers start with.
    pub fn new(name: impl Into<String>, sku: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            sku: sku.into(),
            price,
            ..Default::default()
        }
    }

    /// Whether this part carries a SKU that can take part in duplicate matching.
    pub fn has_sku(&self) -> bool {
        !self.sku.is_empty()
    }

    /// Check the payload constraints every stored version must satisfy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.price.is_finite() {
            return Err(ValidationError::NonFinitePrice);
        }
        if self.price < 0.0 {
            return Err(ValidationError::NegativePrice(self.price));
        }
        if !self.shipment.weight.is_finite() {
            return Err(ValidationError::NonFiniteWeight);
        }
        if self.shipment.weight < 0.0 {
            return Err(ValidationError::NegativeWeight(self.shipment.weight));
        }
        Ok(())
    }

    /// Decode a part from a JSON object.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ValidationError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if !value.is_object() {
            return Err(ValidationError::Malformed(
                "part payload must be a JSON object".into(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Errors raised for malformed or out-of-range part payloads.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("price must be non-negative, got {0}")]
    NegativePrice(f64),
    #[error("price must be a finite number")]
    NonFinitePrice,
    #[error("shipment weight must be non-negative, got {0}")]
    NegativeWeight(f64),
    #[error("shipment weight must be a finite number")]
    NonFiniteWeight,
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_from_sequence_is_fixed_width() {
        assert_eq!(PartId::from_sequence(1).as_str(), "P0001");
        assert_eq!(PartId::from_sequence(42).as_str(), "P0042");
        assert_eq!(PartId::from_sequence(12345).as_str(), "P12345");
    }

    #[test]
    fn id_sequence_round_trips_minted_ids_only() {
        assert_eq!(PartId::from_sequence(7).sequence(), Some(7));
        assert_eq!(PartId::from("P12345").sequence(), Some(12345));
        assert_eq!(PartId::from("P12").sequence(), None);
        assert_eq!(PartId::from("X0001").sequence(), None);
        assert_eq!(PartId::from("P00a1").sequence(), None);
        assert_eq!(PartId::default().sequence(), None);
    }

    #[test]
    fn validate_accepts_plain_part() {
        assert_eq!(Part::new("Brake Pad", "BP100", 29.99).validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_bad_numbers() {
        let part = Part::new("Rotor", "R1", -1.0);
        assert_eq!(part.validate(), Err(ValidationError::NegativePrice(-1.0)));

        let part = Part::new("Rotor", "R1", f64::NAN);
        assert_eq!(part.validate(), Err(ValidationError::NonFinitePrice));

        let mut part = Part::new("Rotor", "R1", 10.0);
        part.shipment.weight = -0.5;
        assert_eq!(part.validate(), Err(ValidationError::NegativeWeight(-0.5)));
    }

    #[test]
    fn validate_accepts_blank_name() {
        assert_eq!(Part::new("", "R1", 1.0).validate(), Ok(()));
        assert_eq!(Part::new("   ", "", 0.0).validate(), Ok(()));
    }

    #[test]
    fn from_json_fills_missing_fields_with_defaults() {
        let part = Part::from_json(br#"{"name":"Brake Pad","sku":"BP100","price":29.99}"#).unwrap();
        assert_eq!(part.name, "Brake Pad");
        assert_eq!(part.price, 29.99);
        assert!(part.id.is_empty());
        assert!(part.images.is_empty());
        assert_eq!(part.shipment, ShipmentInfo::default());
    }

    #[test]
    fn from_json_uses_wire_field_names() {
        let part = Part::from_json(
            br#"{"name":"Strut","fitment_data":["2019 Civic"],"shipment":{"weight":4.5,"size":"large","fragile":true}}"#,
        )
        .unwrap();
        assert_eq!(part.fitment_data, vec!["2019 Civic".to_string()]);
        assert_eq!(part.shipment.weight, 4.5);
        assert!(part.shipment.fragile);
        assert!(!part.shipment.hazardous);
    }

    #[test]
    fn from_json_rejects_non_objects_and_wrong_types() {
        assert!(matches!(
            Part::from_json(br#"["Brake Pad"]"#),
            Err(ValidationError::Malformed(_))
        ));
        assert!(matches!(
            Part::from_json(br#"{"price":"cheap"}"#),
            Err(ValidationError::Malformed(_))
        ));
        assert!(matches!(
            Part::from_json(b"{not json"),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn serializes_flat_object_with_id() {
        let mut part = Part::new("Brake Pad", "BP100", 29.99);
        part.id = PartId::from_sequence(1);
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["id"], "P0001");
        assert_eq!(json["shipment"]["hazardous"], false);
        assert!(json.get("fitment_data").is_some());
    }
}
