use crate::types::{Part, ShipmentInfo, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A sparse set of field changes to apply to the current version of a part.
///
/// Absent fields are left untouched. The identifier is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fitment_data: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment: Option<ShipmentInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl PartPatch {
    /// Decode a sparse JSON field map.
    ///
    /// Unrecognized keys are ignored. A recognized key whose value has the
    /// wrong type fails the whole decode, so nothing is ever half-applied.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ValidationError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if !value.is_object() {
            return Err(ValidationError::Malformed(
                "patch payload must be a JSON object".into(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Assign every present field onto `part`.
    pub fn apply_to(self, part: &mut Part) {
        if let Some(name) = self.name {
            part.name = name;
        }
        if let Some(images) = self.images {
            part.images = images;
        }
        if let Some(sku) = self.sku {
            part.sku = sku;
        }
        if let Some(description) = self.description {
            part.description = description;
        }
        if let Some(price) = self.price {
            part.price = price;
        }
        if let Some(attributes) = self.attributes {
            part.attributes = attributes;
        }
        if let Some(fitment_data) = self.fitment_data {
            part.fitment_data = fitment_data;
        }
        if let Some(location) = self.location {
            part.location = location;
        }
        if let Some(shipment) = self.shipment {
            part.shipment = shipment;
        }
        if let Some(metadata) = self.metadata {
            part.metadata = metadata;
        }
    }
}
