//! Listing inputs and the model's feature schema
//!
//! The order in which features reach the model is defined once, in
//! [`FEATURE_SCHEMA`]. Both vector assembly and model validation read it,
//! so encoder output order and model input order cannot drift apart.

use crate::encoders::{CategoricalField, EncoderRegistry};
use crate::errors::{RentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four bounded numeric inputs of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Area,
    Bedrooms,
    Bathrooms,
    Floor,
}

/// Inclusive bounds and form default of a numeric input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumericBounds {
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

impl NumericField {
    pub const ALL: [NumericField; 4] = [
        NumericField::Area,
        NumericField::Bedrooms,
        NumericField::Bathrooms,
        NumericField::Floor,
    ];

    pub fn key(self) -> &'static str {
        match self {
            NumericField::Area => "area",
            NumericField::Bedrooms => "bedrooms",
            NumericField::Bathrooms => "bathrooms",
            NumericField::Floor => "floor",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NumericField::Area => "Area (sq ft)",
            NumericField::Bedrooms => "Bedrooms",
            NumericField::Bathrooms => "Bathrooms",
            NumericField::Floor => "Floor",
        }
    }

    pub fn bounds(self) -> NumericBounds {
        match self {
            NumericField::Area => NumericBounds {
                min: 100,
                max: 10_000,
                default: 1000,
            },
            NumericField::Bedrooms => NumericBounds {
                min: 1,
                max: 10,
                default: 2,
            },
            NumericField::Bathrooms => NumericBounds {
                min: 1,
                max: 10,
                default: 2,
            },
            NumericField::Floor => NumericBounds {
                min: 0,
                max: 100,
                default: 1,
            },
        }
    }

    /// Reject `value` if it falls outside the field's bounds
    pub fn check(self, value: i64) -> Result<i64> {
        let NumericBounds { min, max, .. } = self.bounds();
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(RentError::OutOfRange {
                field: self,
                value,
                min,
                max,
            })
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw, human-readable listing values as collected by the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingInput {
    pub area: i64,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub floor: i64,
    pub city: String,
    pub neighborhood: String,
    pub furnishing: String,
    pub area_type: String,
    pub tenant_preferred: String,
}

impl ListingInput {
    pub fn numeric(&self, field: NumericField) -> i64 {
        match field {
            NumericField::Area => self.area,
            NumericField::Bedrooms => self.bedrooms,
            NumericField::Bathrooms => self.bathrooms,
            NumericField::Floor => self.floor,
        }
    }

    pub fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::City => &self.city,
            CategoricalField::Neighborhood => &self.neighborhood,
            CategoricalField::Furnishing => &self.furnishing,
            CategoricalField::AreaType => &self.area_type,
            CategoricalField::TenantPreferred => &self.tenant_preferred,
        }
    }

    /// Check every numeric input against its bounds
    pub fn validate(&self) -> Result<()> {
        for field in NumericField::ALL {
            field.check(self.numeric(field))?;
        }
        Ok(())
    }
}

/// One position in the model's input vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSlot {
    Numeric(NumericField),
    Categorical(CategoricalField),
}

impl FeatureSlot {
    /// Name recorded in the model artifact for this slot
    pub fn name(self) -> &'static str {
        match self {
            FeatureSlot::Numeric(field) => field.key(),
            FeatureSlot::Categorical(field) => field.key(),
        }
    }
}

/// Slot order the rent model was trained with
pub const FEATURE_SCHEMA: [FeatureSlot; 9] = [
    FeatureSlot::Numeric(NumericField::Area),
    FeatureSlot::Numeric(NumericField::Bedrooms),
    FeatureSlot::Numeric(NumericField::Bathrooms),
    FeatureSlot::Numeric(NumericField::Floor),
    FeatureSlot::Categorical(CategoricalField::City),
    FeatureSlot::Categorical(CategoricalField::Neighborhood),
    FeatureSlot::Categorical(CategoricalField::Furnishing),
    FeatureSlot::Categorical(CategoricalField::AreaType),
    FeatureSlot::Categorical(CategoricalField::TenantPreferred),
];

/// Slot names in schema order
pub fn schema_names() -> Vec<&'static str> {
    FEATURE_SCHEMA.iter().map(|slot| slot.name()).collect()
}

/// Numeric model input, one value per schema slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureVector {
    values: Vec<i64>,
}

impl FeatureVector {
    /// Encode `listing` and lay its values out in schema order
    pub fn assemble(listing: &ListingInput, registry: &EncoderRegistry) -> Result<Self> {
        let values = FEATURE_SCHEMA
            .iter()
            .map(|slot| match *slot {
                FeatureSlot::Numeric(field) => Ok(listing.numeric(field)),
                FeatureSlot::Categorical(field) => {
                    registry.encode(field, listing.categorical(field))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { values })
    }

    /// Wrap raw values without going through the schema
    pub fn from_raw(values: Vec<i64>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
