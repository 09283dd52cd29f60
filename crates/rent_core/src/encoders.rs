//! Categorical encoders for the listing form
//!
//! Each categorical field has a fixed, ordered vocabulary. The code of a
//! value is its position in that vocabulary, matching the label encoding
//! the rent model was trained with. The registry is loaded once from the
//! encoder artifact and is read-only afterwards.
//!
//! # Artifact Format
//!
//! ```json
//! {
//!   "city": ["Bangalore", "Delhi", "Mumbai"],
//!   "neighborhood": ["Andheri", "Indiranagar", "Saket"],
//!   "furnishing": ["Furnished", "Semi-Furnished", "Unfurnished"],
//!   "area_type": ["Built Area", "Carpet", "Super Area"],
//!   "tenant_preferred": ["Bachelors", "Bachelors/Family", "Family"]
//! }
//! ```

use crate::errors::{Artifact, RentError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// The five categorical inputs of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    City,
    Neighborhood,
    Furnishing,
    AreaType,
    TenantPreferred,
}

impl CategoricalField {
    /// All fields, in feature-schema order
    pub const ALL: [CategoricalField; 5] = [
        CategoricalField::City,
        CategoricalField::Neighborhood,
        CategoricalField::Furnishing,
        CategoricalField::AreaType,
        CategoricalField::TenantPreferred,
    ];

    /// Key used in the encoder artifact and in listing payloads
    pub fn key(self) -> &'static str {
        match self {
            CategoricalField::City => "city",
            CategoricalField::Neighborhood => "neighborhood",
            CategoricalField::Furnishing => "furnishing",
            CategoricalField::AreaType => "area_type",
            CategoricalField::TenantPreferred => "tenant_preferred",
        }
    }

    /// Human-readable form label
    pub fn label(self) -> &'static str {
        match self {
            CategoricalField::City => "City",
            CategoricalField::Neighborhood => "Neighborhood",
            CategoricalField::Furnishing => "Furnishing Status",
            CategoricalField::AreaType => "Area Type",
            CategoricalField::TenantPreferred => "Tenant Preferred",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ordered vocabulary of one categorical field with its code lookup
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    field: CategoricalField,
    classes: Vec<String>,
    codes: HashMap<String, i64>,
}

impl LabelEncoder {
    /// Build an encoder; classes must be non-empty and distinct
    pub fn new(field: CategoricalField, classes: Vec<String>) -> Result<Self> {
        if classes.is_empty() {
            return Err(RentError::startup_load(
                Artifact::Encoders,
                format!("field {field} has an empty vocabulary"),
            ));
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if codes.insert(class.clone(), code as i64).is_some() {
                return Err(RentError::startup_load(
                    Artifact::Encoders,
                    format!("field {field} lists {class:?} more than once"),
                ));
            }
        }

        Ok(Self {
            field,
            classes,
            codes,
        })
    }

    pub fn field(&self) -> CategoricalField {
        self.field
    }

    /// Valid values in encoding order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Integer code of `value`
    pub fn transform(&self, value: &str) -> Result<i64> {
        self.codes
            .get(value)
            .copied()
            .ok_or_else(|| RentError::UnknownCategory {
                field: self.field,
                value: value.to_string(),
            })
    }

    /// Value carrying `code`, if any
    pub fn inverse_transform(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.classes.get(idx))
            .map(String::as_str)
    }
}

/// Encoders for all categorical fields
#[derive(Debug, Clone)]
pub struct EncoderRegistry {
    encoders: [LabelEncoder; 5],
}

impl EncoderRegistry {
    /// Build a registry from per-field class lists. Every field must be present.
    pub fn from_classes(mut classes: BTreeMap<CategoricalField, Vec<String>>) -> Result<Self> {
        let mut encoders = Vec::with_capacity(CategoricalField::ALL.len());
        for field in CategoricalField::ALL {
            let field_classes = classes.remove(&field).ok_or_else(|| {
                RentError::startup_load(
                    Artifact::Encoders,
                    format!("missing encoder for field {field}"),
                )
            })?;
            encoders.push(LabelEncoder::new(field, field_classes)?);
        }

        let encoders = <[LabelEncoder; 5]>::try_from(encoders).map_err(|found| {
            RentError::startup_load(
                Artifact::Encoders,
                format!("expected 5 encoders, built {}", found.len()),
            )
        })?;

        Ok(Self { encoders })
    }

    /// Parse the encoder artifact from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)
            .map_err(|e| RentError::startup_load(Artifact::Encoders, e))?;

        let mut classes = BTreeMap::new();
        for (key, values) in raw {
            match CategoricalField::from_key(&key) {
                Some(field) => {
                    classes.insert(field, values);
                }
                None => warn!("Ignoring encoder for unknown field {:?}", key),
            }
        }

        Self::from_classes(classes)
    }

    /// Load the encoder artifact from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            RentError::startup_load(Artifact::Encoders, format!("{}: {e}", path.display()))
        })?;
        let registry = Self::from_json_str(&json)?;

        info!(
            "Loaded encoders from {} ({})",
            path.display(),
            registry.summary()
        );
        Ok(registry)
    }

    pub fn encoder(&self, field: CategoricalField) -> &LabelEncoder {
        &self.encoders[field.index()]
    }

    /// Valid values for `field`, in encoding order
    pub fn vocabulary_for(&self, field: CategoricalField) -> &[String] {
        self.encoder(field).classes()
    }

    /// Code of `value` within `field`
    pub fn encode(&self, field: CategoricalField, value: &str) -> Result<i64> {
        self.encoder(field).transform(value)
    }

    pub fn decode(&self, field: CategoricalField, code: i64) -> Option<&str> {
        self.encoder(field).inverse_transform(code)
    }

    fn summary(&self) -> String {
        self.encoders
            .iter()
            .map(|encoder| format!("{}={}", encoder.field(), encoder.classes().len()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
