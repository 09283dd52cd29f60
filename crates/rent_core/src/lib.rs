//! RentWise core: monthly rent estimation for Indian apartment listings
//!
//! A listing's categorical attributes are label-encoded with the
//! vocabularies shipped alongside the model, laid out in the model's
//! feature order, scored by a gradient boosted tree ensemble and recorded
//! in the caller's session history.
//!
//! Modules:
//! - `encoders`: Categorical fields and their label encoders
//! - `features`: Listing inputs, numeric bounds, and the feature schema
//! - `gbdt`: Fixed-point gradient boosted tree model
//! - `model`: `RentModel` trait and model artifact loading
//! - `pipeline`: Encode → predict → record orchestration
//! - `history`: Session-scoped prediction history
//! - `serde_canon`: Canonical JSON fingerprints for artifacts

pub mod encoders;
pub mod errors;
pub mod features;
pub mod gbdt;
pub mod history;
pub mod model;
pub mod pipeline;
pub mod serde_canon;

pub use encoders::{CategoricalField, EncoderRegistry, LabelEncoder};
pub use errors::{Artifact, RentError, Result};
pub use features::{
    FeatureSlot, FeatureVector, ListingInput, NumericBounds, NumericField, FEATURE_SCHEMA,
};
pub use gbdt::GbdtModel;
pub use history::{HistoryStore, PredictionRecord};
pub use model::{load_model, RentModel};
pub use pipeline::{estimate_message, round_rent, PredictionPipeline, EMPTY_HISTORY_MESSAGE};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
