//! Gradient boosted tree rent model
//!
//! The model artifact is canonical JSON with fixed-point values:
//!
//! ```json
//! {
//!   "version": 1,
//!   "scale": 1000,
//!   "feature_names": ["area", "bedrooms", "bathrooms", "floor", "city",
//!                     "neighborhood", "furnishing", "area_type", "tenant_preferred"],
//!   "trees": [
//!     {
//!       "nodes": [
//!         {"id":0,"left":1,"right":2,"feature_idx":0,"threshold":1000000,"leaf":null},
//!         {"id":1,"left":-1,"right":-1,"feature_idx":-1,"threshold":0,"leaf":12000000},
//!         {"id":2,"left":-1,"right":-1,"feature_idx":-1,"threshold":0,"leaf":21000000}
//!       ],
//!       "weight": 1000
//!     }
//!   ],
//!   "bias": 0
//! }
//! ```
//!
//! `feature_names` must list the listing schema in order; a model trained
//! on a different layout is rejected at load time instead of silently
//! mispredicting.

pub mod model;
pub mod tree;

pub use model::{GbdtModel, ModelError, SCALE};
pub use tree::{Node, Tree};
