//! Session-scoped prediction history

use crate::features::ListingInput;
use serde::Serialize;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use tracing::debug;

/// One completed prediction: the raw inputs and the rounded rent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    #[serde(flatten)]
    listing: ListingInput,
    predicted_rent: f64,
}

impl PredictionRecord {
    pub fn new(listing: ListingInput, predicted_rent: f64) -> Self {
        Self {
            listing,
            predicted_rent,
        }
    }

    pub fn listing(&self) -> &ListingInput {
        &self.listing
    }

    pub fn predicted_rent(&self) -> f64 {
        self.predicted_rent
    }
}

/// Append-only record list owned by one session.
///
/// Unbounded by default. With a cap, the oldest records are dropped first
/// once the cap is exceeded.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    records: VecDeque<PredictionRecord>,
    max_records: Option<NonZeroUsize>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store keeping at most `max_records` entries
    pub fn with_capacity_limit(max_records: NonZeroUsize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_records.get()),
            max_records: Some(max_records),
        }
    }

    pub fn append(&mut self, record: PredictionRecord) {
        if let Some(limit) = self.max_records {
            while self.records.len() >= limit.get() {
                self.records.pop_front();
                debug!("Evicted oldest history record");
            }
        }

        self.records.push_back(record);
    }

    /// Records in insertion order; empty before the first prediction
    pub fn all(&self) -> &VecDeque<PredictionRecord> {
        &self.records
    }

    pub fn latest(&self) -> Option<&PredictionRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
