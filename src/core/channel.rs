use serde::{Deserialize, Serialize};
use super::{ExtractedSubset, Reading};

/// Initial reading capacity for channels created during ingestion
const INITIAL_CAPACITY: usize = 4096;

/// Time series for one sensor.
///
/// `data` is appended in arrival order. With a single collector that order is
/// strictly increasing in timestamp; with several collectors it is not, and
/// [`Channel::sort_by_timestamp`] must run before range extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: u16,
    pub name: String,
    pub unit: String,
    pub data: Vec<Reading>,
}

impl Channel {
    pub fn new(id: u16, name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            unit: unit.into(),
            data: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    pub fn push(&mut self, reading: Reading) {
        self.data.push(reading);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when every reading is strictly later than the one before it.
    pub fn is_ordered(&self) -> bool {
        self.data
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp)
    }

    /// Stable sort of the readings by timestamp.
    pub fn sort_by_timestamp(&mut self) {
        self.data.sort_by(|a, b| a.cmp_timestamp(b));
    }

    /// Copies the readings with `lo <= timestamp <= hi` into a fresh subset,
    /// separating NaN readings from the numeric ones.
    ///
    /// Requires `data` to be sorted; the bounds are found by binary search.
    pub fn subset(&self, lo: f64, hi: f64) -> ExtractedSubset {
        let mut subset = ExtractedSubset::for_channel(self);

        let start = self.data.partition_point(|r| r.timestamp < lo);
        let end = self.data.partition_point(|r| r.timestamp <= hi);
        if start >= end {
            return subset;
        }

        let span = &self.data[start..end];
        subset.timestamps.reserve(span.len());
        subset.values.reserve(span.len());

        for reading in span {
            if reading.is_nan() {
                subset.nan_readings.push(*reading);
            } else {
                subset.timestamps.push(reading.timestamp);
                subset.values.push(reading.value);
            }
        }

        subset
    }
}
