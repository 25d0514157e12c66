use serde::{Deserialize, Serialize};
use super::{Channel, Reading};

/// Readings of one channel inside a timestamp window, split into parallel
/// `timestamps`/`values` vectors plus the NaN readings found in the window.
///
/// Owns its data; nothing refers back into the source channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSubset {
    pub id: u16,
    pub name: String,
    pub unit: String,
    pub timestamps: Vec<f64>,
    pub values: Vec<f64>,
    pub nan_readings: Vec<Reading>,
}

impl ExtractedSubset {
    /// Subset for a channel id the store does not know about.
    pub fn empty(id: u16) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub(crate) fn for_channel(channel: &Channel) -> Self {
        Self {
            id: channel.id,
            name: channel.name.clone(),
            unit: channel.unit.clone(),
            ..Self::default()
        }
    }

    /// Number of non-NaN readings
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the window held neither numeric nor NaN readings.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.nan_readings.is_empty()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }
}
