pub mod channel;
pub mod reading;
pub mod subset;

pub use channel::Channel;
pub use reading::{IngestedSample, Reading};
pub use subset::ExtractedSubset;
