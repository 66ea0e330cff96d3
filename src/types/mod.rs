//! Public types for the Augur API.

mod classification;
mod labels;
mod message;
mod options;
mod response;

pub use classification::{Classification, FALLBACK_INTENT, FALLBACK_RATIONALE};
pub use labels::{DEFAULT_LABELS, LabelSet};
pub use message::{Message, Role};
pub use options::{ChatOptions, DEFAULT_MODEL};
pub use response::{ChatResponse, FinishReason, Usage};
