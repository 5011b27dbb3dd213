pub mod client;
pub mod dates;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod types;

pub use client::BetterClient;
pub use error::BetterError;
pub use normalize::{normalize_responses, CoercionPolicy, ColumnSchema};
pub use pipeline::run_availability;
pub use types::{AvailabilityQuery, CellValue, Column, DayOutcome, ProcessedRecord, RawResponse};
