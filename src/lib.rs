pub mod detection;
pub mod flowers;
pub mod masking;
pub mod models;
pub mod mosaic;
pub mod ops;
pub mod ordering;
pub mod workspace;

pub use detection::MarkerExtractor;
pub use models::{DetectedImage, LogEntry, LogLevel, Marker, Phase, RunState};
pub use workspace::Workspace;
