//! Guided district queries and threshold severity for water-supply monitoring.
//!
//! This crate provides:
//! - A multi-turn text dialog walking region → province → district → readings
//! - Case-insensitive substring resolution against a location catalog
//! - A threshold classifier and a worst-of severity aggregator
//! - Keyed conversation sessions with idle expiry
//! - Seed-file persistence for the in-memory backends
//!
//! # Quick Start
//!
//! ```ignore
//! use waterwatch_core::{ConversationId, QueryService, SeedData, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let seed = SeedData::load_json("data/seed.json").await?;
//!     let service = QueryService::from_seed(seed, ServiceConfig::new())?;
//!
//!     let id = ConversationId::new_random();
//!     println!("{}", service.handle_message(&id, "northern").response);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod dialog;
pub mod error;
pub mod headless;
pub mod metrics;
pub mod persist;
pub mod report;
pub mod resolver;
pub mod service;
pub mod session;
pub mod severity;
pub mod testing;
pub mod thresholds;

// Primary public API
pub use catalog::{InMemoryCatalog, LocationCatalog, LocationEntity, LocationLevel};
pub use classifier::{classify_value, ThresholdClassifier};
pub use config::ServiceConfig;
pub use dialog::{CommandKeywords, ConversationState, DialogEngine, Step, Turn};
pub use error::StoreError;
pub use headless::{QueryConsole, TranscriptEntry};
pub use metrics::{DistrictReadings, InMemoryMetricStore, MetricReading, MetricStore, StandardMetric};
pub use persist::{PersistError, SeedData, SeedMetadata};
pub use report::DistrictReport;
pub use resolver::EntityResolver;
pub use service::{QueryReply, QueryService};
pub use session::{ConversationId, SessionStore};
pub use severity::{aggregate, Band, OverallBand, OverallSeverity, SeverityResult};
pub use testing::{TestHarness, UnavailableStore};
pub use thresholds::{Bounds, InMemoryThresholdRegistry, ThresholdBand, ThresholdRegistry};
