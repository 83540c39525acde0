//! QueryService - the entry point the inbound endpoints call.
//!
//! Wraps the dialog engine, the session store and the shared classifier so
//! the query endpoint, the district status endpoint and the console all see
//! the same classification.

use crate::catalog::LocationCatalog;
use crate::classifier::ThresholdClassifier;
use crate::config::ServiceConfig;
use crate::dialog::{render, ConversationState, DialogEngine};
use crate::error::StoreError;
use crate::metrics::MetricStore;
use crate::persist::{PersistError, SeedData};
use crate::report::DistrictReport;
use crate::resolver::EntityResolver;
use crate::session::{ConversationId, SessionStore};
use crate::thresholds::{ThresholdBand, ThresholdRegistry};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{debug, error};

/// Reply to one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryReply {
    /// Text shown to the user.
    pub response: String,

    /// State after the message was handled.
    pub state: ConversationState,

    /// Classified readings, when the reply answered a district query.
    pub report: Option<DistrictReport>,

    /// Set when a backing store failed and the state was left as it was.
    pub unavailable: bool,
}

/// The guided query service.
pub struct QueryService {
    engine: DialogEngine,
    sessions: SessionStore,
    thresholds: Arc<dyn ThresholdRegistry>,
}

impl QueryService {
    /// Create a service over the three lookup collaborators.
    pub fn new(
        catalog: Arc<dyn LocationCatalog>,
        metrics: Arc<dyn MetricStore>,
        thresholds: Arc<dyn ThresholdRegistry>,
        config: ServiceConfig,
    ) -> Self {
        let engine = DialogEngine::new(
            EntityResolver::new(catalog),
            metrics,
            ThresholdClassifier::new(Arc::clone(&thresholds)),
            config.keywords,
        );
        Self {
            engine,
            sessions: SessionStore::new(config.idle_timeout, config.sweep_interval),
            thresholds,
        }
    }

    /// Create a service backed by in-memory stores filled from a seed.
    pub fn from_seed(seed: SeedData, config: ServiceConfig) -> Result<Self, PersistError> {
        let (catalog, metrics, thresholds) = seed.into_backends()?;
        Ok(Self::new(
            Arc::new(catalog),
            Arc::new(metrics),
            Arc::new(thresholds),
            config,
        ))
    }

    /// Handle a message, using the local date when it names none.
    pub fn handle_message(&self, id: &ConversationId, message: &str) -> QueryReply {
        self.handle_message_on(id, message, Local::now().date_naive())
    }

    /// Handle a message with an explicit "today".
    ///
    /// The conversation's state only changes when every lookup succeeded.
    pub fn handle_message_on(
        &self,
        id: &ConversationId,
        message: &str,
        today: NaiveDate,
    ) -> QueryReply {
        self.sessions.with_session(id, |state| {
            match self.engine.respond(state, message, today) {
                Ok(turn) => {
                    if turn.state != *state {
                        debug!(
                            conversation = %id,
                            from = %state.step(),
                            to = %turn.state.step(),
                            "conversation advanced"
                        );
                    }
                    *state = turn.state.clone();
                    QueryReply {
                        response: turn.response,
                        state: turn.state,
                        report: turn.report,
                        unavailable: false,
                    }
                }
                Err(err) => {
                    error!(conversation = %id, error = %err, "lookup failed");
                    QueryReply {
                        response: render::UNAVAILABLE.to_string(),
                        state: state.clone(),
                        report: None,
                        unavailable: true,
                    }
                }
            }
        })
    }

    /// Classified readings for a district of `province` on a date.
    pub fn district_status(
        &self,
        province: &str,
        district: &str,
        date: NaiveDate,
    ) -> Result<Option<DistrictReport>, StoreError> {
        DistrictReport::build(
            self.engine.metrics().as_ref(),
            self.engine.classifier(),
            province,
            district,
            date,
        )
    }

    /// The state the next message for `id` would start from.
    pub fn state(&self, id: &ConversationId) -> Option<ConversationState> {
        self.sessions.state(id)
    }

    /// Number of tracked conversations.
    pub fn active_conversations(&self) -> usize {
        self.sessions.len()
    }

    /// Insert or replace a threshold band.
    pub fn upsert_threshold(&self, band: ThresholdBand) -> Result<(), StoreError> {
        debug!(metric = %band.metric_name, enabled = band.enabled, "threshold updated");
        self.thresholds.upsert_band(band)
    }

    /// Remove a threshold band. Returns whether one existed.
    pub fn delete_threshold(&self, metric_name: &str) -> Result<bool, StoreError> {
        self.thresholds.delete_band(metric_name)
    }

    pub fn thresholds(&self) -> &Arc<dyn ThresholdRegistry> {
        &self.thresholds
    }

    pub fn engine(&self) -> &DialogEngine {
        &self.engine
    }
}
