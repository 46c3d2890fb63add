//! # Bookflow Wizard
//!
//! Form-state aggregator for the operator-facing activity wizard.
//!
//! The wizard accumulates a single mutable configuration object across its
//! steps and hands it to a publish collaborator on completion. Its contract
//! is deliberately thin:
//!
//! - every step mutates exactly one named field at a time, through the
//!   single [`WizardAction::UpdateField`] entry point;
//! - navigation is unconditional — no step reads another step's field to
//!   block "Next";
//! - [`WizardAction::Publish`] snapshots the accumulated configuration and
//!   dispatches it to the [`ActivityPublisher`].

use bookflow_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a published activity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(Uuid);

impl ActivityId {
    /// Creates a new random `ActivityId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `ActivityId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ActivityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The wizard's ordered steps
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardStep {
    /// Name, description, capacity
    Details,
    /// Ticket types and prices
    Pricing,
    /// Opening hours and slot grid
    Schedule,
    /// Cover image and gallery
    Media,
    /// Widget embed snippet
    Embed,
    /// Final review before publishing
    Review,
}

impl WizardStep {
    /// All steps in display order
    pub const ALL: [Self; 6] = [
        Self::Details,
        Self::Pricing,
        Self::Schedule,
        Self::Media,
        Self::Embed,
        Self::Review,
    ];

    /// The following step, or `None` at the end
    #[must_use]
    pub fn next(self) -> Option<Self> {
        let index = Self::ALL.iter().position(|step| *step == self)?;
        Self::ALL.get(index + 1).copied()
    }

    /// The preceding step, or `None` at the start
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        let index = Self::ALL.iter().position(|step| *step == self)?;
        index.checked_sub(1).and_then(|i| Self::ALL.get(i)).copied()
    }
}

/// Publish failure reported by the collaborator
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PublishError {
    /// The backend rejected the configuration
    #[error("Publish rejected: {0}")]
    Rejected(String),
    /// The collaborator could not be reached
    #[error("Publish unavailable: {0}")]
    Unavailable(String),
}

/// Boxed future returned by [`ActivityPublisher::publish`]
pub type PublishFuture = Pin<Box<dyn Future<Output = Result<ActivityId, PublishError>> + Send>>;

/// Publish collaborator: turns the accumulated configuration into a live
/// activity
pub trait ActivityPublisher: Send + Sync {
    /// Publish the configuration
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the backend rejects the configuration
    /// or cannot be reached.
    fn publish(&self, config: &BTreeMap<String, Value>) -> PublishFuture;
}

/// Publisher that always succeeds, for local use and tests
#[derive(Clone, Debug, Default)]
pub struct MockActivityPublisher;

impl MockActivityPublisher {
    /// Creates a new mock publisher
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn ActivityPublisher> {
        Arc::new(Self::new())
    }
}

impl ActivityPublisher for MockActivityPublisher {
    fn publish(&self, config: &BTreeMap<String, Value>) -> PublishFuture {
        let field_count = config.len();
        Box::pin(async move {
            let id = ActivityId::new();
            tracing::info!(%id, field_count, "mock activity published");
            Ok(id)
        })
    }
}

/// Environment dependencies for the wizard reducer
#[derive(Clone)]
pub struct WizardEnvironment {
    /// Publish collaborator
    pub publisher: Arc<dyn ActivityPublisher>,
}

impl WizardEnvironment {
    /// Creates a new `WizardEnvironment`
    #[must_use]
    pub fn new(publisher: Arc<dyn ActivityPublisher>) -> Self {
        Self { publisher }
    }
}

/// State for the wizard reducer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WizardState {
    /// Step currently shown
    pub current_step: WizardStep,
    /// The accumulated configuration, one entry per named field
    pub fields: BTreeMap<String, Value>,
    /// A publish request is outstanding
    pub publishing: bool,
    /// The activity created by a successful publish
    pub published_activity: Option<ActivityId>,
    /// Publish failure message, for display
    pub last_error: Option<String>,
}

impl WizardState {
    /// Creates a fresh wizard at the first step
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_step: WizardStep::Details,
            fields: BTreeMap::new(),
            publishing: false,
            published_activity: None,
            last_error: None,
        }
    }

    /// Reads one named field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

/// Actions for the wizard reducer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum WizardAction {
    /// Set exactly one named field of the configuration
    UpdateField {
        /// Field name (e.g. `"name"`, `"capacity"`, `"cover_image_url"`)
        field: String,
        /// New value
        value: Value,
    },

    /// Advance to the next step; unconditional, no cross-step validation
    NextStep,

    /// Return to the previous step; unconditional
    PreviousStep,

    /// Hand the accumulated configuration to the publish collaborator
    Publish,

    /// Completion: the publisher created the activity
    PublishSucceeded {
        /// The created activity
        activity_id: ActivityId,
    },

    /// Completion: the publisher refused or failed
    PublishFailed {
        /// Failure message for display
        error: String,
    },
}

/// Reducer for the activity wizard
#[derive(Clone, Debug, Default)]
pub struct WizardReducer;

impl WizardReducer {
    /// Creates a new `WizardReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for WizardReducer {
    type State = WizardState;
    type Action = WizardAction;
    type Environment = WizardEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            WizardAction::UpdateField { field, value } => {
                state.fields.insert(field, value);
                SmallVec::new()
            },

            WizardAction::NextStep => {
                if let Some(next) = state.current_step.next() {
                    state.current_step = next;
                }
                SmallVec::new()
            },

            WizardAction::PreviousStep => {
                if let Some(previous) = state.current_step.previous() {
                    state.current_step = previous;
                }
                SmallVec::new()
            },

            WizardAction::Publish => {
                if state.publishing {
                    tracing::debug!("publish already in flight");
                    return SmallVec::new();
                }
                state.publishing = true;
                state.last_error = None;

                let publisher = Arc::clone(&env.publisher);
                let config = state.fields.clone();

                smallvec![Effect::Future(Box::pin(async move {
                    match publisher.publish(&config).await {
                        Ok(activity_id) => Some(WizardAction::PublishSucceeded { activity_id }),
                        Err(error) => {
                            tracing::error!(%error, "activity publish failed");
                            Some(WizardAction::PublishFailed {
                                error: error.to_string(),
                            })
                        },
                    }
                }))]
            },

            WizardAction::PublishSucceeded { activity_id } => {
                state.publishing = false;
                state.published_activity = Some(activity_id);
                SmallVec::new()
            },

            WizardAction::PublishFailed { error } => {
                state.publishing = false;
                state.last_error = Some(error);
                SmallVec::new()
            },
        }
    }
}
