use std::convert::TryFrom;
use std::fmt;

use tracing::{debug, warn};

use crate::domain::{AnalysisOutcome, AttemptFailure};
use crate::error::SubmitError;

/// Where the current upload attempt stands. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Loading {
        generation: u64,
    },
    Success(AnalysisOutcome),
    Error(AttemptFailure),
}

impl LifecycleState {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Loading { .. } => "Loading",
            Self::Success(_) => "Success",
            Self::Error(_) => "Error",
        }
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub const fn outcome(&self) -> Option<&AnalysisOutcome> {
        match self {
            Self::Success(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub const fn failure(&self) -> Option<&AttemptFailure> {
        match self {
            Self::Error(failure) => Some(failure),
            _ => None,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Loading { generation } => write!(f, "Loading(#{generation})"),
            Self::Success(outcome) => write!(f, "Success({} charts)", outcome.charts.len()),
            Self::Error(failure) => write!(f, "Error({})", failure.message),
        }
    }
}

#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    Submit { generation: u64 },
    Succeeded(AnalysisOutcome),
    Failed(AttemptFailure),
    Reset,
}

impl LifecycleEvent {
    const fn name(&self) -> &'static str {
        match self {
            Self::Submit { .. } => "Submit",
            Self::Succeeded(_) => "Succeeded",
            Self::Failed(_) => "Failed",
            Self::Reset => "Reset",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransitionError {
    pub from: &'static str,
    pub event: &'static str,
}

impl fmt::Display for StateTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid transition from {} with event {}",
            self.from, self.event
        )
    }
}

impl std::error::Error for StateTransitionError {}

struct NextState(LifecycleState);

impl TryFrom<(&LifecycleState, LifecycleEvent)> for NextState {
    type Error = StateTransitionError;

    fn try_from(value: (&LifecycleState, LifecycleEvent)) -> Result<Self, Self::Error> {
        let (current, event) = value;

        match (current, event) {
            (
                LifecycleState::Idle | LifecycleState::Success(_) | LifecycleState::Error(_),
                LifecycleEvent::Submit { generation },
            ) => Ok(Self(LifecycleState::Loading { generation })),
            (LifecycleState::Loading { .. }, LifecycleEvent::Succeeded(outcome)) => {
                Ok(Self(LifecycleState::Success(outcome)))
            }
            (LifecycleState::Loading { .. }, LifecycleEvent::Failed(failure)) => {
                Ok(Self(LifecycleState::Error(failure)))
            }
            (
                LifecycleState::Idle | LifecycleState::Success(_) | LifecycleState::Error(_),
                LifecycleEvent::Reset,
            ) => Ok(Self(LifecycleState::Idle)),
            (current, event) => Err(StateTransitionError {
                from: current.name(),
                event: event.name(),
            }),
        }
    }
}

/// What happened to a completion handed to [`RequestLifecycle::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The completion belongs to an attempt that is no longer current.
    Stale,
}

/// The `Idle → Loading → Success | Error` machine driving one page session.
#[derive(Debug, Default)]
pub struct RequestLifecycle {
    state: LifecycleState,
    generation: u64,
}

impl RequestLifecycle {
    pub const fn new() -> Self {
        Self {
            state: LifecycleState::Idle,
            generation: 0,
        }
    }

    pub const fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub const fn can_submit(&self) -> bool {
        !self.state.is_loading()
    }

    fn process_event(&mut self, event: LifecycleEvent) -> Result<(), StateTransitionError> {
        let next = NextState::try_from((&self.state, event))?;
        debug!(from = self.state.name(), to = next.0.name(), "lifecycle transition");
        self.state = next.0;
        Ok(())
    }

    /// Starts a new attempt and returns its generation.
    ///
    /// Entering `Loading` drops any previous charts or error. A running
    /// attempt rejects the submit before the selection is looked at. Without
    /// a selected file nothing changes.
    pub fn submit(&mut self, has_selection: bool) -> Result<u64, SubmitError> {
        if !self.can_submit() {
            return Err(SubmitError::InFlight);
        }
        if !has_selection {
            return Err(SubmitError::NoFileSelected);
        }

        let generation = self.generation + 1;
        self.process_event(LifecycleEvent::Submit { generation })
            .map_err(|_| SubmitError::InFlight)?;
        self.generation = generation;

        Ok(generation)
    }

    /// Applies the result of the attempt identified by `generation`.
    pub fn complete(
        &mut self,
        generation: u64,
        result: Result<AnalysisOutcome, AttemptFailure>,
    ) -> Completion {
        match self.state {
            LifecycleState::Loading { generation: current } if current == generation => {}
            _ => {
                warn!(
                    generation,
                    state = self.state.name(),
                    "ignoring completion of a stale upload"
                );
                return Completion::Stale;
            }
        }

        let event = match result {
            Ok(outcome) => LifecycleEvent::Succeeded(outcome),
            Err(failure) => LifecycleEvent::Failed(failure),
        };

        match self.process_event(event) {
            Ok(()) => Completion::Applied,
            Err(_) => Completion::Stale,
        }
    }

    /// Drops a finished result and returns to `Idle`. A running attempt is
    /// left alone.
    pub fn reset(&mut self) {
        if self.state.is_loading() {
            return;
        }
        if let Err(e) = self.process_event(LifecycleEvent::Reset) {
            warn!("{e}");
        }
    }
}
