//! Driver trait for abstracting collaborator I/O.
//!
//! The [`Driver`] trait decouples the session runtime from the external
//! collaborators: the historical REST endpoints, the live-stream transport,
//! the translation backend, the notification platform, and rendering.
//! Each frontend implements the trait; the generic [`crate::Runtime`]
//! handles all orchestration, so the same code runs in production and in
//! deterministic simulation.
//!
//! Dispatched actions are fire-and-forget: their completions arrive later
//! as independent [`SessionEvent`]s from [`Driver::poll_event`], possibly
//! out of order with respect to each other. Transient transport failures
//! (fetch retries, stream reconnects) are the driver's responsibility; it
//! reports them to the session only as `ConnectionChanged` events.

use std::{future::Future, ops::Add, time::Duration};

use crate::{Session, SessionAction, SessionEvent};

/// Abstracts collaborator I/O for the session runtime.
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or virtual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Add<Duration, Output = Self::Instant> + Send + Sync;

    /// Poll for the next session event.
    ///
    /// Returns `None` when the event source is exhausted and the runtime
    /// should stop.
    fn poll_event(
        &mut self,
    ) -> impl Future<Output = Result<Option<SessionEvent<Self::Instant>>, Self::Error>> + Send;

    /// Execute a collaborator or side-effect action.
    ///
    /// Completions are delivered later through [`Self::poll_event`].
    ///
    /// # Errors
    ///
    /// Returns an error only for non-recoverable platform failures;
    /// transient transport trouble surfaces as `ConnectionChanged` events
    /// instead.
    fn dispatch(
        &mut self,
        action: SessionAction,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Render the presentation layer from current session state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, session: &Session<Self::Instant>) -> Result<(), Self::Error>;

    /// Current time instant.
    fn now(&self) -> Self::Instant;
}
