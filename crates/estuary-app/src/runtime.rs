//! Generic runtime for session orchestration.
//!
//! The Runtime drives the event loop, coordinating between the
//! [`Session`] state machine and a platform-specific [`Driver`]:
//! poll an event, feed it to the session, execute the resulting actions.
//!
//! Error routing follows the core taxonomy: side-effect actions
//! (notifications, scrolling, rendering) are logged and swallowed on
//! failure, while non-recoverable platform failures from collaborator
//! actions stop the loop. Session-level rejections (for example sending
//! with no active room) are logged and the loop continues.

use crate::{Driver, Session, SessionAction};

/// Generic runtime that orchestrates Session and Driver.
pub struct Runtime<D: Driver> {
    driver: D,
    session: Session<D::Instant>,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime from a driver and a prepared session.
    pub fn new(driver: D, session: Session<D::Instant>) -> Self {
        Self { driver, session }
    }

    /// Run the event loop until the driver's event source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver reports a non-recoverable platform
    /// failure.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.render();

        while let Some(event) = self.driver.poll_event().await? {
            match self.session.handle(event) {
                Ok(actions) => self.execute(actions).await?,
                Err(e) => tracing::warn!(error = %e, "session rejected event"),
            }
        }
        Ok(())
    }

    async fn execute(&mut self, actions: Vec<SessionAction>) -> Result<(), D::Error> {
        for action in actions {
            match action {
                SessionAction::Render => self.render(),
                // Side effects must never take down reconciliation.
                SessionAction::Notify { .. }
                | SessionAction::ScrollToLatest
                | SessionAction::ShowJumpToLatest => {
                    if let Err(e) = self.driver.dispatch(action).await {
                        tracing::warn!(error = %e, "side-effect action failed");
                    }
                },
                SessionAction::FetchHistory { .. }
                | SessionAction::FetchRoomInfo { .. }
                | SessionAction::FetchLikedSet { .. }
                | SessionAction::FetchOnlineCount { .. }
                | SessionAction::Join { .. }
                | SessionAction::Send { .. }
                | SessionAction::SendLikeToggle { .. }
                | SessionAction::Translate(_) => self.driver.dispatch(action).await?,
            }
        }
        Ok(())
    }

    fn render(&mut self) {
        if let Err(e) = self.driver.render(&self.session) {
            tracing::warn!(error = %e, "render failed");
        }
    }

    /// The session being driven.
    pub fn session(&self) -> &Session<D::Instant> {
        &self.session
    }

    /// Mutable access to the session, for direct test setup.
    pub fn session_mut(&mut self) -> &mut Session<D::Instant> {
        &mut self.session
    }
}
