//! Scroll-intent tracking and the autoscroll policy.
//!
//! Two independent flags, set by different triggers:
//!
//! - `is_user_scrolling`: armed by any scroll event, cleared after a fixed
//!   quiet period with no further scrolling (a debounce deadline restarted
//!   on every event, checked from [`ViewportController::tick`]).
//! - `is_near_bottom`: recomputed on every scroll event from the viewport
//!   geometry.
//!
//! New-message arrival autoscrolls only when the user is not scrolling and
//! is near the bottom (or has never scrolled); otherwise a "jump to latest"
//! affordance is surfaced. Sending one's own message always forces
//! autoscroll, since explicit intent overrides the passive heuristics.
//!
//! Generic over the instant type so the same code runs under the real clock
//! and under virtual time in simulation.

use std::{ops::Add, time::Duration};

/// Quiet period after the last scroll event before intent resets.
pub const SCROLL_QUIET_PERIOD: Duration = Duration::from_secs(2);

/// Distance from the bottom (px) still counted as "near bottom".
pub const NEAR_BOTTOM_THRESHOLD_PX: f64 = 100.0;

/// Viewport geometry reported with each scroll event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Scroll offset from the top of the content, px.
    pub scroll_top: f64,
    /// Visible viewport height, px.
    pub viewport_height: f64,
    /// Total scrollable content height, px.
    pub scroll_height: f64,
}

impl ScrollMetrics {
    /// Whether the viewport bottom edge is within the near-bottom
    /// threshold of the content end.
    fn near_bottom(self) -> bool {
        self.scroll_top + self.viewport_height >= self.scroll_height - NEAR_BOTTOM_THRESHOLD_PX
    }
}

/// What to do with the viewport when a new message arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowPolicy {
    /// Follow the conversation: scroll to the latest message.
    AutoScroll,
    /// Leave the viewport alone and surface a "jump to latest" affordance.
    JumpAffordance,
}

/// Debounced scroll-intent state machine.
#[derive(Debug, Clone)]
pub struct ViewportController<I = std::time::Instant> {
    is_user_scrolling: bool,
    is_near_bottom: bool,
    has_scrolled: bool,
    quiet_deadline: Option<I>,
}

impl<I> Default for ViewportController<I> {
    fn default() -> Self {
        Self {
            is_user_scrolling: false,
            is_near_bottom: true,
            has_scrolled: false,
            quiet_deadline: None,
        }
    }
}

impl<I> ViewportController<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create a controller in the idle, never-scrolled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a scroll event at `now`.
    ///
    /// Arms (or re-arms) the quiet-period deadline and recomputes the
    /// near-bottom flag from the reported geometry.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: I) {
        self.is_user_scrolling = true;
        self.has_scrolled = true;
        self.is_near_bottom = metrics.near_bottom();
        self.quiet_deadline = Some(now + SCROLL_QUIET_PERIOD);
    }

    /// Advance time: clear the scrolling flag once the quiet period has
    /// elapsed with no further scroll events.
    pub fn tick(&mut self, now: I) {
        if let Some(deadline) = self.quiet_deadline
            && now >= deadline
        {
            self.is_user_scrolling = false;
            self.quiet_deadline = None;
        }
    }

    /// Policy for a newly arrived message from another user.
    pub fn on_new_message(&self) -> FollowPolicy {
        if !self.is_user_scrolling && (self.is_near_bottom || !self.has_scrolled) {
            FollowPolicy::AutoScroll
        } else {
            FollowPolicy::JumpAffordance
        }
    }

    /// Policy when the current user sends a message: always follow.
    pub fn on_own_message(&self) -> FollowPolicy {
        FollowPolicy::AutoScroll
    }

    /// The user scrolled within the quiet period.
    pub fn is_user_scrolling(&self) -> bool {
        self.is_user_scrolling
    }

    /// The viewport sits within the near-bottom threshold.
    pub fn is_near_bottom(&self) -> bool {
        self.is_near_bottom
    }
}
