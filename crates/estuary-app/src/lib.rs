//! Session layer for Estuary
//!
//! A sans-IO state machine that wires the estuary-core engine to the
//! external collaborators: the historical REST endpoints, the live-stream
//! transport, the translation backend, the notification platform, and the
//! presentation layer. The same code runs in production and in
//! deterministic simulation, because all I/O lives behind the [`Driver`]
//! trait and all time is passed in as instants.
//!
//! # Components
//!
//! - [`Session`]: per-room session state machine (events in, actions out)
//! - [`Notifier`]: at-most-once mention notification routing
//! - [`Driver`]: trait for platform-specific collaborator I/O
//! - [`Runtime`]: generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod driver;
mod error;
mod event;
mod notifier;
mod runtime;
mod session;

pub use action::SessionAction;
pub use driver::Driver;
pub use error::SessionError;
pub use event::SessionEvent;
pub use notifier::Notifier;
pub use runtime::Runtime;
pub use session::Session;
