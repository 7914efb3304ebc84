//! Rendering engines and the scheduling timeline that feeds them.

pub mod message;
pub mod renderer;
pub mod scheduler;

use crate::{config::RenderConfig, deferred::RenderResult};

pub use self::{
    message::{NoteMessage, TimedMessage},
    renderer::{GraphEngine, TrackHandle, DEFAULT_QUEUE_CAPACITY},
    scheduler::{Scheduler, TimeoutId},
};

/// A non-realtime backend that turns scheduled work into audio
///
/// `start_rendering` is called exactly once by the offline context, after
/// simulated time has been fully stepped. Failures are reported through the
/// returned result.
pub trait RenderEngine: Send {
    fn start_rendering(&mut self) -> RenderResult;

    /// Configuration the engine renders with, if it carries its own.
    /// Contexts refuse engines whose configuration differs from theirs.
    fn render_config(&self) -> Option<&RenderConfig> {
        None
    }
}
