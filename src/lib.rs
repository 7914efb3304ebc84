pub mod clock; // Virtual and realtime time sources
pub mod config;
pub mod context; // Offline context: virtual clock + render driver
pub mod deferred;
pub mod engine; // Rendering engines and the callback timeline
pub mod error;
pub mod graph; // Voices rendered by the graph engine
pub mod io;
pub mod tick;

pub use clock::{ClockSource, RealtimeSource, TimeSource, VirtualTimeSource, STEP_SECONDS};
pub use config::RenderConfig;
pub use context::{offline, OfflineContext};
pub use deferred::{Deferred, RenderResult, Resolver};
pub use engine::{GraphEngine, RenderEngine, TimeoutId, TrackHandle};
pub use error::{ConfigError, RenderError};
pub use io::AudioBuffer;
pub use tick::{SubscriptionId, Tick, TickEmitter};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
