use crate::config::RenderConfig;

/// Errors raised while validating construction or scheduling parameters
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Channel count must be at least one
    Channels(usize),
    /// Duration must be finite and not negative
    Duration(f64),
    /// Sample rate must be finite and positive
    SampleRate(f32),
    /// Repeat interval must be finite and positive
    Interval(f64),
    /// Timeout delay must be finite and not negative
    Delay(f64),
    /// An injected engine was built for a different configuration
    EngineMismatch {
        context: RenderConfig,
        engine: RenderConfig,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Channels(n) => write!(f, "channel count must be positive, got {}", n),
            ConfigError::Duration(d) => {
                write!(f, "duration must be a finite number of seconds >= 0, got {}", d)
            }
            ConfigError::SampleRate(sr) => {
                write!(f, "sample rate must be a finite positive number, got {}", sr)
            }
            ConfigError::Interval(i) => {
                write!(f, "interval must be a finite positive number of seconds, got {}", i)
            }
            ConfigError::Delay(d) => {
                write!(f, "timeout delay must be a finite number of seconds >= 0, got {}", d)
            }
            ConfigError::EngineMismatch { context, engine } => write!(
                f,
                "engine renders {} channels, {}s at {} Hz but the context expects {} channels, {}s at {} Hz",
                engine.channels(),
                engine.duration(),
                engine.sample_rate(),
                context.channels(),
                context.duration(),
                context.sample_rate()
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors delivered through a [`Deferred`](crate::deferred::Deferred)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// `render` was already called on this context (or engine)
    AlreadyRendered,
    /// The context was closed and no longer owns an engine
    Closed,
    /// A track's message queue has no room left
    QueueFull { track: usize },
    /// The render worker thread could not be started
    Spawn(String),
    /// The producing side went away without resolving
    Abandoned,
    /// Failure reported by a rendering engine
    Engine(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::AlreadyRendered => write!(f, "context has already been rendered"),
            RenderError::Closed => write!(f, "context is closed"),
            RenderError::QueueFull { track } => {
                write!(f, "message queue for track {} is full", track)
            }
            RenderError::Spawn(reason) => write!(f, "failed to start render thread: {}", reason),
            RenderError::Abandoned => write!(f, "render result was dropped before resolving"),
            RenderError::Engine(reason) => write!(f, "rendering engine failed: {}", reason),
        }
    }
}

impl std::error::Error for RenderError {}
