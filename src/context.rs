//! OfflineContext - simulated time for non-realtime rendering
//!
//! Instead of a device clock, the context owns a virtual clock. `render`
//! walks it from its current position to the configured duration in fixed
//! 5 ms steps, publishing a [`Tick`] before every step so scheduled work runs
//! against the right simulated instant, then hands over to the rendering
//! engine.
//!
//! # Example
//!
//! ```ignore
//! use saavy_offline::{graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode}, OfflineContext};
//!
//! let mut ctx = OfflineContext::new(2, 1.0, 44_100.0)?;
//! let mut click = ctx
//!     .engine_mut()
//!     .expect("fresh context")
//!     .add_track(OscNode::sine().amplify(EnvNode::adsr(0.001, 0.05, 0.0, 0.01)));
//!
//! ctx.set_interval(0.25, move |time| {
//!     let _ = click.note_on(time, 84, 100);
//! })?;
//!
//! let buffer = ctx.render().wait()?;
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use crate::{
    clock::{ClockSource, TimeSource, VirtualClock, VirtualTimeSource},
    config::RenderConfig,
    deferred::{Deferred, RenderResult},
    engine::{GraphEngine, RenderEngine, Scheduler, TimeoutId},
    error::{ConfigError, RenderError},
    tick::{SubscriptionId, Tick, TickEmitter},
};

/// Non-realtime context driven by a virtual clock
///
/// Misuse policy: a second `render`, or `render` after `close`, resolves
/// with [`RenderError::AlreadyRendered`] / [`RenderError::Closed`] and leaves
/// the clock untouched. `close` and `resume` can be called any number of
/// times.
pub struct OfflineContext<E: RenderEngine = GraphEngine> {
    config: RenderConfig,
    clock: VirtualClock,
    ticks: TickEmitter,
    scheduler: Arc<Mutex<Scheduler>>,
    engine: Option<E>,
    rendered: bool,
}

impl OfflineContext<GraphEngine> {
    /// Context backed by a [`GraphEngine`]
    pub fn new(channels: usize, duration: f64, sample_rate: f32) -> Result<Self, ConfigError> {
        let config = RenderConfig::new(channels, duration, sample_rate)?;
        let engine = GraphEngine::new(&config);
        Self::with_engine(config, engine)
    }
}

impl<E: RenderEngine> OfflineContext<E> {
    /// Context backed by any engine.
    ///
    /// Fails with [`ConfigError::EngineMismatch`] if the engine reports a
    /// configuration other than `config`.
    pub fn with_engine(config: RenderConfig, engine: E) -> Result<Self, ConfigError> {
        if let Some(engine_config) = engine.render_config() {
            if *engine_config != config {
                return Err(ConfigError::EngineMismatch {
                    context: config,
                    engine: *engine_config,
                });
            }
        }

        let clock = VirtualClock::new();
        let scheduler = Arc::new(Mutex::new(Scheduler::new()));

        // The scheduler is the first tick subscriber; timeouts due at a step
        // run before user subscribers see that step.
        let mut ticks = TickEmitter::new();
        {
            let scheduler = Arc::clone(&scheduler);
            let time = clock.reader();
            ticks.subscribe(move |_| {
                Scheduler::run_due(&scheduler, time.now());
            });
        }

        debug!(
            "offline context: {} channels, {}s at {} Hz ({} frames)",
            config.channels(),
            config.duration(),
            config.sample_rate(),
            config.frames()
        );

        Ok(Self {
            config,
            clock,
            ticks,
            scheduler,
            engine: Some(engine),
            rendered: false,
        })
    }

    /// Current simulated time in seconds
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Read-only handle on the virtual clock, for code that needs "now"
    pub fn time_source(&self) -> VirtualTimeSource {
        self.clock.reader()
    }

    pub fn clock_source(&self) -> ClockSource {
        ClockSource::Offline
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate()
    }

    pub fn duration(&self) -> f64 {
        self.config.duration()
    }

    pub fn lookahead(&self) -> f64 {
        self.config.lookahead()
    }

    /// Nominal update interval (128 frames). Informational only; stepping
    /// always uses [`STEP_SECONDS`](crate::clock::STEP_SECONDS).
    pub fn update_interval(&self) -> f64 {
        self.config.update_interval()
    }

    /// The engine, or `None` once closed
    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }

    pub fn is_closed(&self) -> bool {
        self.engine.is_none()
    }

    /// Subscribe to the per-step tick
    pub fn on_tick<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&Tick) + Send + 'static,
    {
        self.ticks.subscribe(subscriber)
    }

    pub fn off_tick(&mut self, id: SubscriptionId) -> bool {
        self.ticks.unsubscribe(id)
    }

    /// Run `callback` once, `delay` simulated seconds from now.
    pub fn set_timeout<F>(&mut self, delay: f64, callback: F) -> Result<TimeoutId, ConfigError>
    where
        F: FnOnce(f64) + Send + 'static,
    {
        let now = self.now();
        self.lock_scheduler().set_timeout(now, delay, callback)
    }

    /// Run `callback` every `interval` simulated seconds, first one interval from now.
    pub fn set_interval<F>(&mut self, interval: f64, callback: F) -> Result<TimeoutId, ConfigError>
    where
        F: FnMut(f64) + Send + 'static,
    {
        let now = self.now();
        self.lock_scheduler().set_interval(now, interval, callback)
    }

    pub fn clear_timeout(&mut self, id: TimeoutId) -> bool {
        self.lock_scheduler().clear(id)
    }

    /// No device to wake offline; resolves immediately and changes nothing.
    pub fn resume(&self) -> Deferred<()> {
        Deferred::resolved(())
    }

    /// Step simulated time to the configured duration, then render.
    ///
    /// Every step publishes one tick at the current time and only then
    /// advances the clock by 5 ms, until the clock has passed the duration.
    /// The engine's result is returned as is.
    ///
    /// A duration that is a whole number of steps gets a final tick exactly
    /// at the duration, so the clock then ends one full step past it
    /// (1.0 s: 201 ticks, clock at 1.005 s). Otherwise it ends less than a
    /// step past the duration.
    pub fn render(&mut self) -> RenderResult {
        let Some(engine) = self.engine.as_mut() else {
            return Deferred::rejected(RenderError::Closed);
        };
        if self.rendered {
            return Deferred::rejected(RenderError::AlreadyRendered);
        }
        self.rendered = true;

        let duration = self.config.duration();
        let start = self.clock.steps();
        while duration - self.clock.now() >= 0.0 {
            self.ticks.emit();
            self.clock.advance();
        }

        debug!(
            "stepped {} ticks, clock at {:.3}s; starting render",
            self.clock.steps() - start,
            self.clock.now()
        );

        engine.start_rendering()
    }

    /// Release the engine. Safe to call more than once.
    pub fn close(&mut self) -> Deferred<()> {
        if self.engine.take().is_some() {
            debug!("offline context closed at {:.3}s", self.clock.now());
        }
        Deferred::resolved(())
    }

    fn lock_scheduler(&self) -> std::sync::MutexGuard<'_, Scheduler> {
        self.scheduler.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Build a [`GraphEngine`] context, let `setup` build the graph and schedule
/// work, then render it.
pub fn offline<F>(
    channels: usize,
    duration: f64,
    sample_rate: f32,
    setup: F,
) -> Result<RenderResult, ConfigError>
where
    F: FnOnce(&mut OfflineContext<GraphEngine>),
{
    let mut ctx = OfflineContext::new(channels, duration, sample_rate)?;
    setup(&mut ctx);
    Ok(ctx.render())
}
