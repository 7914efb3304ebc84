//! Graph nodes rendered by the offline engine.
//!
//! A deliberately small voice toolkit: oscillators, an ADSR envelope and a
//! VCA combinator, enough to turn scheduled note messages into sound.

/// Multiply two signals together (amplitude control).
pub mod amplify;
/// Linear ADSR envelope node.
pub mod envelope;
/// Fluent combinators (`.amplify()`, `.boxed()`).
pub mod extensions;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators and noise.
pub mod oscillator;

pub use node::{GraphNode, RenderCtx};
