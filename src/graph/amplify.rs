use crate::{
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/// Multiply a signal by a modulator, sample by sample (VCA).
pub struct Amplify<N, M> {
    pub signal: N,
    pub modulator: M,
    scratch: Vec<f32>,
}

impl<N, M> Amplify<N, M> {
    pub fn new(signal: N, modulator: M) -> Self {
        Self {
            signal,
            modulator,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<N: GraphNode, M: GraphNode> GraphNode for Amplify<N, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.signal.render_block(out, ctx);

        // Blocks longer than the scratch buffer are processed in chunks
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let gain = &mut self.scratch[..chunk.len()];
            self.modulator.render_block(gain, ctx);
            for (o, g) in chunk.iter_mut().zip(gain.iter()) {
                *o *= *g;
            }
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.signal.note_on(ctx);
        self.modulator.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.signal.note_off(ctx);
        self.modulator.note_off(ctx);
    }

    /// Silent once the modulator (usually an envelope) has finished
    fn is_active(&self) -> bool {
        self.modulator.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode};

    #[test]
    fn silent_until_note_on() {
        let ctx = RenderCtx::from_freq(48_000.0, 440.0, 100.0);
        let mut voice = OscNode::sine().amplify(EnvNode::adsr(0.001, 0.05, 0.5, 0.05));

        let mut out = vec![0.0f32; 256];
        voice.render_block(&mut out, &ctx);
        assert!(out.iter().all(|&s| s == 0.0));

        voice.note_on(&ctx);
        voice.render_block(&mut out, &ctx);
        assert!(out.iter().any(|s| s.abs() > 0.1));
        assert!(voice.is_active());
    }
}
