use crate::{
    graph::node::{GraphNode, RenderCtx},
    MIN_TIME,
};

/*
Linear ADSR
===========

  level
    1.0 ┐   ╱╲
        │  ╱  ╲________
    S   │ ╱            ╲
    0.0 └╱──────────────╲──→ time
         A   D    S     R

note_on restarts the attack from zero. note_off releases from whatever level
the envelope currently has, so a short note never clicks. Stage increments
are recomputed from ctx.sample_rate every sample.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct EnvNode {
    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,

    stage: EnvelopeStage,
    level: f32,
    release_start: f32,
}

impl EnvNode {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: attack.max(MIN_TIME),
            decay: decay.max(MIN_TIME),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(MIN_TIME),
            stage: EnvelopeStage::Idle,
            level: 0.0,
            release_start: 0.0,
        }
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    fn next_sample(&mut self, sample_rate: f32) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => self.level = 0.0,
            EnvelopeStage::Attack => {
                self.level += 1.0 / (self.attack * sample_rate);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }
            EnvelopeStage::Decay => {
                self.level -= (1.0 - self.sustain) / (self.decay * sample_rate);
                if self.level <= self.sustain {
                    self.level = self.sustain;
                    self.stage = if self.sustain > 0.0 {
                        EnvelopeStage::Sustain
                    } else {
                        EnvelopeStage::Idle
                    };
                }
            }
            EnvelopeStage::Sustain => self.level = self.sustain,
            EnvelopeStage::Release => {
                self.level -= self.release_start / (self.release * sample_rate);
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }
        self.level
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(ctx.sample_rate);
        }
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.level = 0.0;
        self.stage = EnvelopeStage::Attack;
    }

    fn note_off(&mut self, _ctx: &RenderCtx) {
        if self.stage == EnvelopeStage::Idle {
            return;
        }
        self.release_start = self.level.max(MIN_TIME);
        self.stage = EnvelopeStage::Release;
    }

    fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(1_000.0, 440.0, 100.0)
    }

    #[test]
    fn idle_until_triggered() {
        let mut env = EnvNode::adsr(0.01, 0.01, 0.5, 0.01);
        let mut out = vec![1.0f32; 16];
        env.render_block(&mut out, &ctx());
        assert!(out.iter().all(|&s| s == 0.0));
        assert!(!env.is_active());
    }

    #[test]
    fn reaches_sustain_then_releases_to_idle() {
        // 10 samples each for attack/decay/release at 1 kHz
        let mut env = EnvNode::adsr(0.01, 0.01, 0.5, 0.01);
        let ctx = ctx();

        env.note_on(&ctx);
        let mut out = vec![0.0f32; 40];
        env.render_block(&mut out, &ctx);
        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert!((env.level() - 0.5).abs() < 1e-5);

        env.note_off(&ctx);
        env.render_block(&mut out, &ctx);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert_eq!(env.level(), 0.0);
        assert!(!env.is_active());
    }

    #[test]
    fn zero_sustain_finishes_without_note_off() {
        let mut env = EnvNode::adsr(0.001, 0.01, 0.0, 0.01);
        let ctx = ctx();
        env.note_on(&ctx);
        let mut out = vec![0.0f32; 64];
        env.render_block(&mut out, &ctx);
        assert!(!env.is_active());
        assert!(out.iter().all(|s| (0.0..=1.0).contains(s)));
    }
}
