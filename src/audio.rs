//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects, one per gameplay event. The mapping
//! from events to sounds is platform independent; playback is web only.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Cursor stopped at a corner
    TurnCue,
    /// Player turned
    Turn,
    /// Gem collected
    GemCollect,
    /// Crown collected; each crown has its own chime
    CrownCollect(u8),
    /// Run failed
    Die,
    /// Final waypoint reached
    LevelComplete,
}

impl SoundEffect {
    /// Sound for an event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::TurnRequired { .. } => Some(SoundEffect::TurnCue),
            GameEvent::Turned { .. } => Some(SoundEffect::Turn),
            GameEvent::GemCollected { .. } => Some(SoundEffect::GemCollect),
            GameEvent::CrownCollected { sound_index, .. } => {
                Some(SoundEffect::CrownCollect(*sound_index))
            }
            GameEvent::RunFailed { .. } => Some(SoundEffect::Die),
            GameEvent::RunCompleted { .. } => Some(SoundEffect::LevelComplete),
            GameEvent::LevelStarted { .. } | GameEvent::ObstacleSpawned { .. } => None,
        }
    }

    /// Root pitch of a crown chime; later crowns ring higher
    pub fn crown_root(sound_index: u8) -> f32 {
        const ROOTS: [f32; 3] = [523.25, 659.25, 783.99];
        ROOTS[sound_index as usize % ROOTS.len()]
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::SoundEffect;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                sfx_volume: 1.0,
                muted: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Set master volume (0.0 - 1.0)
        pub fn set_master_volume(&mut self, vol: f32) {
            self.master_volume = vol.clamp(0.0, 1.0);
        }

        /// Set SFX volume (0.0 - 1.0)
        pub fn set_sfx_volume(&mut self, vol: f32) {
            self.sfx_volume = vol.clamp(0.0, 1.0);
        }

        /// Mute/unmute all audio
        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::TurnCue => self.play_turn_cue(ctx, vol),
                SoundEffect::Turn => self.play_turn(ctx, vol),
                SoundEffect::GemCollect => self.play_gem(ctx, vol),
                SoundEffect::CrownCollect(index) => self.play_crown(ctx, vol, index),
                SoundEffect::Die => self.play_die(ctx, vol),
                SoundEffect::LevelComplete => self.play_level_complete(ctx, vol),
            }
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Short decaying note starting `delay` seconds from now
        fn note(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
            level: f32,
            delay: f64,
            length: f64,
        ) {
            if let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(level, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + length)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + length + 0.05).ok();
            }
        }

        /// Corner ahead - soft tick
        fn play_turn_cue(&self, ctx: &AudioContext, vol: f32) {
            self.note(ctx, 880.0, OscillatorType::Sine, vol * 0.15, 0.0, 0.05);
        }

        /// Turn - snappy blip up
        fn play_turn(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc.frequency().set_value_at_time(300.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(600.0, t + 0.08)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.12).ok();
        }

        /// Gem - happy ding
        fn play_gem(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [600.0, 800.0, 1000.0].iter().enumerate() {
                self.note(ctx, *freq, OscillatorType::Sine, vol * 0.25, i as f64 * 0.08, 0.15);
            }
        }

        /// Crown - major arpeggio on the crown's root
        fn play_crown(&self, ctx: &AudioContext, vol: f32, index: u8) {
            let root = SoundEffect::crown_root(index);
            for (i, ratio) in [1.0, 1.25, 1.5, 2.0].iter().enumerate() {
                self.note(
                    ctx,
                    root * ratio,
                    OscillatorType::Triangle,
                    vol * 0.3,
                    i as f64 * 0.09,
                    0.3,
                );
            }
        }

        /// Die - sad descending
        fn play_die(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
                self.note(ctx, *freq, OscillatorType::Sine, vol * 0.3, i as f64 * 0.2, 0.3);
            }
        }

        /// Level complete - triumphant fanfare
        fn play_level_complete(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [500.0, 600.0, 700.0, 800.0, 1000.0].iter().enumerate() {
                self.note(ctx, *freq, OscillatorType::Triangle, vol * 0.25, i as f64 * 0.08, 0.25);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailReason;
    use glam::Vec3;

    #[test]
    fn test_event_sounds() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::CrownCollected {
                sound_index: 2,
                score: 50
            }),
            Some(SoundEffect::CrownCollect(2))
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::RunFailed {
                reason: FailReason::Collision,
                score: 0
            }),
            Some(SoundEffect::Die)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::ObstacleSpawned { pos: Vec3::ZERO }),
            None
        );
    }

    #[test]
    fn test_crown_roots_rise() {
        assert!(SoundEffect::crown_root(1) > SoundEffect::crown_root(0));
        assert!(SoundEffect::crown_root(2) > SoundEffect::crown_root(1));
        // Out-of-range indices wrap
        assert_eq!(SoundEffect::crown_root(3), SoundEffect::crown_root(0));
    }
}
