//! Engine and road sound parameters
//!
//! Computes oscillator frequencies and gains from the truck's speed. The
//! actual sound output belongs to whatever front end is attached; this only
//! models the values it should play.

use log::debug;

use super::vehicle::MAX_SPEED;

pub const ENGINE_IDLE_FREQ: f32 = 80.0;
pub const ENGINE_MAX_FREQ: f32 = 220.0;
/// Fraction of the gap to the target engine frequency closed per update
pub const ENGINE_FREQ_SMOOTHING: f32 = 0.1;
pub const ENGINE_BASE_GAIN: f32 = 0.05;
pub const ENGINE_SPEED_GAIN: f32 = 0.15;
pub const ENGINE_THROTTLE_BOOST: f32 = 0.05;
pub const ROAD_BASE_FREQ: f32 = 200.0;
pub const ROAD_SPEED_FREQ: f32 = 100.0;
pub const ROAD_MAX_GAIN: f32 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorState {
    pub frequency: f32,
    pub gain: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioOutput {
    pub engine: OscillatorState,
    pub road: OscillatorState,
}

/// Sound model for driving. Oscillators exist only between `start` and `stop`.
#[derive(Debug, Clone, Default)]
pub struct DrivingAudio {
    output: Option<AudioOutput>,
    muted: bool,
}

impl DrivingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create silent oscillators at idle pitch. No-op when already running.
    pub fn start(&mut self) {
        if self.output.is_some() {
            return;
        }
        debug!("Driving audio started");
        self.output = Some(AudioOutput {
            engine: OscillatorState {
                frequency: ENGINE_IDLE_FREQ,
                gain: 0.0,
            },
            road: OscillatorState {
                frequency: ROAD_BASE_FREQ,
                gain: 0.0,
            },
        });
    }

    pub fn stop(&mut self) {
        if self.output.take().is_some() {
            debug!("Driving audio stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.output.is_some()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn output(&self) -> Option<AudioOutput> {
        self.output
    }

    /// Retune the oscillators for the current speed. Does nothing while stopped.
    pub fn update(&mut self, speed: f32, is_accelerating: bool) {
        let muted = self.muted;
        let Some(output) = self.output.as_mut() else {
            return;
        };

        let normalized = (speed.abs() / MAX_SPEED).min(1.0);

        let target = ENGINE_IDLE_FREQ + (ENGINE_MAX_FREQ - ENGINE_IDLE_FREQ) * normalized;
        output.engine.frequency += (target - output.engine.frequency) * ENGINE_FREQ_SMOOTHING;

        let boost = if is_accelerating { ENGINE_THROTTLE_BOOST } else { 0.0 };
        output.engine.gain = if muted {
            0.0
        } else {
            ENGINE_BASE_GAIN + normalized * ENGINE_SPEED_GAIN + boost
        };

        output.road.gain = if muted { 0.0 } else { normalized * ROAD_MAX_GAIN };
        output.road.frequency = ROAD_BASE_FREQ + normalized * ROAD_SPEED_FREQ;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_until_started() {
        let mut audio = DrivingAudio::new();
        audio.update(30.0, true);
        assert!(audio.output().is_none());
    }

    #[test]
    fn full_speed_targets() {
        let mut audio = DrivingAudio::new();
        audio.start();
        audio.update(45.0, true);
        let out = audio.output().unwrap();
        assert!((out.engine.frequency - 94.0).abs() < 1e-4);
        assert!((out.engine.gain - 0.25).abs() < 1e-6);
        assert!((out.road.gain - 0.08).abs() < 1e-6);
        assert_eq!(out.road.frequency, 300.0);
    }

    #[test]
    fn muted_is_silent_but_keeps_pitch() {
        let mut audio = DrivingAudio::new();
        audio.start();
        audio.set_muted(true);
        audio.update(15.0, false);
        let out = audio.output().unwrap();
        assert_eq!(out.engine.gain, 0.0);
        assert_eq!(out.road.gain, 0.0);
        assert_eq!(out.road.frequency, 250.0);
    }
}
