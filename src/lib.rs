//! Driving Simulation Library
//!
//! A procedural driving and walking simulation that can run headless or with a Bevy UI.

pub mod simulation;

#[cfg(feature = "ui")]
pub mod ui;
