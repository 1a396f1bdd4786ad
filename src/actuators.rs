//! Fire-and-forget hardware cues around the scan workflow.
//!
//! LED and speaker calls are spawned and never awaited: a dead LED ring must
//! not stall or fail a session.

use std::sync::Arc;

use log::debug;

use crate::gateway::DeviceBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedColor {
    Green,
    Red,
    Blue,
    White,
    Off,
}

impl LedColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedColor::Green => "green",
            LedColor::Red => "red",
            LedColor::Blue => "blue",
            LedColor::White => "white",
            LedColor::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Beep,
    Success,
    Warning,
    Ready,
    Startup,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Beep => "beep",
            SoundCue::Success => "success",
            SoundCue::Warning => "warning",
            SoundCue::Ready => "ready",
            SoundCue::Startup => "startup",
        }
    }
}

pub(crate) fn signal_led(backend: &Arc<dyn DeviceBackend>, color: LedColor) {
    let backend = Arc::clone(backend);
    tokio::spawn(async move {
        if let Err(err) = backend.set_led(color).await {
            debug!("led cue {} failed: {err}", color.as_str());
        }
    });
}

pub(crate) fn play_cue(backend: &Arc<dyn DeviceBackend>, cue: SoundCue) {
    let backend = Arc::clone(backend);
    tokio::spawn(async move {
        if let Err(err) = backend.play_sound(cue).await {
            debug!("sound cue {} failed: {err}", cue.as_str());
        }
    });
}
