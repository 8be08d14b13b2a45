//! # Audio Cues
//!
//! The core never decodes or buffers audio itself. It hands a [`SoundRef`]
//! and a volume to a [`SoundPlayer`] and forgets about it.
//!
//! ## Players
//!
//! - [`LogSoundPlayer`] - logs every cue, used by the headless demo
//! - [`RecordingSoundPlayer`] - keeps every cue in a shared list so callers
//!   can inspect what was played

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Reference to a sound asset, usually a path understood by the host audio API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SoundRef(String);

impl SoundRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SoundRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fire-and-forget sound output.
pub trait SoundPlayer {
    /// Play `sound` once at `volume` (0.0 - 1.0).
    fn play_one_shot(&mut self, sound: &SoundRef, volume: f32);
}

/// Player that only logs the cue.
#[derive(Debug, Default)]
pub struct LogSoundPlayer;

impl SoundPlayer for LogSoundPlayer {
    fn play_one_shot(&mut self, sound: &SoundRef, volume: f32) {
        log::info!("♪ {} (volume {:.2})", sound, volume);
    }
}

/// Player that records every cue.
///
/// Clones share the same list, so one clone can be handed to the session
/// while another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSoundPlayer {
    played: Rc<RefCell<Vec<(SoundRef, f32)>>>,
}

impl RecordingSoundPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All cues played so far, oldest first
    pub fn played(&self) -> Vec<SoundRef> {
        self.played.borrow().iter().map(|(s, _)| s.clone()).collect()
    }

    /// Most recently played cue
    pub fn last(&self) -> Option<SoundRef> {
        self.played.borrow().last().map(|(s, _)| s.clone())
    }

    pub fn clear(&self) {
        self.played.borrow_mut().clear();
    }
}

impl SoundPlayer for RecordingSoundPlayer {
    fn play_one_shot(&mut self, sound: &SoundRef, volume: f32) {
        self.played.borrow_mut().push((sound.clone(), volume));
    }
}
