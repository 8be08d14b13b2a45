//! Session configuration.
//!
//! Plain data handed to [`KitchenApp::new`](crate::app::KitchenApp::new).
//! Every field has a default tuned for a kitchen at human scale (metres).

use crate::audio::SoundRef;

/// Top-level configuration for a kitchen session.
#[derive(Debug, Clone, Default)]
pub struct KitchenConfig {
    pub interaction: InteractionConfig,
    pub sounds: SoundConfig,
}

/// Distance thresholds used by the interaction controller.
#[derive(Debug, Clone, Copy)]
pub struct InteractionConfig {
    /// Hits farther than this never become the selected or hovered object
    pub max_selection_distance: f32,
    /// Hits farther than this never become a placement candidate
    pub max_placement_distance: f32,
    /// How far in front of the camera a dragged object floats
    pub reach_distance: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            max_selection_distance: 2.5,
            max_placement_distance: 2.5,
            reach_distance: 0.75,
        }
    }
}

/// Sound cues played by the session.
#[derive(Debug, Clone)]
pub struct SoundConfig {
    /// Played when an interact trigger finds no matching recipe
    pub failure: SoundRef,
    /// Played when a drag commits a placement
    pub place: Option<SoundRef>,
    pub volume: f32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            failure: SoundRef::new("sounds/failure.mp3"),
            place: Some(SoundRef::new("sounds/place.mp3")),
            volume: 0.5,
        }
    }
}
