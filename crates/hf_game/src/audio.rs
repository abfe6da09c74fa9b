//! Background music over `kira`.
//!
//! Audio is never required: with no output device or no music file the
//! context stays silent and the game runs unchanged.

use std::path::Path;
use std::time::Duration;

use kira::{
    manager::{backend::DefaultBackend, AudioManager, AudioManagerSettings},
    sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    tween::Tween,
    Volume,
};

pub const MUSIC_VOLUME: f64 = 0.5;

pub struct AudioContext {
    /// `None` when no audio device could be opened.
    manager: Option<AudioManager>,
    music: Option<StaticSoundData>,
    active_music: Option<StaticSoundHandle>,
}

impl AudioContext {
    pub fn new() -> Self {
        let manager = match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(m) => Some(m),
            Err(e) => {
                log::warn!("Failed to initialize audio manager: {e}. Audio disabled.");
                None
            }
        };
        Self {
            manager,
            music: None,
            active_music: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.manager.is_some()
    }

    /// Decodes the music track into memory. A missing or unreadable file is
    /// logged and leaves the game silent.
    pub fn load_music(&mut self, path: &Path) {
        if !self.is_available() {
            return;
        }
        match StaticSoundData::from_file(path) {
            Ok(data) => {
                log::info!("Loaded music {}", path.display());
                self.music = Some(data);
            }
            Err(e) => log::warn!(
                "Failed to load music {}: {e}. Continuing without music.",
                path.display()
            ),
        }
    }

    /// Starts the loaded track looping forever. No-op if it is already
    /// playing or nothing is loaded.
    pub fn play_music(&mut self) {
        if self.active_music.is_some() {
            return;
        }
        let (Some(manager), Some(data)) = (self.manager.as_mut(), self.music.as_ref()) else {
            return;
        };
        let mut settings = StaticSoundSettings::new().loop_region(0.0..);
        settings.volume = Volume::Amplitude(MUSIC_VOLUME).into();
        match manager.play(data.clone().with_settings(settings)) {
            Ok(handle) => self.active_music = Some(handle),
            Err(e) => log::warn!("Failed to play music: {e}"),
        }
    }

    pub fn stop_music(&mut self) {
        if let Some(mut handle) = self.active_music.take() {
            let _ = handle.stop(Tween {
                duration: Duration::from_millis(200),
                ..Default::default()
            });
        }
    }
}

impl Default for AudioContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AudioContext {
    fn drop(&mut self) {
        self.stop_music();
    }
}
