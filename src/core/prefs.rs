use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::StoreError;
use crate::core::storage::Storage;

pub const SOUND_KEY: &str = "sound";
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// The three cues games can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Click,
    Win,
    Lose,
}

/// Best-effort sound output shared by the shell and the running game.
/// Games only record a cue; the shell decides how (and whether) to play it.
#[derive(Debug, Clone)]
pub struct Sound {
    enabled: Rc<Cell<bool>>,
    pending: Rc<Cell<Option<Tone>>>,
}

impl Sound {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Rc::new(Cell::new(enabled)),
            pending: Rc::new(Cell::new(None)),
        }
    }

    pub fn beep(&self, tone: Tone) {
        if self.enabled.get() {
            self.pending.set(Some(tone));
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
        if !enabled {
            self.pending.set(None);
        }
    }

    /// Takes the cue recorded since the last call, if any.
    pub fn take_pending(&self) -> Option<Tone> {
        self.pending.take()
    }
}

impl Default for Sound {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Persisted shell preferences (`sound`, `theme`).
#[derive(Debug, Clone)]
pub struct Preferences {
    storage: Storage,
    sound: bool,
    theme: Theme,
}

impl Preferences {
    pub fn load(storage: Storage) -> Self {
        let sound = storage.load(SOUND_KEY).unwrap_or(true);
        let theme = storage.load(THEME_KEY).unwrap_or_default();
        Self { storage, sound, theme }
    }

    pub fn sound(&self) -> bool {
        self.sound
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_sound(&mut self, on: bool) -> Result<(), StoreError> {
        self.sound = on;
        self.storage.store(SOUND_KEY, &on)
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), StoreError> {
        self.theme = theme;
        self.storage.store(THEME_KEY, &theme)
    }

    /// Flips the sound flag and applies it to `sound`; a failed write is
    /// logged, the in-memory flag still changes.
    pub fn toggle_sound(&mut self, sound: &Sound) {
        let on = !self.sound;
        if let Err(e) = self.set_sound(on) {
            warn!(error = %e, "failed to persist sound preference");
        }
        sound.set_enabled(on);
    }

    pub fn toggle_theme(&mut self) {
        if let Err(e) = self.set_theme(self.theme.toggled()) {
            warn!(error = %e, "failed to persist theme preference");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_stored() {
        let prefs = Preferences::load(Storage::in_memory());
        assert!(prefs.sound());
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn settings_persist_as_json() {
        let storage = Storage::in_memory();
        let mut prefs = Preferences::load(storage.clone());
        prefs.set_sound(false).unwrap();
        prefs.set_theme(Theme::Dark).unwrap();

        assert_eq!(storage.load::<String>(THEME_KEY).as_deref(), Some("dark"));
        let reloaded = Preferences::load(storage);
        assert!(!reloaded.sound());
        assert_eq!(reloaded.theme(), Theme::Dark);
    }

    #[test]
    fn muted_sound_drops_cues() {
        let sound = Sound::new(true);
        sound.beep(Tone::Win);
        assert_eq!(sound.take_pending(), Some(Tone::Win));
        assert_eq!(sound.take_pending(), None);

        let mut prefs = Preferences::load(Storage::in_memory());
        prefs.toggle_sound(&sound);
        sound.beep(Tone::Click);
        assert_eq!(sound.take_pending(), None);
        assert!(!prefs.sound());
    }
}
