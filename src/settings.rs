//! Presentation settings and key bindings
//!
//! Nothing here affects the simulation; these values are read by the
//! render description and by the frontend's input sampling.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DARKNESS, INVINCIBILITY_ALPHA, LIGHT, LIGHT_SIZE};

/// Key names bound to each action (frontend translates names to key codes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMap {
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
    pub attack: String,
    pub attack_up: String,
    pub attack_down: String,
    pub attack_left: String,
    pub attack_right: String,
    pub pause: String,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            up: "w".into(),
            down: "s".into(),
            left: "a".into(),
            right: "d".into(),
            attack: "space".into(),
            attack_up: "up".into(),
            attack_down: "down".into(),
            attack_left: "left".into(),
            attack_right: "right".into(),
            pause: "escape".into(),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Lighting ===
    /// Radius of the lit circle around the player
    pub light_size: f32,
    /// Alpha of the darkness overlay outside the light
    pub darkness: u8,
    /// Alpha removed from the darkness inside the light
    pub light: u8,

    // === Invincibility blink ===
    pub invincibility_alpha: u8,

    // === HUD ===
    pub health_bar_pos: (f32, f32),
    pub health_bar_unit_width: f32,
    pub health_bar_height: f32,
    /// Filled segment colour
    pub health_bar_color: [u8; 3],
    /// "About to lose" segment colour
    pub health_bar_warn_color: [u8; 3],

    pub keys: KeyMap,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            light_size: LIGHT_SIZE,
            darkness: DARKNESS,
            light: LIGHT,

            invincibility_alpha: INVINCIBILITY_ALPHA,

            health_bar_pos: (20.0, 20.0),
            health_bar_unit_width: 80.0,
            health_bar_height: 20.0,
            health_bar_color: [0, 100, 0],
            health_bar_warn_color: [100, 0, 0],

            keys: KeyMap::default(),
        }
    }
}

impl Settings {
    /// Alpha cut out of the darkness inside the light circle
    pub fn light_diff(&self) -> u8 {
        self.darkness.saturating_sub(self.light)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_diff() {
        let s = Settings::default();
        assert_eq!(s.light_diff(), 30);
        let s = Settings {
            light: 250,
            ..Default::default()
        };
        assert_eq!(s.light_diff(), 0);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let s = Settings::load("/no/such/settings.json");
        assert_eq!(s.keys, KeyMap::default());
        assert_eq!(s.darkness, DARKNESS);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("ponr_settings_{}.json", std::process::id()));
        let mut s = Settings::default();
        s.keys.attack = "j".into();
        s.light_size = 120.0;
        s.save(&path).unwrap();

        let loaded = Settings::load(&path);
        assert_eq!(loaded.keys.attack, "j");
        assert_eq!(loaded.light_size, 120.0);
        let _ = std::fs::remove_file(path);
    }
}
