use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AnimationSettings {
    pub(crate) default_frame_rate: u64,
    pub(crate) walking_frame_rate: u64,
    pub(crate) dancing_frame_rate: u64,
    pub(crate) sitting_frame_rate: u64,
    pub(crate) lying_frame_rate: u64,
    pub(crate) nod_frame_rate: u64,
    pub(crate) meme_frame_rate: u64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            default_frame_rate: 150,
            walking_frame_rate: 120,
            dancing_frame_rate: 90,
            sitting_frame_rate: 200,
            lying_frame_rate: 200,
            nod_frame_rate: 150,
            meme_frame_rate: 150,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct BehaviorSettings {
    pub(crate) mouse_follow_update_rate: u64,
    pub(crate) mouse_proximity_threshold: f32,
    pub(crate) mouse_idle_threshold: u64,
    pub(crate) reaction_probability: f32,
    pub(crate) proximity_check_interval: u64,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            mouse_follow_update_rate: 50,
            mouse_proximity_threshold: 100.0,
            mouse_idle_threshold: 5000,
            reaction_probability: 0.3,
            proximity_check_interval: 1000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct WindowSettings {
    pub(crate) initial_x: i32,
    pub(crate) initial_y: i32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            initial_x: 100,
            initial_y: 100,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SizeSettings {
    pub(crate) current_scale: f32,
    pub(crate) available_scales: Vec<f32>,
    pub(crate) scale_names: Vec<String>,
}

impl Default for SizeSettings {
    fn default() -> Self {
        Self {
            current_scale: 1.0,
            available_scales: vec![1.0, 1.5, 2.0, 2.5, 3.0, 5.0, 50.0],
            scale_names: [
                "Normal",
                "Large",
                "Extra Large",
                "Huge",
                "Giant",
                "Extra Giant",
                "Screen",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl SizeSettings {
    pub(crate) fn name_of(&self, scale: f32) -> &str {
        self.available_scales
            .iter()
            .position(|s| (*s - scale).abs() < f32::EPSILON)
            .and_then(|i| self.scale_names.get(i))
            .map(String::as_str)
            .unwrap_or("Custom")
    }

    pub(crate) fn current_name(&self) -> &str {
        self.name_of(self.current_scale)
    }

    pub(crate) fn choices(&self) -> impl Iterator<Item = (f32, &str)> {
        self.available_scales
            .iter()
            .copied()
            .zip(self.scale_names.iter().map(String::as_str))
    }
}

/// Which automatic behaviours the mascot may pick while the user is away.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AfkBehaviorSettings {
    pub(crate) afk_mode_enabled: bool,
    pub(crate) enable_walking: bool,
    pub(crate) enable_sitting: bool,
    pub(crate) enable_dancing: bool,
    pub(crate) enable_character_interactions: bool,
    pub(crate) enable_sleeping: bool,
    pub(crate) enable_falling: bool,
    pub(crate) enable_cart_rides: bool,
    pub(crate) enable_mouse_following: bool,
    pub(crate) enable_minigames: bool,
    pub(crate) enable_whale_mail: bool,
}

impl Default for AfkBehaviorSettings {
    fn default() -> Self {
        Self {
            afk_mode_enabled: true,
            enable_walking: true,
            enable_sitting: true,
            enable_dancing: true,
            enable_character_interactions: true,
            enable_sleeping: true,
            enable_falling: true,
            enable_cart_rides: true,
            enable_mouse_following: true,
            enable_minigames: true,
            enable_whale_mail: true,
        }
    }
}

impl AfkBehaviorSettings {
    pub(crate) const KEYS: [&'static str; 11] = [
        "afk_mode_enabled",
        "enable_walking",
        "enable_sitting",
        "enable_dancing",
        "enable_character_interactions",
        "enable_sleeping",
        "enable_falling",
        "enable_cart_rides",
        "enable_mouse_following",
        "enable_minigames",
        "enable_whale_mail",
    ];

    pub(crate) fn get(&self, key: &str) -> Option<bool> {
        Some(match key {
            "afk_mode_enabled" => self.afk_mode_enabled,
            "enable_walking" => self.enable_walking,
            "enable_sitting" => self.enable_sitting,
            "enable_dancing" => self.enable_dancing,
            "enable_character_interactions" => self.enable_character_interactions,
            "enable_sleeping" => self.enable_sleeping,
            "enable_falling" => self.enable_falling,
            "enable_cart_rides" => self.enable_cart_rides,
            "enable_mouse_following" => self.enable_mouse_following,
            "enable_minigames" => self.enable_minigames,
            "enable_whale_mail" => self.enable_whale_mail,
            _ => return None,
        })
    }

    /// Returns false for unknown keys.
    pub(crate) fn set(&mut self, key: &str, value: bool) -> bool {
        let slot = match key {
            "afk_mode_enabled" => &mut self.afk_mode_enabled,
            "enable_walking" => &mut self.enable_walking,
            "enable_sitting" => &mut self.enable_sitting,
            "enable_dancing" => &mut self.enable_dancing,
            "enable_character_interactions" => &mut self.enable_character_interactions,
            "enable_sleeping" => &mut self.enable_sleeping,
            "enable_falling" => &mut self.enable_falling,
            "enable_cart_rides" => &mut self.enable_cart_rides,
            "enable_mouse_following" => &mut self.enable_mouse_following,
            "enable_minigames" => &mut self.enable_minigames,
            "enable_whale_mail" => &mut self.enable_whale_mail,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Overlays the keys present in a toggle file onto `self`.
    pub(crate) fn merge(&mut self, patch: &BTreeMap<String, serde_json::Value>) {
        for (key, value) in patch {
            match value.as_bool() {
                Some(v) if self.set(key, v) => {}
                Some(_) => tracing::debug!(key = %key, "ignoring unknown AFK toggle"),
                None => tracing::warn!(key = %key, "AFK toggle is not a boolean"),
            }
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct MemeSettings {
    pub(crate) enabled: bool,
    pub(crate) url: String,
    pub(crate) timeout_secs: u64,
}

impl Default for MemeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://meme-api.com/gimme/Undertale".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct RenderSettings {
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fps_cap: 30,
            enable_color: true,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) animation: AnimationSettings,
    pub(crate) behavior: BehaviorSettings,
    pub(crate) window: WindowSettings,
    pub(crate) size: SizeSettings,
    pub(crate) afk_behavior: AfkBehaviorSettings,
    pub(crate) meme: MemeSettings,
    pub(crate) render: RenderSettings,
    pub(crate) seed: u64,
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) afk_settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "termascot", "Termascot")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    // A toggle file next to the working directory wins, like a portable install.
    let local_afk = PathBuf::from("afk_behavior_settings.json");
    let afk_settings_path = if local_afk.exists() {
        local_afk
    } else {
        dir.join("afk_behavior_settings.json")
    };

    Ok(Paths {
        settings_path: dir.join("settings.json"),
        afk_settings_path,
        log_path: dir.join("termascot.log"),
    })
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(s) => match serde_json::from_str::<Settings>(&s) {
            Ok(v) => return v,
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "bad settings file, using defaults"),
        },
        Err(_) => tracing::info!(path = %path.display(), "no settings file, using defaults"),
    }
    Settings::default()
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let data = serde_json::to_vec_pretty(s)?;
    write_atomic(path, &data)
}

/// Applies an `afk_behavior_settings.json` file on top of `afk`.
pub(crate) fn load_afk_toggles(path: &Path, afk: &mut AfkBehaviorSettings) {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(_) => {
            tracing::info!(path = %path.display(), "AFK behavior settings file not found, using defaults");
            return;
        }
    };
    match serde_json::from_str::<BTreeMap<String, serde_json::Value>>(&text) {
        Ok(patch) => {
            afk.merge(&patch);
            tracing::info!(path = %path.display(), "AFK behavior settings loaded");
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "error decoding AFK behavior settings");
        }
    }
}

pub(crate) fn save_afk_toggles(path: &Path, afk: &AfkBehaviorSettings) -> Result<()> {
    let data = serde_json::to_vec_pretty(afk)?;
    write_atomic(path, &data)
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

pub(crate) fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // Best-effort atomic replace on same filesystem.
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_defaults() {
        let s: Settings =
            serde_json::from_str(r#"{"size": {"current_scale": 2.0}, "seed": 9}"#).unwrap();
        assert_eq!(s.size.current_scale, 2.0);
        assert_eq!(s.size.available_scales.len(), 7);
        assert_eq!(s.animation.walking_frame_rate, 120);
        assert_eq!(s.seed, 9);
    }

    #[test]
    fn size_names() {
        let mut size = SizeSettings::default();
        assert_eq!(size.current_name(), "Normal");
        size.current_scale = 2.5;
        assert_eq!(size.current_name(), "Huge");
        size.current_scale = 0.7;
        assert_eq!(size.current_name(), "Custom");
    }

    #[test]
    fn afk_file_merges_present_keys_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("afk_behavior_settings.json");
        fs::write(
            &path,
            r#"{"enable_walking": false, "enable_whale_mail": false, "bogus": true}"#,
        )
        .unwrap();

        let mut afk = AfkBehaviorSettings::default();
        load_afk_toggles(&path, &mut afk);
        assert!(!afk.enable_walking);
        assert!(!afk.enable_whale_mail);
        assert!(afk.enable_sitting);
        assert!(afk.afk_mode_enabled);
    }

    #[test]
    fn broken_afk_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("afk.json");
        fs::write(&path, "{ not json").unwrap();
        let mut afk = AfkBehaviorSettings::default();
        load_afk_toggles(&path, &mut afk);
        assert_eq!(afk, AfkBehaviorSettings::default());

        load_afk_toggles(&dir.path().join("missing.json"), &mut afk);
        assert_eq!(afk, AfkBehaviorSettings::default());
    }

    #[test]
    fn afk_toggles_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("afk.json");
        let mut afk = AfkBehaviorSettings::default();
        afk.enable_falling = false;
        save_afk_toggles(&path, &afk).unwrap();

        let mut loaded = AfkBehaviorSettings::default();
        load_afk_toggles(&path, &mut loaded);
        assert_eq!(loaded, afk);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn every_key_is_addressable() {
        let mut afk = AfkBehaviorSettings::default();
        for key in AfkBehaviorSettings::KEYS {
            assert!(afk.set(key, false));
            assert_eq!(afk.get(key), Some(false));
        }
        assert!(!afk.set("nope", true));
    }
}
