use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LoopError, LoopResult};

const LOCAL_CONFIG: &str = "vidloop.toml";

/// Tunables for the loop player. Every field has a default, so a partial
/// TOML file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Period of the main-thread driver that consumes restart requests.
    pub poll_interval_ms: u64,
    pub initial_volume: i32,
    pub volume_max: i32,
    pub volume_step: i32,
    pub rate_min: f64,
    pub rate_max: f64,
    pub rate_step: f64,
    /// Maximum value of the seek bar; its minimum is always 0.
    pub seek_bar_resolution: u32,
    /// Media length reported by the clock engine, which cannot inspect files.
    pub clock_duration_ms: u64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            initial_volume: 30,
            volume_max: 40,
            volume_step: 1,
            rate_min: 0.2,
            rate_max: 2.0,
            rate_step: 0.1,
            seek_bar_resolution: 10_000,
            clock_duration_ms: 600_000,
        }
    }
}

impl PlayerSettings {
    /// Loads settings from `path`, or from `vidloop.toml` in the working
    /// directory, or from the user config directory. Missing files mean
    /// defaults.
    pub fn load(path: Option<&Path>) -> LoopResult<Self> {
        if let Some(path) = path {
            return Self::load_file(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG);
        if local.is_file() {
            return Self::load_file(&local);
        }

        if let Some(user) = Self::user_config_path() {
            if user.is_file() {
                return Self::load_file(&user);
            }
        }

        Ok(Self::default())
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vidloop").join("config.toml"))
    }

    pub fn load_file(path: &Path) -> LoopResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content).map_err(|source| LoopError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate(path)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Rejects values the player cannot work with. `path` only names the
    /// origin in the error.
    pub fn validate(&self, path: &Path) -> LoopResult<()> {
        let invalid = |field: &'static str, reason: String| LoopError::InvalidSetting {
            path: path.to_path_buf(),
            field,
            reason,
        };

        if self.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms", "must be at least 1".to_string()));
        }
        if self.volume_max < 0 {
            return Err(invalid(
                "volume_max",
                format!("{} is below 0", self.volume_max),
            ));
        }
        if !(0..=self.volume_max).contains(&self.initial_volume) {
            return Err(invalid(
                "initial_volume",
                format!("{} is outside 0..={}", self.initial_volume, self.volume_max),
            ));
        }
        if self.volume_step < 1 {
            return Err(invalid("volume_step", "must be at least 1".to_string()));
        }
        if !self.rate_min.is_finite() || self.rate_min <= 0.0 {
            return Err(invalid(
                "rate_min",
                format!("{} is not a positive rate", self.rate_min),
            ));
        }
        if !self.rate_max.is_finite() || self.rate_max < self.rate_min {
            return Err(invalid(
                "rate_max",
                format!("{} is below rate_min {}", self.rate_max, self.rate_min),
            ));
        }
        if !self.rate_step.is_finite() || self.rate_step <= 0.0 {
            return Err(invalid(
                "rate_step",
                format!("{} is not a positive step", self.rate_step),
            ));
        }
        if self.seek_bar_resolution == 0 {
            return Err(invalid("seek_bar_resolution", "must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_keep_the_low_volume_ceiling() {
        let settings = PlayerSettings::default();
        assert_eq!(settings.poll_interval_ms, 100);
        assert_eq!(settings.volume_max, 40);
        assert_eq!(settings.rate_min, 0.2);
        assert_eq!(settings.rate_max, 2.0);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "poll_interval_ms = 50\nvolume_max = 80").unwrap();

        let settings = PlayerSettings::load(Some(file.path())).unwrap();
        assert_eq!(settings.poll_interval_ms, 50);
        assert_eq!(settings.volume_max, 80);
        assert_eq!(settings.rate_step, 0.1);
    }

    #[test]
    fn unparsable_file_is_a_config_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "poll_interval_ms = \"fast\"").unwrap();

        let err = PlayerSettings::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, LoopError::Config { .. }));
    }

    fn rejected_field(toml: &str) -> &'static str {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "{}", toml).unwrap();
        match PlayerSettings::load(Some(file.path())) {
            Err(LoopError::InvalidSetting { field, .. }) => field,
            other => panic!("expected an invalid setting, got {:?}", other),
        }
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let cases = [
            ("poll_interval_ms = 0", "poll_interval_ms"),
            ("volume_max = -1\nrate_min = 3.0", "volume_max"),
            ("volume_max = 20\ninitial_volume = 30", "initial_volume"),
            ("initial_volume = -3", "initial_volume"),
            ("volume_step = 0", "volume_step"),
            ("rate_min = 0.0", "rate_min"),
            ("rate_min = 3.0", "rate_max"),
            ("rate_max = inf", "rate_max"),
            ("rate_step = -0.1", "rate_step"),
            ("seek_bar_resolution = 0", "seek_bar_resolution"),
        ];
        for (toml, field) in cases {
            assert_eq!(rejected_field(toml), field, "for `{}`", toml);
        }
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(
            PlayerSettings::default()
                .validate(Path::new("defaults"))
                .is_ok()
        );
    }
}
