//! Game configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};
use crate::render::Rect;
use crate::timing::SpinTiming;

/// Maximum number of reels a game may have
pub const MAX_REELS: usize = 16;

/// Reel placement in game coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelLayout {
    /// Number of reels (columns)
    pub reel_count: usize,
    /// Width of one reel window
    pub reel_width: f64,
    /// Height of one reel window (three symbols tall)
    pub reel_height: f64,
    /// Horizontal distance between the left edges of neighbouring reels
    pub reel_spacing: f64,
    /// Left edge of the first reel
    pub origin_x: f64,
    /// Top edge of every reel
    pub origin_y: f64,
}

impl ReelLayout {
    /// Standard 5-reel landscape layout
    pub fn standard_5() -> Self {
        Self {
            reel_count: 5,
            reel_width: 220.0,
            reel_height: 810.0,
            reel_spacing: 300.0,
            origin_x: 20.0,
            origin_y: 150.0,
        }
    }

    /// Window of the reel at `index`
    pub fn reel_bounds(&self, index: usize) -> Rect {
        Rect::new(
            self.origin_x + index as f64 * self.reel_spacing,
            self.origin_y,
            self.reel_width,
            self.reel_height,
        )
    }

    /// Height of one symbol slot
    pub fn slot_height(&self) -> f64 {
        self.reel_height / crate::reel::SLOTS_PER_REEL as f64
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.reel_count == 0 || self.reel_count > MAX_REELS {
            return Err(ReelError::InvalidConfig(format!(
                "reel_count must be in 1..={}, got {}",
                MAX_REELS, self.reel_count
            )));
        }
        if !(self.reel_width > 0.0 && self.reel_width.is_finite()) {
            return Err(ReelError::InvalidConfig(format!(
                "reel_width must be > 0, got {}",
                self.reel_width
            )));
        }
        if !(self.reel_height > 0.0 && self.reel_height.is_finite()) {
            return Err(ReelError::InvalidConfig(format!(
                "reel_height must be > 0, got {}",
                self.reel_height
            )));
        }
        Ok(())
    }
}

impl Default for ReelLayout {
    fn default() -> Self {
        Self::standard_5()
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Reel placement
    pub layout: ReelLayout,
    /// Spin timing
    pub timing: SpinTiming,
    /// RNG seed (None = seeded from the OS)
    pub seed: Option<u64>,
}

impl GameConfig {
    /// Parse from JSON
    pub fn from_json_str(json: &str) -> ReelResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from YAML
    pub fn from_yaml_str(yaml: &str) -> ReelResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file; `.yaml`/`.yml` are read as YAML, anything else as JSON
    pub fn load(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        log::debug!("Loading game config from {:?}", path);
        if is_yaml {
            Self::from_yaml_str(&text)
        } else {
            Self::from_json_str(&text)
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> ReelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builder: replace timing
    pub fn with_timing(mut self, timing: SpinTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Builder: fix the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> ReelResult<()> {
        self.layout.validate()?;
        self.timing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::TimingProfile;
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn test_default_layout() {
        let layout = ReelLayout::default();
        assert_eq!(layout.reel_count, 5);
        assert_relative_eq!(layout.slot_height(), 270.0);

        let third = layout.reel_bounds(2);
        assert_relative_eq!(third.x, 620.0);
        assert_relative_eq!(third.y, 150.0);
        assert_relative_eq!(third.height, 810.0);
    }

    #[test]
    fn test_layout_validation() {
        let mut layout = ReelLayout::default();
        layout.reel_count = 0;
        assert!(layout.validate().is_err());

        let mut layout = ReelLayout::default();
        layout.reel_height = -5.0;
        assert!(layout.validate().is_err());

        let mut layout = ReelLayout::default();
        layout.reel_count = MAX_REELS + 1;
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json_str(
            r#"{ "layout": { "reel_count": 3 }, "timing": { "profile": "turbo", "cascade_step_ms": 50.0 }, "seed": 7 }"#,
        )
        .unwrap();

        assert_eq!(config.layout.reel_count, 3);
        assert_relative_eq!(config.layout.reel_width, 220.0);
        assert_eq!(config.timing.profile, TimingProfile::Turbo);
        assert_relative_eq!(config.timing.cascade_step_ms, 50.0);
        assert_relative_eq!(config.timing.min_spin_duration_ms, 3000.0);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_json_rejects_invalid_values() {
        let result = GameConfig::from_json_str(r#"{ "layout": { "reel_count": 0 } }"#);
        assert!(matches!(result, Err(ReelError::InvalidConfig(_))));

        let result = GameConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ReelError::Json(_))));
    }

    #[test]
    fn test_yaml_config() {
        let yaml = "layout:\n  reel_count: 4\ntiming:\n  min_spin_duration_ms: 1000.0\n";
        let config = GameConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.layout.reel_count, 4);
        assert_relative_eq!(config.timing.min_spin_secs(), 1.0);
    }

    #[test]
    fn test_load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("game.yml");
        let mut file = std::fs::File::create(&yaml_path).unwrap();
        writeln!(file, "seed: 42").unwrap();
        assert_eq!(GameConfig::load(&yaml_path).unwrap().seed, Some(42));

        let json_path = dir.path().join("game.json");
        let json = GameConfig::default().with_seed(9).to_json().unwrap();
        std::fs::write(&json_path, json).unwrap();
        assert_eq!(GameConfig::load(&json_path).unwrap().seed, Some(9));

        let missing = dir.path().join("missing.json");
        assert!(matches!(GameConfig::load(&missing), Err(ReelError::Io(_))));
    }
}
