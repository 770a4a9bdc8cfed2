//! Spin timing profiles

use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};

/// Timing profile for spin presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast/Turbo mode
    Turbo,
    /// No minimum spin, no cascade (for testing)
    Instant,
    /// Scaled or hand-edited timing
    Custom,
}

impl TimingProfile {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Turbo => "Turbo",
            Self::Instant => "Instant",
            Self::Custom => "Custom",
        }
    }
}

/// Spin timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinTiming {
    /// Profile type
    pub profile: TimingProfile,

    /// Time the reels spin before the automatic cascading stop (ms)
    pub min_spin_duration_ms: f64,

    /// Delay between consecutive reel stops in a cascade (ms)
    pub cascade_step_ms: f64,

    /// Scroll distance covered by one scroll cycle (px)
    pub scroll_distance: f64,

    /// Duration of one scroll cycle (ms)
    pub scroll_cycle_ms: f64,
}

impl SpinTiming {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            min_spin_duration_ms: 3000.0,
            cascade_step_ms: 200.0,
            scroll_distance: 10_000.0,
            scroll_cycle_ms: 3000.0,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            min_spin_duration_ms: 1500.0,
            cascade_step_ms: 100.0,
            scroll_distance: 10_000.0,
            scroll_cycle_ms: 1500.0,
        }
    }

    /// Instant mode: reels stop on the first frame after start
    pub fn instant() -> Self {
        Self {
            profile: TimingProfile::Instant,
            min_spin_duration_ms: 0.0,
            cascade_step_ms: 0.0,
            scroll_distance: 10_000.0,
            scroll_cycle_ms: 3000.0,
        }
    }

    /// Get timing for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Instant => Self::instant(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    ///
    /// Scroll distance is kept, so the scroll speed scales inversely.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            profile: TimingProfile::Custom,
            min_spin_duration_ms: self.min_spin_duration_ms * factor,
            cascade_step_ms: self.cascade_step_ms * factor,
            scroll_distance: self.scroll_distance,
            scroll_cycle_ms: self.scroll_cycle_ms * factor,
        }
    }

    /// Minimum spin duration in seconds
    pub fn min_spin_secs(&self) -> f64 {
        self.min_spin_duration_ms / 1000.0
    }

    /// Cascade step in seconds
    pub fn cascade_step_secs(&self) -> f64 {
        self.cascade_step_ms / 1000.0
    }

    /// Scroll speed in px per second
    pub fn scroll_rate(&self) -> f64 {
        if self.scroll_cycle_ms <= 0.0 {
            return 0.0;
        }
        self.scroll_distance / (self.scroll_cycle_ms / 1000.0)
    }

    /// Stop delay for the reel at `reel_index` (seconds)
    pub fn stop_delay_secs(&self, reel_index: usize, cascade: bool) -> f64 {
        if cascade {
            reel_index as f64 * self.cascade_step_secs()
        } else {
            0.0
        }
    }

    /// Time from stop request until the last of `reel_count` reels settles (seconds)
    pub fn total_stop_duration(&self, reel_count: usize, cascade: bool) -> f64 {
        if reel_count == 0 {
            return 0.0;
        }
        self.stop_delay_secs(reel_count - 1, cascade)
    }

    /// Check that every duration is usable
    pub fn validate(&self) -> ReelResult<()> {
        if !self.min_spin_duration_ms.is_finite() || self.min_spin_duration_ms < 0.0 {
            return Err(ReelError::InvalidConfig(format!(
                "min_spin_duration_ms must be >= 0, got {}",
                self.min_spin_duration_ms
            )));
        }
        if !self.cascade_step_ms.is_finite() || self.cascade_step_ms < 0.0 {
            return Err(ReelError::InvalidConfig(format!(
                "cascade_step_ms must be >= 0, got {}",
                self.cascade_step_ms
            )));
        }
        if !(self.scroll_distance > 0.0 && self.scroll_distance.is_finite()) {
            return Err(ReelError::InvalidConfig(format!(
                "scroll_distance must be > 0, got {}",
                self.scroll_distance
            )));
        }
        if !(self.scroll_cycle_ms > 0.0 && self.scroll_cycle_ms.is_finite()) {
            return Err(ReelError::InvalidConfig(format!(
                "scroll_cycle_ms must be > 0, got {}",
                self.scroll_cycle_ms
            )));
        }
        Ok(())
    }
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self::normal()
    }
}
