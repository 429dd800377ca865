//! Immutable gesture configuration, loaded once at startup.
//!
//! Every threshold used by the classifiers and the trajectory tracker lives
//! here with a tunable default. Distances marked "hand scales" are relative
//! to the wrist to middle-finger-base distance; pixel values refer to the
//! configured frame size.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::gesture::GestureKind;
use crate::output::OutputFormat;

/// Longest accepted cooldown, ten seconds at 30 fps.
pub const MAX_COOLDOWN_FRAMES: u32 = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    pub detection: DetectionConfig,
    pub frame: FrameConfig,
    pub pose: PoseConfig,
    pub fist: FistConfig,
    pub swipe: SwipeConfig,
    pub two_finger_swipe: SwipeConfig,
    pub flip: FlipConfig,
    pub trajectory: TrajectoryConfig,
    pub output: OutputConfig,
    /// Tie-break order between dynamic gestures firing on the same frame.
    pub priority: Vec<GestureKind>,
    /// Frames of a hand after one of its dynamic gestures fires during which a
    /// different dynamic gesture of that hand is not reported. 0 disables.
    pub cross_cooldown_frames: u32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            frame: FrameConfig::default(),
            pose: PoseConfig::default(),
            fist: FistConfig::default(),
            swipe: SwipeConfig::default(),
            two_finger_swipe: SwipeConfig::default(),
            flip: FlipConfig::default(),
            trajectory: TrajectoryConfig::default(),
            output: OutputConfig::default(),
            priority: vec![
                GestureKind::HandClose,
                GestureKind::HandOpen,
                GestureKind::HandSwipe,
                GestureKind::PalmFlip,
                GestureKind::TwoFingerSwipe,
            ],
            cross_cooldown_frames: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionConfig {
    pub max_hands: usize,
    /// Minimum confidence for a hand that is not tracked yet.
    pub detection_confidence: f32,
    /// Minimum confidence for a hand that is already tracked.
    pub min_tracking_confidence: f32,
    /// Consecutive frames a hand may be missing before its state is dropped.
    pub grace_period_frames: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_hands: 2,
            detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            grace_period_frames: 5,
        }
    }
}

/// Pixel size of the frames the landmarks were extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoseConfig {
    /// Fingertip to wrist distance (hand scales) above which a finger counts as extended.
    pub finger_extension_ratio: f32,
    /// Thumb tip to index base distance (hand scales) above which the thumb counts as extended.
    pub thumb_extension_ratio: f32,
    /// Minimum |vertical| wrist to thumb-tip component (hand scales) for thumb up/down.
    pub thumb_vertical_min: f32,
    /// Maximum index to middle fingertip gap (hand scales) for the two-finger posture.
    pub two_finger_gap_max: f32,
    /// Consecutive matching frames before a static pose is reported.
    pub static_confirm_frames: u32,
    /// Consecutive non-matching frames before a reported static pose can fire again.
    pub static_release_frames: u32,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            finger_extension_ratio: 1.3,
            thumb_extension_ratio: 0.6,
            thumb_vertical_min: 0.5,
            two_finger_gap_max: 0.4,
            static_confirm_frames: 3,
            static_release_frames: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FistConfig {
    /// Mean fingertip to palm distance (hand scales) below which the hand is closed.
    pub close_threshold: f32,
    /// Mean fingertip to palm distance (hand scales) above which the hand is open.
    pub open_threshold: f32,
    /// Consecutive frames needed to enter or leave a fist state.
    pub confirm_frames: u32,
    /// Length of the openness window used to require a prior opposite state.
    pub history_frames: usize,
}

impl Default for FistConfig {
    fn default() -> Self {
        Self {
            close_threshold: 0.35,
            open_threshold: 0.9,
            confirm_frames: 3,
            history_frames: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwipeConfig {
    /// Palm-center samples in the sliding window.
    pub window_frames: usize,
    /// Horizontal palm travel across the window (hand scales) that triggers a swipe.
    pub min_displacement: f32,
    pub cooldown_frames: u32,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            window_frames: 6,
            min_displacement: 1.0,
            cooldown_frames: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlipConfig {
    /// Half-width of the dead band around a palm edge-on to the camera.
    pub hysteresis_band: f32,
    /// Maximum palm travel (hand scales) across the window for a flip to count.
    pub max_travel: f32,
    pub window_frames: usize,
    pub cooldown_frames: u32,
    pub require_open_hand: bool,
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            hysteresis_band: 0.3,
            max_travel: 0.5,
            window_frames: 6,
            cooldown_frames: 15,
            require_open_hand: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrajectoryConfig {
    pub enabled: bool,
    /// Consecutive fist-hold frames before a trail is created.
    pub debounce_frames: u32,
    /// Consecutive released frames before a trail is discarded.
    pub clear_frames: u32,
    pub max_trail_points: usize,
    /// Minimum pixel distance from the last trail point for a new one.
    pub movement_threshold: f32,
    /// Minimum frames between two appended trail points.
    pub output_interval_frames: u32,
    /// Weight of the newest sample in the exponential moving average.
    pub ema_smoothing_factor: f32,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_frames: 3,
            clear_frames: 5,
            max_trail_points: 64,
            movement_threshold: 5.0,
            output_interval_frames: 1,
            ema_smoothing_factor: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

impl GestureConfig {
    /// Read, parse and validate a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&contents)?;
        debug!(path = %path.as_ref().display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GestureConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.detection;
        if d.max_hands == 0 {
            return Err(ConfigError::invalid("detection.max_hands", "must be at least 1"));
        }
        unit_interval("detection.detection_confidence", d.detection_confidence)?;
        unit_interval("detection.min_tracking_confidence", d.min_tracking_confidence)?;

        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(ConfigError::invalid("frame", "width and height must be non-zero"));
        }

        let p = &self.pose;
        positive("pose.finger_extension_ratio", p.finger_extension_ratio)?;
        positive("pose.thumb_extension_ratio", p.thumb_extension_ratio)?;
        positive("pose.thumb_vertical_min", p.thumb_vertical_min)?;
        positive("pose.two_finger_gap_max", p.two_finger_gap_max)?;
        at_least_one("pose.static_confirm_frames", p.static_confirm_frames as usize)?;
        at_least_one("pose.static_release_frames", p.static_release_frames as usize)?;

        let f = &self.fist;
        positive("fist.close_threshold", f.close_threshold)?;
        positive("fist.open_threshold", f.open_threshold)?;
        if f.close_threshold >= f.open_threshold {
            return Err(ConfigError::invalid(
                "fist.close_threshold",
                format!(
                    "must be below open_threshold ({} >= {})",
                    f.close_threshold, f.open_threshold
                ),
            ));
        }
        at_least_one("fist.confirm_frames", f.confirm_frames as usize)?;
        at_least_one("fist.history_frames", f.history_frames)?;

        validate_swipe("swipe", &self.swipe)?;
        validate_swipe("two_finger_swipe", &self.two_finger_swipe)?;

        let fl = &self.flip;
        if !(0.0..1.0).contains(&fl.hysteresis_band) {
            return Err(ConfigError::invalid(
                "flip.hysteresis_band",
                format!("must be in [0, 1), got {}", fl.hysteresis_band),
            ));
        }
        positive("flip.max_travel", fl.max_travel)?;
        if fl.window_frames < 2 {
            return Err(ConfigError::invalid("flip.window_frames", "must be at least 2"));
        }

        let t = &self.trajectory;
        at_least_one("trajectory.debounce_frames", t.debounce_frames as usize)?;
        at_least_one("trajectory.clear_frames", t.clear_frames as usize)?;
        at_least_one("trajectory.max_trail_points", t.max_trail_points)?;
        at_least_one("trajectory.output_interval_frames", t.output_interval_frames as usize)?;
        if !(t.movement_threshold.is_finite() && t.movement_threshold >= 0.0) {
            return Err(ConfigError::invalid(
                "trajectory.movement_threshold",
                format!("must be a non-negative number, got {}", t.movement_threshold),
            ));
        }
        if !(t.ema_smoothing_factor > 0.0 && t.ema_smoothing_factor <= 1.0) {
            return Err(ConfigError::invalid(
                "trajectory.ema_smoothing_factor",
                format!("must be in (0, 1], got {}", t.ema_smoothing_factor),
            ));
        }

        cooldown("swipe.cooldown_frames", self.swipe.cooldown_frames)?;
        cooldown("two_finger_swipe.cooldown_frames", self.two_finger_swipe.cooldown_frames)?;
        cooldown("flip.cooldown_frames", fl.cooldown_frames)?;
        cooldown("cross_cooldown_frames", self.cross_cooldown_frames)?;

        let mut seen = HashSet::new();
        for kind in &self.priority {
            if !kind.is_dynamic() {
                return Err(ConfigError::invalid(
                    "priority",
                    format!("{kind} is a static gesture"),
                ));
            }
            if !seen.insert(*kind) {
                return Err(ConfigError::invalid("priority", format!("{kind} listed twice")));
            }
        }

        Ok(())
    }
}

fn validate_swipe(section: &'static str, s: &SwipeConfig) -> Result<(), ConfigError> {
    if s.window_frames < 2 {
        return Err(ConfigError::invalid(section, "window_frames must be at least 2"));
    }
    if !(s.min_displacement.is_finite() && s.min_displacement > 0.0) {
        return Err(ConfigError::invalid(
            section,
            format!("min_displacement must be positive, got {}", s.min_displacement),
        ));
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {value}")))
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be in [0, 1], got {value}")))
    }
}

fn cooldown(field: &'static str, frames: u32) -> Result<(), ConfigError> {
    if frames <= MAX_COOLDOWN_FRAMES {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be at most {MAX_COOLDOWN_FRAMES} frames, got {frames}"),
        ))
    }
}

fn at_least_one(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be at least 1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GestureConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_trail_capacity_rejected() {
        let mut config = GestureConfig::default();
        config.trajectory.max_trail_points = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "trajectory.max_trail_points",
                ..
            }
        ));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut config = GestureConfig::default();
        config.pose.finger_extension_ratio = -1.0;
        assert!(config.validate().is_err());

        let mut config = GestureConfig::default();
        config.trajectory.movement_threshold = -0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_fist_thresholds_rejected() {
        let mut config = GestureConfig::default();
        config.fist.close_threshold = 1.0;
        config.fist.open_threshold = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_priority_must_be_unique_dynamic_kinds() {
        let mut config = GestureConfig::default();
        config.priority = vec![GestureKind::HandSwipe, GestureKind::HandSwipe];
        assert!(config.validate().is_err());

        config.priority = vec![GestureKind::FingerCountOne];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cooldowns_are_bounded() {
        let mut config = GestureConfig::default();
        config.cross_cooldown_frames = 0;
        assert!(config.validate().is_ok());

        config.cross_cooldown_frames = MAX_COOLDOWN_FRAMES + 1;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "cross_cooldown_frames",
                ..
            }
        ));

        let mut config = GestureConfig::default();
        config.flip.cooldown_frames = 1_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_overrides_keep_defaults() {
        let yaml = "
trajectory:
  max_trail_points: 8
  movement_threshold: 2.5
output:
  format: json
priority: [hand_swipe, hand_close]
cross_cooldown_frames: 8
";
        let config = GestureConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.trajectory.max_trail_points, 8);
        assert_eq!(config.trajectory.movement_threshold, 2.5);
        assert_eq!(config.trajectory.clear_frames, 5);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.priority, vec![GestureKind::HandSwipe, GestureKind::HandClose]);
        assert_eq!(config.cross_cooldown_frames, 8);
        assert_eq!(config.fist, FistConfig::default());
    }

    #[test]
    fn test_yaml_invalid_value_fails_fast() {
        let err = GestureConfig::from_yaml_str("trajectory:\n  ema_smoothing_factor: 0.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = GestureConfig::from_yaml_str("detection:\n  grace_period_frames: -3\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = GestureConfig::from_yaml_str("fist:\n  close_treshold: 0.2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
