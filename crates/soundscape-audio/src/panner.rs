//! 3D positional panning.
//!
//! Distance attenuation and cone gain follow the Web Audio panner model.
//! Direction is reduced to a stereo pan from the source azimuth relative
//! to the listener. The binaural model adds an interaural time delay on
//! the far ear.

use crate::param::Vec3Param;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use soundscape_core::ListenerPose;
use std::f32::consts::PI;

/// Head radius in meters (world units).
const HEAD_RADIUS: f32 = 0.0875;

/// Speed of sound in meters per second.
const SPEED_OF_SOUND: f32 = 343.0;

/// Largest interaural delay the binaural model produces, in seconds.
pub const MAX_INTERAURAL_DELAY: f32 = HEAD_RADIUS / SPEED_OF_SOUND * (PI / 2.0 + 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanningModel {
    /// Level difference only.
    EqualPower,
    /// Level difference plus interaural time delay.
    #[default]
    Binaural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceModel {
    Linear,
    #[default]
    Inverse,
    Exponential,
}

/// Panner settings shared by every spatialized voice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PannerConfig {
    pub panning_model: PanningModel,
    pub distance_model: DistanceModel,
    pub ref_distance: f32,
    pub max_distance: f32,
    pub rolloff_factor: f32,
    /// Inner cone angle in degrees.
    pub cone_inner_angle: f32,
    /// Outer cone angle in degrees.
    pub cone_outer_angle: f32,
    pub cone_outer_gain: f32,
}

impl Default for PannerConfig {
    fn default() -> Self {
        Self {
            panning_model: PanningModel::Binaural,
            distance_model: DistanceModel::Inverse,
            ref_distance: 3.0,
            max_distance: 60.0,
            rolloff_factor: 0.5,
            cone_inner_angle: 360.0,
            cone_outer_angle: 360.0,
            cone_outer_gain: 0.0,
        }
    }
}

impl PannerConfig {
    /// Attenuation for a source `distance` units from the listener.
    ///
    /// Distance is clamped to `[ref_distance, max_distance]`.
    pub fn distance_gain(&self, distance: f32) -> f32 {
        let ref_d = self.ref_distance.max(f32::EPSILON);
        let max_d = self.max_distance.max(ref_d);
        let d = distance.clamp(ref_d, max_d);
        let rolloff = self.rolloff_factor.max(0.0);

        let gain = match self.distance_model {
            DistanceModel::Linear => {
                if max_d > ref_d {
                    1.0 - rolloff.min(1.0) * (d - ref_d) / (max_d - ref_d)
                } else {
                    1.0
                }
            }
            DistanceModel::Inverse => ref_d / (ref_d + rolloff * (d - ref_d)),
            DistanceModel::Exponential => (d / ref_d).powf(-rolloff),
        };
        gain.clamp(0.0, 1.0)
    }

    /// Attenuation from the source's radiation cone. Omnidirectional when
    /// both cone angles cover the full circle or the source has no
    /// orientation.
    pub fn cone_gain(&self, source: Vec3, orientation: Vec3, listener: Vec3) -> f32 {
        if self.cone_inner_angle >= 360.0 && self.cone_outer_angle >= 360.0 {
            return 1.0;
        }
        let facing = orientation.normalize_or_zero();
        let to_listener = (listener - source).normalize_or_zero();
        if facing == Vec3::ZERO || to_listener == Vec3::ZERO {
            return 1.0;
        }

        let angle = facing.dot(to_listener).clamp(-1.0, 1.0).acos().to_degrees();
        let inner = self.cone_inner_angle * 0.5;
        let outer = (self.cone_outer_angle * 0.5).max(inner);

        if angle <= inner {
            1.0
        } else if angle >= outer {
            self.cone_outer_gain
        } else {
            let t = (angle - inner) / (outer - inner);
            1.0 + (self.cone_outer_gain - 1.0) * t
        }
    }
}

/// Per-ear gain and delay for one spatialized voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialGains {
    pub left: f32,
    pub right: f32,
    /// Left ear delay in seconds.
    pub delay_left: f32,
    /// Right ear delay in seconds.
    pub delay_right: f32,
}

impl SpatialGains {
    /// Unpanned, unattenuated stereo.
    pub const UNITY: Self = Self {
        left: 1.0,
        right: 1.0,
        delay_left: 0.0,
        delay_right: 0.0,
    };
}

/// Stereo pan in [-1, 1] for a source relative to the listener.
pub fn pan_for(listener: &ListenerPose, source: Vec3) -> f32 {
    let rel = source - listener.position;
    if rel.length_squared() < 1e-12 {
        return 0.0;
    }
    let right = listener.right();
    let forward = listener.forward.normalize_or_zero();
    let azimuth = rel.dot(right).atan2(rel.dot(forward));
    azimuth.sin().clamp(-1.0, 1.0)
}

/// Compute ear gains and delays for a source.
pub fn spatialize(
    config: &PannerConfig,
    listener: &ListenerPose,
    source: Vec3,
    orientation: Vec3,
) -> SpatialGains {
    let distance = source.distance(listener.position);
    let gain = config.distance_gain(distance)
        * config.cone_gain(source, orientation, listener.position);
    let pan = pan_for(listener, source);

    // Equal-power curve
    let angle = (pan + 1.0) * 0.25 * PI;
    let left = gain * angle.cos();
    let right = gain * angle.sin();

    let (delay_left, delay_right) = match config.panning_model {
        PanningModel::EqualPower => (0.0, 0.0),
        PanningModel::Binaural => {
            // Woodworth spherical head model
            let theta = pan.abs().asin();
            let itd = HEAD_RADIUS / SPEED_OF_SOUND * (theta + theta.sin());
            if pan > 0.0 {
                (itd, 0.0)
            } else {
                (0.0, itd)
            }
        }
    };

    SpatialGains {
        left,
        right,
        delay_left,
        delay_right,
    }
}

/// Positional stage of an ambience voice. Position and orientation are
/// written by the controller and read by the mixer every block.
#[derive(Debug)]
pub struct PannerNode {
    pub config: PannerConfig,
    pub position: Vec3Param,
    pub orientation: Vec3Param,
}

impl PannerNode {
    pub fn new(config: PannerConfig, position: Vec3) -> Self {
        Self {
            config,
            position: Vec3Param::new(position),
            orientation: Vec3Param::new(Vec3::X),
        }
    }

    pub fn gains(&self, listener: &ListenerPose) -> SpatialGains {
        spatialize(
            &self.config,
            listener,
            self.position.get(),
            self.orientation.get(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_inverse_distance() {
        let c = PannerConfig::default();
        assert!(approx(c.distance_gain(0.5), 1.0));
        assert!(approx(c.distance_gain(3.0), 1.0));
        // 3 / (3 + 0.5 * 3)
        assert!(approx(c.distance_gain(6.0), 2.0 / 3.0));
        assert!(approx(c.distance_gain(500.0), c.distance_gain(60.0)));
    }

    #[test]
    fn test_linear_and_exponential() {
        let linear = PannerConfig {
            distance_model: DistanceModel::Linear,
            rolloff_factor: 1.0,
            ..Default::default()
        };
        assert!(approx(linear.distance_gain(60.0), 0.0));
        assert!(approx(linear.distance_gain(31.5), 0.5));

        let exp = PannerConfig {
            distance_model: DistanceModel::Exponential,
            rolloff_factor: 1.0,
            ..Default::default()
        };
        assert!(approx(exp.distance_gain(6.0), 0.5));
    }

    #[test]
    fn test_omnidirectional_cone() {
        let c = PannerConfig::default();
        let g = c.cone_gain(Vec3::ZERO, Vec3::X, Vec3::new(-10.0, 0.0, 0.0));
        assert_eq!(g, 1.0);
    }

    #[test]
    fn test_directional_cone() {
        let c = PannerConfig {
            cone_inner_angle: 90.0,
            cone_outer_angle: 180.0,
            cone_outer_gain: 0.25,
            ..Default::default()
        };
        assert_eq!(c.cone_gain(Vec3::ZERO, Vec3::X, Vec3::new(5.0, 0.0, 0.0)), 1.0);
        assert!(approx(
            c.cone_gain(Vec3::ZERO, Vec3::X, Vec3::new(-5.0, 0.0, 0.0)),
            0.25
        ));
    }

    #[test]
    fn test_left_source_is_louder_on_left() {
        let pose = ListenerPose::DEFAULT;
        let g = spatialize(
            &PannerConfig::default(),
            &pose,
            Vec3::new(-5.0, 1.6, 5.0),
            Vec3::X,
        );
        assert!(g.left > g.right);
        assert!(g.right > 0.0);
        // Sound reaches the left ear first
        assert_eq!(g.delay_left, 0.0);
        assert!(g.delay_right > 0.0);
    }

    #[test]
    fn test_centered_source() {
        let pose = ListenerPose::DEFAULT;
        let g = spatialize(
            &PannerConfig::default(),
            &pose,
            Vec3::new(0.0, 1.6, 0.0),
            Vec3::X,
        );
        assert!(approx(g.left, g.right));
        assert_eq!(g.delay_left, g.delay_right);
    }

    #[test]
    fn test_interaural_delay_bound() {
        let pose = ListenerPose::DEFAULT;
        let g = spatialize(
            &PannerConfig::default(),
            &pose,
            Vec3::new(20.0, 1.6, 12.0),
            Vec3::X,
        );
        assert!(g.delay_left > 0.0);
        assert!(g.delay_left <= MAX_INTERAURAL_DELAY + 1e-7);
        assert!(MAX_INTERAURAL_DELAY < 0.00066);
    }

    #[test]
    fn test_equal_power_has_no_delay() {
        let config = PannerConfig {
            panning_model: PanningModel::EqualPower,
            ..Default::default()
        };
        let g = spatialize(
            &config,
            &ListenerPose::DEFAULT,
            Vec3::new(5.0, 1.6, 12.0),
            Vec3::X,
        );
        assert_eq!((g.delay_left, g.delay_right), (0.0, 0.0));
        assert!(g.right > g.left);
    }

    #[test]
    fn test_panner_node_follows_position() {
        let node = PannerNode::new(PannerConfig::default(), Vec3::new(-5.0, 1.6, 0.0));
        let before = node.gains(&ListenerPose::DEFAULT);
        node.position.set(Vec3::new(5.0, 1.6, 0.0));
        let after = node.gains(&ListenerPose::DEFAULT);
        assert!(before.left > before.right);
        assert!(after.right > after.left);
    }
}
