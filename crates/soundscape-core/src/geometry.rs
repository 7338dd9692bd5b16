//! Canvas to world coordinate mapping.
//!
//! The canvas is a 2D pixel space. The world is the 3D space the panner
//! and listener live in, measured in world units:
//! - x: canvas left edge is -5, right edge is +5
//! - y: fixed ear height, the canvas vertical axis is not height
//! - z: canvas top is 0, bottom is 10; depth shifts by +/-5

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// 3D world position.
pub type WorldPosition = Vec3;

/// Half of the horizontal world span.
pub const WORLD_HALF_WIDTH: f64 = 5.0;

/// World distance covered by the canvas vertical axis.
pub const WORLD_DEPTH_SPAN: f64 = 10.0;

/// World offset applied per unit of depth.
pub const DEPTH_OFFSET: f64 = 5.0;

/// Ear height in world units.
pub const EAR_HEIGHT: f32 = 1.6;

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Center point of the canvas in pixels.
    pub fn center(self) -> (f64, f64) {
        (self.width * 0.5, self.height * 0.5)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Map a canvas point (plus optional depth in [-1, 1]) to world space.
///
/// This is the only conversion used for source placement, repositioning
/// and listener placement. A degenerate canvas axis (zero or negative
/// size) maps to the axis origin instead of producing NaN.
pub fn to_world(x: f64, y: f64, canvas: CanvasSize, depth: f64) -> WorldPosition {
    let wx = if canvas.width > 0.0 {
        (x / canvas.width) * (WORLD_HALF_WIDTH * 2.0) - WORLD_HALF_WIDTH
    } else {
        0.0
    };
    let wz_base = if canvas.height > 0.0 {
        (y / canvas.height) * WORLD_DEPTH_SPAN
    } else {
        0.0
    };
    let wz = wz_base + depth.clamp(-1.0, 1.0) * DEPTH_OFFSET;
    Vec3::new(wx as f32, EAR_HEIGHT, wz as f32)
}

/// Position and orientation of the listener.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ListenerPose {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
}

impl ListenerPose {
    /// Default listener: centered, at ear height, behind the bottom edge
    /// of the canvas, looking toward its top.
    pub const DEFAULT: Self = Self {
        position: Vec3::new(0.0, EAR_HEIGHT, 12.0),
        forward: Vec3::new(0.0, 0.0, -1.0),
        up: Vec3::new(0.0, 1.0, 0.0),
    };

    /// Place the listener at a canvas point, keeping its orientation.
    pub fn at_canvas(self, x: f64, y: f64, canvas: CanvasSize, depth: f64) -> Self {
        Self {
            position: to_world(x, y, canvas, depth),
            ..self
        }
    }

    /// Unit vector pointing to the listener's right.
    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up).normalize_or_zero()
    }
}

impl Default for ListenerPose {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CANVAS: CanvasSize = CanvasSize::new(800.0, 600.0);

    #[test]
    fn test_left_and_right_edges() {
        assert_eq!(to_world(0.0, 100.0, CANVAS, 0.0).x, -5.0);
        assert_eq!(to_world(800.0, 100.0, CANVAS, 0.0).x, 5.0);
        assert_eq!(to_world(400.0, 100.0, CANVAS, 0.0).x, 0.0);
    }

    #[test]
    fn test_top_edge_is_zero_depth() {
        let p = to_world(123.0, 0.0, CANVAS, 0.0);
        assert_eq!(p.z, 0.0);
        assert_eq!(p.y, EAR_HEIGHT);
    }

    #[test]
    fn test_depth_offsets_by_five() {
        let near = to_world(200.0, 300.0, CANVAS, 0.0);
        let far = to_world(200.0, 300.0, CANVAS, 1.0);
        assert!((far.z - near.z - 5.0).abs() < 1e-5);
        let back = to_world(200.0, 300.0, CANVAS, -1.0);
        assert!((near.z - back.z - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_canvas() {
        let p = to_world(10.0, 10.0, CanvasSize::new(0.0, 0.0), 0.5);
        assert_eq!(p.x, 0.0);
        assert!((p.z - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_listener_right_axis() {
        let right = ListenerPose::DEFAULT.right();
        assert!((right - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_listener_at_canvas_keeps_orientation() {
        let pose = ListenerPose::DEFAULT.at_canvas(800.0, 300.0, CANVAS, -1.0);
        assert_eq!(pose.position, Vec3::new(5.0, EAR_HEIGHT, 0.0));
        assert_eq!(pose.forward, ListenerPose::DEFAULT.forward);
        assert_eq!(pose.up, ListenerPose::DEFAULT.up);
    }

    proptest! {
        #[test]
        fn prop_x_stays_in_world_span(x in 0.0f64..800.0, y in 0.0f64..600.0) {
            let p = to_world(x, y, CANVAS, 0.0);
            prop_assert!(p.x >= -5.0 && p.x <= 5.0);
            prop_assert!(p.z >= 0.0 && p.z <= 10.0);
        }

        #[test]
        fn prop_vertical_axis_never_moves_height(x in 0.0f64..800.0, y in 0.0f64..600.0, d in -1.0f64..1.0) {
            prop_assert_eq!(to_world(x, y, CANVAS, d).y, EAR_HEIGHT);
        }
    }
}
