//! Lock-free parameters shared between the controller and the mixer.

use glam::Vec3;
use soundscape_core::ListenerPose;
use std::sync::atomic::{AtomicU32, Ordering};

/// An f32 value written by the controller and read by the audio thread.
///
/// Writes are visible to the next processed block. Each parameter is
/// independent: last write wins, there is no multi-field transaction.
#[derive(Debug)]
pub struct AudioParam {
    bits: AtomicU32,
}

impl AudioParam {
    pub fn new(value: f32) -> Self {
        Self {
            bits: AtomicU32::new(value.to_bits()),
        }
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }
}

impl Default for AudioParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Three parameters forming a vector.
#[derive(Debug, Default)]
pub struct Vec3Param([AudioParam; 3]);

impl Vec3Param {
    pub fn new(v: Vec3) -> Self {
        Self([AudioParam::new(v.x), AudioParam::new(v.y), AudioParam::new(v.z)])
    }

    pub fn get(&self) -> Vec3 {
        Vec3::new(self.0[0].get(), self.0[1].get(), self.0[2].get())
    }

    pub fn set(&self, v: Vec3) {
        self.0[0].set(v.x);
        self.0[1].set(v.y);
        self.0[2].set(v.z);
    }
}

/// Listener position and orientation.
#[derive(Debug)]
pub struct ListenerParams {
    pub position: Vec3Param,
    pub forward: Vec3Param,
    pub up: Vec3Param,
}

impl ListenerParams {
    pub fn new(pose: ListenerPose) -> Self {
        Self {
            position: Vec3Param::new(pose.position),
            forward: Vec3Param::new(pose.forward),
            up: Vec3Param::new(pose.up),
        }
    }

    pub fn pose(&self) -> ListenerPose {
        ListenerPose {
            position: self.position.get(),
            forward: self.forward.get(),
            up: self.up.get(),
        }
    }

    pub fn set_pose(&self, pose: ListenerPose) {
        self.position.set(pose.position);
        self.forward.set(pose.forward);
        self.up.set(pose.up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_roundtrip() {
        let p = AudioParam::new(0.25);
        assert_eq!(p.get(), 0.25);
        p.set(-1.5);
        assert_eq!(p.get(), -1.5);
    }

    #[test]
    fn test_listener_pose() {
        let l = ListenerParams::new(ListenerPose::DEFAULT);
        assert_eq!(l.pose(), ListenerPose::DEFAULT);
        l.position.set(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(l.pose().position, Vec3::new(1.0, 2.0, 3.0));
    }
}
