//! Audio graph manager: the persistent mixing topology.
//!
//! ```text
//! voice -> gain -> [panner] -> music | ambience bus -> master -> output
//! ```
//!
//! `AudioGraph` is the controller half. It owns the bus levels and the
//! listener, and sends topology changes to the render half (`Mixer`) over
//! a channel. Gain and position values are atomics read by the mixer every
//! block, so volume changes never touch the topology.

use crate::buffer::AudioBuffer;
use crate::config::EngineConfig;
use crate::mixer::{Mixer, RenderVoice};
use crate::panner::PannerNode;
use crate::param::{AudioParam, ListenerParams};
use crossbeam_channel::{unbounded, Sender};
use glam::Vec3;
use soundscape_core::{Category, ListenerPose, Result, SoundscapeError};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Lifecycle of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphState {
    Uninitialized,
    Initialized,
    Closed,
}

/// Whether the output device is producing sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ContextState {
    Suspended = 0,
    Running = 1,
    Closed = 2,
}

impl ContextState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Running,
            2 => Self::Closed,
            _ => Self::Suspended,
        }
    }
}

/// Identity of one connected voice chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Nodes of one voice, shared between the controller and the mixer.
#[derive(Debug)]
pub struct VoiceNodes {
    pub id: NodeId,
    /// Routing; fixed for the lifetime of the voice.
    pub category: Category,
    /// Instance gain: volume with the mute applied.
    pub gain: AudioParam,
    /// Present only for spatialized categories.
    pub panner: Option<PannerNode>,
}

/// State read by the mixer.
#[derive(Debug)]
pub(crate) struct SharedGraph {
    pub master: AudioParam,
    pub music: AudioParam,
    pub ambience: AudioParam,
    pub listener: ListenerParams,
    context: AtomicU8,
}

impl SharedGraph {
    pub fn bus(&self, category: Category) -> &AudioParam {
        match category {
            Category::Music => &self.music,
            Category::Ambience => &self.ambience,
        }
    }

    pub fn context(&self) -> ContextState {
        ContextState::from_u8(self.context.load(Ordering::Acquire))
    }

    fn set_context(&self, state: ContextState) {
        self.context.store(state as u8, Ordering::Release);
    }
}

/// Topology changes for the render side.
pub(crate) enum GraphCommand {
    Initialize,
    Connect(Box<RenderVoice>),
    Disconnect(NodeId),
    Close,
}

#[derive(Debug, Clone, Copy)]
struct BusLevel {
    volume: f32,
    muted: bool,
}

impl BusLevel {
    fn gain(self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }
}

/// Controller half of the audio graph.
pub struct AudioGraph {
    shared: Arc<SharedGraph>,
    commands: Sender<GraphCommand>,
    state: GraphState,
    music: BusLevel,
    ambience: BusLevel,
    sample_rate: u32,
    next_node: u64,
}

impl AudioGraph {
    /// Create the controller and its render half. Nothing is initialized
    /// until the first operation.
    pub fn new(config: &EngineConfig) -> (Self, Mixer) {
        let (tx, rx) = unbounded();
        let shared = Arc::new(SharedGraph {
            master: AudioParam::new(1.0),
            music: AudioParam::new(1.0),
            ambience: AudioParam::new(1.0),
            listener: ListenerParams::new(config.listener),
            context: AtomicU8::new(ContextState::Suspended as u8),
        });
        let graph = Self {
            shared: Arc::clone(&shared),
            commands: tx,
            state: GraphState::Uninitialized,
            music: BusLevel {
                volume: 1.0,
                muted: false,
            },
            ambience: BusLevel {
                volume: 1.0,
                muted: false,
            },
            sample_rate: config.sample_rate,
            next_node: 1,
        };
        let mixer = Mixer::new(shared, rx, config);
        (graph, mixer)
    }

    #[inline]
    pub fn state(&self) -> GraphState {
        self.state
    }

    pub fn context_state(&self) -> ContextState {
        self.shared.context()
    }

    /// Build the master and category buses on first use.
    pub fn ensure_initialized(&mut self) -> Result<()> {
        match self.state {
            GraphState::Closed => Err(SoundscapeError::Closed),
            GraphState::Initialized => Ok(()),
            GraphState::Uninitialized => {
                self.send(GraphCommand::Initialize);
                self.state = GraphState::Initialized;
                let listener = self.shared.listener.pose();
                info!(
                    sample_rate = self.sample_rate,
                    listener = ?listener.position,
                    "Audio graph initialized"
                );
                Ok(())
            }
        }
    }

    /// Start output if the context is suspended.
    pub fn resume(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        if self.shared.context() == ContextState::Suspended {
            self.shared.set_context(ContextState::Running);
            debug!("Audio context resumed");
        }
        Ok(())
    }

    pub fn suspend(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        if self.shared.context() == ContextState::Running {
            self.shared.set_context(ContextState::Suspended);
            debug!("Audio context suspended");
        }
        Ok(())
    }

    pub fn set_master_volume(&mut self, volume: f32) -> Result<()> {
        self.ensure_initialized()?;
        self.shared.master.set(volume.clamp(0.0, 1.0));
        Ok(())
    }

    pub fn set_category_volume(&mut self, category: Category, volume: f32) -> Result<()> {
        self.ensure_initialized()?;
        self.bus_level_mut(category).volume = volume.clamp(0.0, 1.0);
        self.apply_bus(category);
        Ok(())
    }

    pub fn set_category_muted(&mut self, category: Category, muted: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.bus_level_mut(category).muted = muted;
        self.apply_bus(category);
        Ok(())
    }

    pub fn set_listener_position(&mut self, position: Vec3) -> Result<()> {
        self.ensure_initialized()?;
        self.shared.listener.position.set(position);
        Ok(())
    }

    pub fn set_listener_orientation(&mut self, forward: Vec3, up: Vec3) -> Result<()> {
        self.ensure_initialized()?;
        self.shared.listener.forward.set(forward);
        self.shared.listener.up.set(up);
        Ok(())
    }

    pub fn set_listener_pose(&mut self, pose: ListenerPose) -> Result<()> {
        self.ensure_initialized()?;
        self.shared.listener.set_pose(pose);
        Ok(())
    }

    pub fn listener(&self) -> ListenerPose {
        self.shared.listener.pose()
    }

    /// Current master gain.
    pub fn master_gain(&self) -> f32 {
        self.shared.master.get()
    }

    /// Current gain of a category bus, mute applied.
    pub fn bus_gain(&self, category: Category) -> f32 {
        self.shared.bus(category).get()
    }

    /// Connect a looping voice chain into its category bus.
    pub(crate) fn connect(
        &mut self,
        category: Category,
        buffer: Arc<AudioBuffer>,
        gain: f32,
        panner: Option<PannerNode>,
    ) -> Result<Arc<VoiceNodes>> {
        self.ensure_initialized()?;
        let id = NodeId(self.next_node);
        self.next_node += 1;

        let nodes = Arc::new(VoiceNodes {
            id,
            category,
            gain: AudioParam::new(gain),
            panner,
        });
        let voice = RenderVoice::new(Arc::clone(&nodes), buffer, self.sample_rate);
        self.send(GraphCommand::Connect(Box::new(voice)));
        Ok(nodes)
    }

    /// Fade out and remove a voice chain.
    pub(crate) fn disconnect(&mut self, id: NodeId) -> Result<()> {
        if self.state == GraphState::Closed {
            return Err(SoundscapeError::Closed);
        }
        self.send(GraphCommand::Disconnect(id));
        Ok(())
    }

    /// Tear the graph down. Later operations fail with `Closed`.
    pub fn close(&mut self) {
        if self.state == GraphState::Closed {
            return;
        }
        self.send(GraphCommand::Close);
        self.shared.set_context(ContextState::Closed);
        self.state = GraphState::Closed;
        info!("Audio graph closed");
    }

    fn bus_level_mut(&mut self, category: Category) -> &mut BusLevel {
        match category {
            Category::Music => &mut self.music,
            Category::Ambience => &mut self.ambience,
        }
    }

    fn apply_bus(&self, category: Category) {
        let level = match category {
            Category::Music => self.music,
            Category::Ambience => self.ambience,
        };
        self.shared.bus(category).set(level.gain());
    }

    fn send(&self, command: GraphCommand) {
        if self.commands.send(command).is_err() {
            debug!("Render side is gone, dropping graph command");
        }
    }
}

impl Drop for AudioGraph {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> (AudioGraph, Mixer) {
        AudioGraph::new(&EngineConfig::default())
    }

    #[test]
    fn test_lazy_initialization() {
        let (mut graph, _mixer) = graph();
        assert_eq!(graph.state(), GraphState::Uninitialized);
        graph.set_master_volume(0.5).unwrap();
        assert_eq!(graph.state(), GraphState::Initialized);
        assert_eq!(graph.master_gain(), 0.5);
        assert_eq!(graph.listener(), ListenerPose::DEFAULT);
    }

    #[test]
    fn test_bus_gain_composes_volume_and_mute() {
        let (mut graph, _mixer) = graph();
        graph.set_category_volume(Category::Music, 0.4).unwrap();
        assert_eq!(graph.bus_gain(Category::Music), 0.4);
        graph.set_category_muted(Category::Music, true).unwrap();
        assert_eq!(graph.bus_gain(Category::Music), 0.0);
        graph.set_category_muted(Category::Music, false).unwrap();
        assert_eq!(graph.bus_gain(Category::Music), 0.4);
        assert_eq!(graph.bus_gain(Category::Ambience), 1.0);
    }

    #[test]
    fn test_resume_and_suspend() {
        let (mut graph, _mixer) = graph();
        assert_eq!(graph.context_state(), ContextState::Suspended);
        graph.resume().unwrap();
        assert_eq!(graph.context_state(), ContextState::Running);
        graph.resume().unwrap();
        assert_eq!(graph.context_state(), ContextState::Running);
        graph.suspend().unwrap();
        assert_eq!(graph.context_state(), ContextState::Suspended);
    }

    #[test]
    fn test_operations_after_close_fail() {
        let (mut graph, _mixer) = graph();
        graph.resume().unwrap();
        graph.close();
        graph.close();
        assert_eq!(graph.state(), GraphState::Closed);
        assert_eq!(graph.context_state(), ContextState::Closed);
        assert!(matches!(graph.set_master_volume(1.0), Err(SoundscapeError::Closed)));
        assert!(matches!(graph.resume(), Err(SoundscapeError::Closed)));
        assert!(matches!(
            graph.set_listener_position(Vec3::ZERO),
            Err(SoundscapeError::Closed)
        ));
    }

    #[test]
    fn test_listener_orientation_turns_right_axis() {
        let (mut graph, _mixer) = graph();
        graph.set_listener_orientation(Vec3::X, Vec3::Y).unwrap();
        let pose = graph.listener();
        assert_eq!(pose.forward, Vec3::X);
        assert_eq!(pose.position, ListenerPose::DEFAULT.position);
        assert!((pose.right() - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_close_before_use() {
        let (mut graph, _mixer) = graph();
        graph.close();
        assert!(matches!(graph.ensure_initialized(), Err(SoundscapeError::Closed)));
    }

    #[test]
    fn test_independent_instances() {
        let (mut a, _ma) = graph();
        let (mut b, _mb) = graph();
        a.set_master_volume(0.2).unwrap();
        b.set_master_volume(0.9).unwrap();
        assert_eq!(a.master_gain(), 0.2);
        assert_eq!(b.master_gain(), 0.9);
    }
}
