//! Named stages of the load and dispatch chains

use std::fmt;
use std::time::Duration;

use crate::animation::Easing;
use crate::foundation::math::Vec3;

/// Stages of carrying one product to the truck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadStage {
    /// Raise above the shelf
    Lift,
    /// Carry over the truck bed
    Haul,
    /// Settle into the bed; the truck owns the product afterwards
    Drop,
    /// Grace period before the product leaves the scene
    Stow,
}

/// Stages of one dispatch leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchStage {
    /// Drive into the staging lane
    Approach,
    /// Drive off along the lane
    Depart,
    /// Snap back to the parking spot
    Reset,
    /// Swing round towards the exit
    Turn,
    /// Snap back to facing +X
    Straighten,
}

/// Any chain stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageName {
    /// Stage of a load chain
    Load(LoadStage),
    /// Stage of a dispatch leg
    Dispatch(DispatchStage),
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(stage) => write!(f, "load/{:?}", stage),
            Self::Dispatch(stage) => write!(f, "dispatch/{:?}", stage),
        }
    }
}

/// How a stage reaches its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageMotion {
    /// Interpolate with an animation task
    Tween {
        /// Interpolation time
        duration: Duration,
        /// Curve
        easing: Easing,
    },
    /// Jump to the target when a deferred callback fires
    Snap,
}

/// Where a stage sends its subject
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageTarget {
    /// Position offset from wherever the subject is when the stage starts
    Offset(Vec3),
    /// Absolute position; `None` axes keep their current value
    Position {
        /// World X
        x: Option<f32>,
        /// World Y
        y: Option<f32>,
        /// World Z
        z: Option<f32>,
    },
    /// Above the truck as it stands when the stage starts
    TruckBed {
        /// World Y
        height: f32,
    },
    /// Absolute yaw in radians
    Yaw(f32),
    /// Nothing moves; the stage only marks time
    Hold,
}

impl StageTarget {
    /// All three axes absolute
    pub fn point(position: Vec3) -> Self {
        Self::Position {
            x: Some(position.x),
            y: Some(position.y),
            z: Some(position.z),
        }
    }
}

/// One step of a chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StagePlan {
    /// Stage name
    pub name: StageName,
    /// Tween or snap
    pub motion: StageMotion,
    /// Wait before the stage starts moving (tween) or fires (snap)
    pub delay: Duration,
    /// Destination
    pub target: StageTarget,
}

impl StagePlan {
    /// Tweened stage without delay
    pub fn tween(name: StageName, duration: Duration, easing: Easing, target: StageTarget) -> Self {
        Self {
            name,
            motion: StageMotion::Tween { duration, easing },
            delay: Duration::ZERO,
            target,
        }
    }

    /// Stage that jumps to `target` after `delay`
    pub fn snap(name: StageName, delay: Duration, target: StageTarget) -> Self {
        Self {
            name,
            motion: StageMotion::Snap,
            delay,
            target,
        }
    }

    /// Wait `delay` before starting
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Time from the stage being started until it completes
    pub fn span(&self) -> Duration {
        match self.motion {
            StageMotion::Tween { duration, .. } => self.delay + duration,
            StageMotion::Snap => self.delay,
        }
    }
}
