//! The delivery truck

use std::fmt;

use crate::foundation::math::{Transform, Vec3};

/// Where the truck is in its dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TruckState {
    /// Parked at home
    #[default]
    Idle,
    /// Driving to the staging lane and off
    Departing,
    /// Gone; waiting to snap back home
    Returning,
}

impl fmt::Display for TruckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "Idle",
            Self::Departing => "Departing",
            Self::Returning => "Returning",
        })
    }
}

/// Truck pose and state
#[derive(Debug, Clone, PartialEq)]
pub struct Truck {
    position: Vec3,
    yaw: f32,
    home: Vec3,
    state: TruckState,
}

impl Truck {
    /// Parked at `home`, facing +X
    pub fn new(home: Vec3) -> Self {
        Self {
            position: home,
            yaw: 0.0,
            home,
            state: TruckState::Idle,
        }
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current rotation about +Y in radians
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Parking spot
    pub fn home(&self) -> Vec3 {
        self.home
    }

    /// Dispatch cycle state
    pub fn state(&self) -> TruckState {
        self.state
    }

    /// Parked and free for a new dispatch
    pub fn is_idle(&self) -> bool {
        self.state == TruckState::Idle
    }

    /// Render transform
    pub fn transform(&self) -> Transform {
        Transform::from_position_yaw(self.position, self.yaw)
    }

    pub(crate) fn position_mut(&mut self) -> &mut Vec3 {
        &mut self.position
    }

    pub(crate) fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }

    /// Change state, returning the previous one
    pub(crate) fn set_state(&mut self, state: TruckState) -> TruckState {
        std::mem::replace(&mut self.state, state)
    }
}
