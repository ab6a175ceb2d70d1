//! Animatable properties and the world access trait

use bitflags::bitflags;

bitflags! {
    /// Set of scalar properties a task writes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertySet: u8 {
        /// World X
        const POSITION_X = 1;
        /// World Y
        const POSITION_Y = 1 << 1;
        /// World Z
        const POSITION_Z = 1 << 2;
        /// Rotation about +Y
        const YAW = 1 << 3;
        /// Full position
        const POSITION = Self::POSITION_X.bits() | Self::POSITION_Y.bits() | Self::POSITION_Z.bits();
    }
}

/// Single animatable scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// World X
    PositionX,
    /// World Y
    PositionY,
    /// World Z
    PositionZ,
    /// Rotation about +Y in radians
    Yaw,
}

impl Property {
    /// Position axes in x, y, z order
    pub const POSITION: [Self; 3] = [Self::PositionX, Self::PositionY, Self::PositionZ];

    /// Flag for this property
    pub const fn flag(self) -> PropertySet {
        match self {
            Self::PositionX => PropertySet::POSITION_X,
            Self::PositionY => PropertySet::POSITION_Y,
            Self::PositionZ => PropertySet::POSITION_Z,
            Self::Yaw => PropertySet::YAW,
        }
    }
}

/// End value of a track
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetValue {
    /// Absolute end value
    To(f32),
    /// Offset from the value captured when the task starts
    By(f32),
}

impl TargetValue {
    /// End value given the captured start
    pub fn resolve(self, start: f32) -> f32 {
        match self {
            Self::To(value) => value,
            Self::By(delta) => start + delta,
        }
    }
}

/// World the scheduler reads start values from and writes results to
pub trait Animatable<T> {
    /// Current value, `None` when the target no longer exists
    fn read(&self, target: T, property: Property) -> Option<f32>;

    /// Write an interpolated value
    fn write(&mut self, target: T, property: Property, value: f32);
}
