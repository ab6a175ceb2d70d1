//! Time-based property interpolation
//!
//! The scheduler owns every in-flight [`AnimationTask`]. Each frame it advances
//! the tasks, writes interpolated values through an [`Animatable`] world and
//! hands back the continuation payloads of the tasks that finished, in the
//! order they finished. Chains are built by the owner registering the next
//! task when it receives a continuation; there is no sequencing primitive.

pub mod easing;
pub mod property;
pub mod task;
pub mod scheduler;

pub use easing::Easing;
pub use property::{Animatable, Property, PropertySet, TargetValue};
pub use task::{AnimationTask, Track};
pub use scheduler::{AnimationScheduler, TaskId};
