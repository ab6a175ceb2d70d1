//! Animation task definition and per-task progress

use std::time::Duration;

use super::easing::Easing;
use super::property::{Animatable, Property, PropertySet, TargetValue};
use crate::foundation::math::{utils, Vec3};

/// One animated scalar of a task
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    /// Property written by this track
    pub property: Property,
    /// Where the property ends up
    pub target: TargetValue,
}

#[derive(Debug, Clone, Copy)]
struct ResolvedTrack {
    property: Property,
    start: f32,
    end: f32,
}

/// Timed interpolation of one or more properties of a target
///
/// Built with the `with_*` / `then` builder methods and handed to
/// [`AnimationScheduler::start`](super::AnimationScheduler::start).
/// `K` is the continuation payload returned once when the task completes.
#[derive(Debug)]
pub struct AnimationTask<T, K> {
    target: T,
    tracks: Vec<Track>,
    duration: Duration,
    easing: Easing,
    delay: Duration,
    continuation: Option<K>,

    elapsed: Duration,
    delay_remaining: Duration,
    resolved: Option<Vec<ResolvedTrack>>,
}

impl<T: Copy, K> AnimationTask<T, K> {
    /// Create a linear task with no tracks
    pub fn new(target: T, duration: Duration) -> Self {
        Self {
            target,
            tracks: Vec::new(),
            duration,
            easing: Easing::Linear,
            delay: Duration::ZERO,
            continuation: None,
            elapsed: Duration::ZERO,
            delay_remaining: Duration::ZERO,
            resolved: None,
        }
    }

    /// Animate `property` towards `target`; a later track for the same
    /// property replaces the earlier one
    pub fn with_track(mut self, property: Property, target: TargetValue) -> Self {
        self.tracks.retain(|track| track.property != property);
        self.tracks.push(Track { property, target });
        self
    }

    /// Animate all three position axes to `position`
    pub fn with_position(self, position: Vec3) -> Self {
        self.with_track(Property::PositionX, TargetValue::To(position.x))
            .with_track(Property::PositionY, TargetValue::To(position.y))
            .with_track(Property::PositionZ, TargetValue::To(position.z))
    }

    /// Set the easing curve
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Wait `delay` before the task starts progressing
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self.delay_remaining = delay;
        self
    }

    /// Payload handed back when the task completes
    pub fn then(mut self, continuation: K) -> Self {
        self.continuation = Some(continuation);
        self
    }

    /// Animated target
    pub fn target(&self) -> T {
        self.target
    }

    /// Tracks in insertion order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Properties written by this task
    pub fn properties(&self) -> PropertySet {
        self.tracks
            .iter()
            .fold(PropertySet::empty(), |set, track| set | track.property.flag())
    }

    /// Total interpolation time, excluding the delay
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Start delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Easing curve
    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Time spent interpolating so far
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether the delay has run out
    pub fn has_started(&self) -> bool {
        self.delay_remaining.is_zero()
    }

    /// Normalized progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        utils::clamp(self.elapsed.as_secs_f32() / self.duration.as_secs_f32(), 0.0, 1.0)
    }

    /// Whether the interpolation reached its end
    pub fn is_complete(&self) -> bool {
        self.has_started() && self.elapsed >= self.duration
    }

    /// Advance the clock. Returns `false` while the task is still delayed.
    pub(crate) fn advance(&mut self, dt: Duration) -> bool {
        let mut dt = dt;
        if !self.delay_remaining.is_zero() {
            if dt < self.delay_remaining {
                self.delay_remaining -= dt;
                return false;
            }
            dt -= self.delay_remaining;
            self.delay_remaining = Duration::ZERO;
        }
        self.elapsed = (self.elapsed + dt).min(self.duration);
        true
    }

    /// Capture start values on first activation. Returns `false` when the
    /// target has disappeared.
    pub(crate) fn resolve<A: Animatable<T>>(&mut self, world: &A) -> bool {
        if self.resolved.is_some() {
            return true;
        }
        let mut resolved = Vec::with_capacity(self.tracks.len());
        for track in &self.tracks {
            let Some(start) = world.read(self.target, track.property) else {
                return false;
            };
            resolved.push(ResolvedTrack {
                property: track.property,
                start,
                end: track.target.resolve(start),
            });
        }
        self.resolved = Some(resolved);
        true
    }

    /// Write current values; the final frame writes exact end values
    pub(crate) fn apply<A: Animatable<T>>(&self, world: &mut A) {
        let Some(resolved) = &self.resolved else {
            return;
        };
        let complete = self.is_complete();
        let eased = self.easing.apply(self.progress());
        for track in resolved {
            let value = if complete {
                track.end
            } else {
                utils::lerp(track.start, track.end, eased)
            };
            world.write(self.target, track.property, value);
        }
    }

    pub(crate) fn take_continuation(&mut self) -> Option<K> {
        self.continuation.take()
    }
}
