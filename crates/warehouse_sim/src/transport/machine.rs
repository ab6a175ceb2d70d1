//! Stage runner for load and dispatch chains

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use super::stage::{DispatchStage, LoadStage, StageMotion, StageName, StagePlan, StageTarget};
use super::truck::TruckState;
use crate::animation::{Animatable, AnimationScheduler, AnimationTask, Easing, Property, TargetValue};
use crate::config::{LayoutConfig, SimulationConfig, TimingConfig, TransportConfig};
use crate::events::{DeferredQueue, EventFeed, SimEvent};
use crate::foundation::math::{utils, Vec3};
use crate::inventory::{InventoryError, ProductId, ZoneIndex};
use crate::scene::{Scene, SceneTarget};

new_key_type! {
    /// Handle to a running chain
    pub struct ChainId;
}

/// Continuation payload: stage `stage` of chain `chain` has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStep {
    /// Chain the stage belongs to
    pub chain: ChainId,
    /// Index of the stage in its plan
    pub stage: usize,
}

/// The two independent truck chains of a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchLeg {
    /// Drive out, drive off, snap home
    Position,
    /// Wait, turn, snap straight
    Rotation,
}

/// Recoverable transport rejections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Nothing to load
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Dispatch requested while the truck is out
    #[error("truck is busy ({state})")]
    TruckBusy {
        /// Truck state at the time of the request
        state: TruckState,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subject {
    Product(ProductId),
    Truck(DispatchLeg),
}

impl Subject {
    fn target(self) -> SceneTarget {
        match self {
            Self::Product(id) => SceneTarget::Product(id),
            Self::Truck(_) => SceneTarget::Truck,
        }
    }
}

#[derive(Debug)]
struct Chain {
    subject: Subject,
    plans: Vec<StagePlan>,
    cursor: usize,
}

/// Everything a chain stage touches
pub struct TransportContext<'a> {
    /// Inventory and truck
    pub scene: &'a mut Scene,
    /// Where tweened stages run
    pub scheduler: &'a mut AnimationScheduler<SceneTarget, StageStep>,
    /// Where snap stages wait
    pub deferred: &'a mut DeferredQueue<StageStep>,
    /// Outbound notifications
    pub events: &'a mut EventFeed,
}

/// Drives load and dispatch requests through their stage lists
///
/// Chains only advance when the scheduler or the deferred queue hands back a
/// [`StageStep`]; the machine itself never looks at the clock. A step whose
/// chain is gone (replaced dispatch, cleared machine) is ignored.
#[derive(Debug)]
pub struct TransportStateMachine {
    layout: LayoutConfig,
    timing: TimingConfig,
    policy: TransportConfig,
    chains: SlotMap<ChainId, Chain>,
    legs_out: usize,
}

impl TransportStateMachine {
    /// Create a machine using the layout, timing and policy of `config`
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            layout: config.layout.clone(),
            timing: config.timing.clone(),
            policy: config.transport.clone(),
            chains: SlotMap::with_key(),
            legs_out: 0,
        }
    }

    /// Lift, Haul, Drop, Stow
    pub fn load_plan(&self) -> Vec<StagePlan> {
        let t = &self.timing;
        vec![
            StagePlan::tween(
                StageName::Load(LoadStage::Lift),
                TimingConfig::ms(t.lift_ms),
                Easing::QuadraticOut,
                StageTarget::Offset(Vec3::new(0.0, t.lift_height, 0.0)),
            ),
            StagePlan::tween(
                StageName::Load(LoadStage::Haul),
                TimingConfig::ms(t.haul_ms),
                Easing::QuadraticInOut,
                StageTarget::TruckBed {
                    height: self.layout.truck_bed_height,
                },
            ),
            StagePlan::tween(
                StageName::Load(LoadStage::Drop),
                TimingConfig::ms(t.drop_ms),
                Easing::BounceOut,
                StageTarget::Position {
                    x: None,
                    y: Some(self.layout.truck_floor_height),
                    z: None,
                },
            ),
            StagePlan::snap(
                StageName::Load(LoadStage::Stow),
                TimingConfig::ms(t.stow_grace_ms),
                StageTarget::Hold,
            ),
        ]
    }

    /// Approach, Depart, Reset
    pub fn position_plan(&self) -> Vec<StagePlan> {
        let t = &self.timing;
        let lane = self.layout.staging_z;
        vec![
            StagePlan::tween(
                StageName::Dispatch(DispatchStage::Approach),
                TimingConfig::ms(t.approach_ms),
                Easing::QuadraticInOut,
                StageTarget::Position {
                    x: None,
                    y: Some(0.0),
                    z: Some(lane),
                },
            ),
            StagePlan::tween(
                StageName::Dispatch(DispatchStage::Depart),
                TimingConfig::ms(t.depart_ms),
                Easing::QuadraticIn,
                StageTarget::point(Vec3::new(self.layout.departure_x, 0.0, lane)),
            ),
            StagePlan::snap(
                StageName::Dispatch(DispatchStage::Reset),
                TimingConfig::ms(t.reset_delay_ms),
                StageTarget::point(self.layout.truck_home),
            ),
        ]
    }

    /// Turn, Straighten
    pub fn rotation_plan(&self) -> Vec<StagePlan> {
        let t = &self.timing;
        vec![
            StagePlan::tween(
                StageName::Dispatch(DispatchStage::Turn),
                TimingConfig::ms(t.turn_ms),
                Easing::QuadraticInOut,
                StageTarget::Yaw(utils::deg_to_rad(t.turn_angle_deg)),
            )
            .after(TimingConfig::ms(t.turn_delay_ms)),
            StagePlan::snap(
                StageName::Dispatch(DispatchStage::Straighten),
                TimingConfig::ms(t.reset_delay_ms),
                StageTarget::Yaw(0.0),
            ),
        ]
    }

    /// Take the newest product of `zone` and start carrying it to the truck
    ///
    /// An empty zone is rejected and nothing starts.
    pub fn request_load(&mut self, zone: ZoneIndex, ctx: &mut TransportContext<'_>) -> Result<ProductId, TransportError> {
        let product = ctx.scene.store.remove_for_transit(zone)?;
        log::info!("Loading product {:?} from {}", product, zone);
        ctx.events.push(SimEvent::ProductLoaded { product, zone });

        let id = self.chains.insert(Chain {
            subject: Subject::Product(product),
            plans: self.load_plan(),
            cursor: 0,
        });
        self.begin_stage(id, ctx);
        Ok(product)
    }

    /// Send the truck off on both legs
    ///
    /// Rejected with [`TransportError::TruckBusy`] unless the truck is idle
    /// or overlapping dispatch is allowed, in which case the running legs
    /// are abandoned and replaced.
    pub fn request_dispatch(&mut self, ctx: &mut TransportContext<'_>) -> Result<(), TransportError> {
        let state = ctx.scene.truck.state();
        if state != TruckState::Idle {
            if !self.policy.allow_overlapping_dispatch {
                return Err(TransportError::TruckBusy { state });
            }
            let abandoned = self.abandon_truck_legs();
            log::debug!("Overlapping dispatch replaced {} running leg(s)", abandoned);
        }

        log::info!("Dispatching truck from {:?}", ctx.scene.truck.position());
        Self::set_truck_state(TruckState::Departing, ctx);

        for (leg, plans) in [
            (DispatchLeg::Position, self.position_plan()),
            (DispatchLeg::Rotation, self.rotation_plan()),
        ] {
            let id = self.chains.insert(Chain {
                subject: Subject::Truck(leg),
                plans,
                cursor: 0,
            });
            self.legs_out += 1;
            self.begin_stage(id, ctx);
        }
        Ok(())
    }

    /// A tweened stage finished
    pub fn on_stage_complete(&mut self, step: StageStep, ctx: &mut TransportContext<'_>) {
        if self.current_plan(step).is_none() {
            log::trace!("Ignoring stale stage completion {:?}", step);
            return;
        }
        self.finish_stage(step, ctx);
    }

    /// A snap stage's delay ran out: jump to its target, then finish it
    pub fn on_deferred(&mut self, step: StageStep, ctx: &mut TransportContext<'_>) {
        let Some((subject, plan)) = self.current_plan(step) else {
            log::trace!("Ignoring stale deferred stage {:?}", step);
            return;
        };
        let target = subject.target();
        for (property, value) in Self::tracks(plan.target, ctx.scene) {
            if let Some(current) = ctx.scene.read(target, property) {
                ctx.scene.write(target, property, value.resolve(current));
            }
        }
        self.finish_stage(step, ctx);
    }

    /// Chains still running
    pub fn active_chains(&self) -> usize {
        self.chains.len()
    }

    /// Dispatch legs still running
    pub fn legs_out(&self) -> usize {
        self.legs_out
    }

    /// Forget every chain; pending steps become stale
    pub fn clear(&mut self) -> usize {
        let dropped = self.chains.len();
        self.chains.clear();
        self.legs_out = 0;
        dropped
    }

    fn current_plan(&self, step: StageStep) -> Option<(Subject, StagePlan)> {
        let chain = self.chains.get(step.chain)?;
        if chain.cursor != step.stage {
            return None;
        }
        chain.plans.get(chain.cursor).map(|plan| (chain.subject, *plan))
    }

    fn begin_stage(&mut self, id: ChainId, ctx: &mut TransportContext<'_>) {
        let Some(chain) = self.chains.get(id) else {
            return;
        };
        let Some(plan) = chain.plans.get(chain.cursor).copied() else {
            return;
        };
        let step = StageStep {
            chain: id,
            stage: chain.cursor,
        };
        let target = chain.subject.target();
        log::debug!("{:?} entering {} after {:?}", chain.subject, plan.name, plan.delay);

        match plan.motion {
            StageMotion::Tween { duration, easing } => {
                let task = Self::tracks(plan.target, ctx.scene).into_iter().fold(
                    AnimationTask::new(target, duration)
                        .with_easing(easing)
                        .with_delay(plan.delay)
                        .then(step),
                    |task, (property, value)| task.with_track(property, value),
                );
                ctx.scheduler.start(task);
            }
            StageMotion::Snap => {
                ctx.deferred.post(plan.delay, step);
            }
        }
    }

    fn finish_stage(&mut self, step: StageStep, ctx: &mut TransportContext<'_>) {
        let Some(chain) = self.chains.get_mut(step.chain) else {
            return;
        };
        let subject = chain.subject;
        let Some(name) = chain.plans.get(chain.cursor).map(|plan| plan.name) else {
            return;
        };
        chain.cursor += 1;
        let exhausted = chain.cursor >= chain.plans.len();

        match (name, subject) {
            (StageName::Load(LoadStage::Drop), Subject::Product(product)) => {
                match ctx.scene.store.mark_owned_by_truck(product) {
                    Ok(()) => ctx.events.push(SimEvent::ProductStowed { product }),
                    Err(e) => log::warn!("Drop finished for {:?}: {}", product, e),
                }
            }
            (StageName::Dispatch(DispatchStage::Depart), Subject::Truck(_)) => {
                if ctx.scene.truck.state() == TruckState::Departing {
                    Self::set_truck_state(TruckState::Returning, ctx);
                }
            }
            _ => {}
        }

        if exhausted {
            self.finish_chain(step.chain, ctx);
        } else {
            self.begin_stage(step.chain, ctx);
        }
    }

    fn finish_chain(&mut self, id: ChainId, ctx: &mut TransportContext<'_>) {
        let Some(chain) = self.chains.remove(id) else {
            return;
        };
        match chain.subject {
            Subject::Product(product) => match ctx.scene.store.mark_removed(product) {
                Ok(()) => {
                    log::debug!("Product {:?} left the scene", product);
                    ctx.events.push(SimEvent::ProductRetired { product });
                }
                Err(e) => log::warn!("Could not retire {:?}: {}", product, e),
            },
            Subject::Truck(leg) => {
                self.legs_out = self.legs_out.saturating_sub(1);
                log::debug!("{:?} leg back, {} still out", leg, self.legs_out);
                if self.legs_out == 0 {
                    Self::set_truck_state(TruckState::Idle, ctx);
                }
            }
        }
    }

    fn abandon_truck_legs(&mut self) -> usize {
        let before = self.chains.len();
        self.chains.retain(|_, chain| !matches!(chain.subject, Subject::Truck(_)));
        self.legs_out = 0;
        before - self.chains.len()
    }

    fn set_truck_state(state: TruckState, ctx: &mut TransportContext<'_>) {
        let from = ctx.scene.truck.set_state(state);
        if from != state {
            log::debug!("Truck {} -> {}", from, state);
            ctx.events.push(SimEvent::TruckStateChanged { from, to: state });
        }
    }

    /// Tracks for a stage target, resolved against the scene as it is now
    fn tracks(target: StageTarget, scene: &Scene) -> Vec<(Property, TargetValue)> {
        let axis = |value: Option<f32>| value.map_or(TargetValue::By(0.0), TargetValue::To);
        match target {
            StageTarget::Offset(offset) => Property::POSITION
                .into_iter()
                .zip([offset.x, offset.y, offset.z])
                .map(|(property, delta)| (property, TargetValue::By(delta)))
                .collect(),
            StageTarget::Position { x, y, z } => Property::POSITION
                .into_iter()
                .zip([axis(x), axis(y), axis(z)])
                .collect(),
            StageTarget::TruckBed { height } => {
                let truck = scene.truck.position();
                Property::POSITION
                    .into_iter()
                    .zip([truck.x, height, truck.z].map(TargetValue::To))
                    .collect()
            }
            StageTarget::Yaw(angle) => vec![(Property::Yaw, TargetValue::To(angle))],
            StageTarget::Hold => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants;
    use crate::inventory::{Ownership, ProductCategory, ZoneInventoryStore};
    use crate::transport::Truck;
    use approx::assert_relative_eq;
    use std::time::Duration;

    struct Rig {
        machine: TransportStateMachine,
        scene: Scene,
        scheduler: AnimationScheduler<SceneTarget, StageStep>,
        deferred: DeferredQueue<StageStep>,
        events: EventFeed,
    }

    impl Rig {
        fn new(config: SimulationConfig) -> Self {
            let layout = &config.layout;
            Self {
                scene: Scene::new(ZoneInventoryStore::new(layout.zone_positions()), Truck::new(layout.truck_home)),
                machine: TransportStateMachine::new(&config),
                scheduler: AnimationScheduler::new(),
                deferred: DeferredQueue::new(),
                events: EventFeed::default(),
            }
        }

        fn ctx(&mut self) -> (&mut TransportStateMachine, TransportContext<'_>) {
            (
                &mut self.machine,
                TransportContext {
                    scene: &mut self.scene,
                    scheduler: &mut self.scheduler,
                    deferred: &mut self.deferred,
                    events: &mut self.events,
                },
            )
        }

        fn step(&mut self, dt: Duration) {
            self.deferred.advance(dt);
            let finished = self.scheduler.tick(dt, &mut self.scene);
            for step in finished {
                let (machine, mut ctx) = self.ctx();
                machine.on_stage_complete(step, &mut ctx);
            }
            for step in self.deferred.drain_due() {
                let (machine, mut ctx) = self.ctx();
                machine.on_deferred(step, &mut ctx);
            }
        }

        fn run_for(&mut self, total_ms: u64) {
            for _ in 0..total_ms / 100 {
                self.step(Duration::from_millis(100));
            }
        }

        fn load(&mut self, zone: usize) -> Result<ProductId, TransportError> {
            let (machine, mut ctx) = self.ctx();
            machine.request_load(ZoneIndex::new(zone).unwrap(), &mut ctx)
        }

        fn dispatch(&mut self) -> Result<(), TransportError> {
            let (machine, mut ctx) = self.ctx();
            machine.request_dispatch(&mut ctx)
        }
    }

    #[test]
    fn test_plan_spans_match_timing() {
        let machine = TransportStateMachine::new(&SimulationConfig::default());
        let load: Duration = machine.load_plan().iter().map(StagePlan::span).sum();
        let position: Duration = machine.position_plan().iter().map(StagePlan::span).sum();
        let rotation: Duration = machine.rotation_plan().iter().map(StagePlan::span).sum();
        assert_eq!(load, Duration::from_millis(2000));
        assert_eq!(position, Duration::from_millis(3000));
        assert_eq!(rotation, Duration::from_millis(3000));
    }

    #[test]
    fn test_load_from_empty_zone_starts_nothing() {
        let mut rig = Rig::new(SimulationConfig::default());
        let result = rig.load(2);
        assert!(matches!(
            result,
            Err(TransportError::Inventory(InventoryError::EmptySource { .. }))
        ));
        assert_eq!(rig.machine.active_chains(), 0);
        assert!(rig.scheduler.is_empty());
        assert!(rig.deferred.is_empty());
    }

    #[test]
    fn test_load_chain_lifts_hauls_and_retires() {
        let mut rig = Rig::new(SimulationConfig::default());
        let zone = ZoneIndex::new(2).unwrap();
        let shelf = Vec3::new(0.0, 2.0, -12.0);
        rig.scene.store.add_product(zone, ProductCategory::Wheel, shelf).unwrap();
        let id = rig.load(2).unwrap();

        rig.run_for(500);
        let lifted = rig.scene.store.product(id).unwrap().position;
        assert_relative_eq!(lifted, Vec3::new(0.0, 4.0, -12.0), epsilon = 1e-5);

        rig.run_for(1000);
        let hauled = rig.scene.store.product(id).unwrap().position;
        assert_relative_eq!(hauled, Vec3::new(10.0, 3.0, 8.0), epsilon = 1e-5);
        assert_eq!(rig.scene.store.ownership(id), Some(Ownership::InTransitToTruck));

        rig.run_for(300);
        assert_relative_eq!(rig.scene.store.product(id).unwrap().position.y, 2.0, epsilon = 1e-5);
        assert_eq!(rig.scene.store.ownership(id), Some(Ownership::OwnedByTruck));

        rig.run_for(100);
        assert_eq!(rig.scene.store.ownership(id), Some(Ownership::OwnedByTruck));
        rig.run_for(100);
        assert_eq!(rig.scene.store.ownership(id), Some(Ownership::Removed));
        assert_eq!(rig.machine.active_chains(), 0);

        let events = rig.events.drain();
        assert_eq!(
            events,
            vec![
                SimEvent::ProductLoaded { product: id, zone },
                SimEvent::ProductStowed { product: id },
                SimEvent::ProductRetired { product: id },
            ]
        );
    }

    #[test]
    fn test_dispatch_legs_and_states() {
        let mut rig = Rig::new(SimulationConfig::default());
        rig.dispatch().unwrap();
        assert_eq!(rig.scene.truck.state(), TruckState::Departing);
        assert_eq!(rig.machine.legs_out(), 2);

        rig.run_for(1000);
        assert_relative_eq!(rig.scene.truck.position(), Vec3::new(10.0, 0.0, 15.0), epsilon = 1e-5);
        assert_relative_eq!(rig.scene.truck.yaw(), 0.0);

        rig.run_for(1500);
        assert_relative_eq!(rig.scene.truck.position(), Vec3::new(30.0, 0.0, 15.0), epsilon = 1e-5);
        assert_relative_eq!(rig.scene.truck.yaw(), constants::HALF_PI, epsilon = 1e-5);
        assert_eq!(rig.scene.truck.state(), TruckState::Returning);

        rig.run_for(400);
        assert_eq!(rig.scene.truck.state(), TruckState::Returning);
        rig.run_for(100);
        assert_relative_eq!(rig.scene.truck.position(), Vec3::new(10.0, 0.0, 8.0));
        assert_relative_eq!(rig.scene.truck.yaw(), 0.0);
        assert_eq!(rig.scene.truck.state(), TruckState::Idle);
        assert_eq!(rig.machine.active_chains(), 0);
    }

    #[test]
    fn test_dispatch_while_out_is_rejected() {
        let mut rig = Rig::new(SimulationConfig::default());
        rig.dispatch().unwrap();
        rig.run_for(300);
        assert_eq!(
            rig.dispatch(),
            Err(TransportError::TruckBusy {
                state: TruckState::Departing
            })
        );
        assert_eq!(rig.machine.legs_out(), 2);
    }

    #[test]
    fn test_overlapping_dispatch_replaces_legs() {
        let config = SimulationConfig::default()
            .with_transport(TransportConfig::default().with_overlapping_dispatch(true));
        let mut rig = Rig::new(config);
        rig.dispatch().unwrap();
        rig.run_for(1200);
        rig.dispatch().unwrap();
        assert_eq!(rig.machine.legs_out(), 2);
        assert_eq!(rig.machine.active_chains(), 2);

        rig.run_for(3000);
        assert_eq!(rig.scene.truck.state(), TruckState::Idle);
        assert_relative_eq!(rig.scene.truck.position(), Vec3::new(10.0, 0.0, 8.0));
    }
}
