//! Truck loading and dispatch
//!
//! Both requests are driven as chains: a fixed list of [`StagePlan`]s walked
//! by [`TransportStateMachine`]. A tweened stage becomes an animation task
//! whose continuation names the stage; a snap stage becomes a deferred
//! callback. Whichever fires, the machine applies the stage's side effect
//! and starts the next stage.

pub mod machine;
pub mod stage;
pub mod truck;

pub use machine::{ChainId, DispatchLeg, StageStep, TransportContext, TransportError, TransportStateMachine};
pub use stage::{DispatchStage, LoadStage, StageMotion, StageName, StagePlan, StageTarget};
pub use truck::{Truck, TruckState};
