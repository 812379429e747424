pub mod access;
pub mod gate;
pub mod policy;

pub use gate::{AuthenticationGate, GateOutcome, GateState};
pub use policy::{AuthorizationPolicy, Denial, Requirement, Rule};
