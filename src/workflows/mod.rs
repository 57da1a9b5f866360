// Workflow descriptors and request status transitions
// One engine serves every workflow; these types say what each one supports.

pub mod descriptor;
pub mod state_machine;

pub use descriptor::{Step, Workflow, WorkflowSpec};
pub use state_machine::{RequestStatus, StateTransition, TransitionResult};
