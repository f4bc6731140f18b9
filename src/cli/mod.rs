//! Invocation surface: the run workflow and the outputs it reports

pub mod orchestration;
pub mod output;

pub use orchestration::{run_reconciliation, ReconcileArgs, RunOutcome};
pub use output::{write_outputs, ActionOutputs};
