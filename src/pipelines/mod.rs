//! Workflow pipelines orchestrating the adapters and services.

pub mod sign;

pub use sign::{
    ReadyToSign, Selection, SigningWorkflow, WorkflowOptions, WorkflowPhase, WorkflowState,
};
