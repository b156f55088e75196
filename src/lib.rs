//! Route-propagation engine and policy framework for measuring how RPKI
//! origin validation, Path-End validation, BGPsec, and ASPA mitigate BGP
//! route hijacks over a business-relationship AS graph.

pub mod as_graph;
pub mod engine;
pub mod fraction;
pub mod io;
pub mod policy;
pub mod pool;
pub mod route;
pub mod shared;

pub use as_graph::{ASGraph, RelEdge, AS};
pub use engine::{hijack_n_hops, propagate_from, run_trial, success_rate, Trial};
pub use fraction::Fraction;
pub use policy::{accept, forward_to, prefer, validate_aspa, AspaVerdict, Policy};
pub use pool::{parallelism_from_env, StopFlag, TrialOutcome, TrialPool};
pub use route::Route;
pub use shared::{
    InvalidRelFile, InvariantViolation, NoRoute, Relation, SimulatorError, UnknownAS, ASN,
};
