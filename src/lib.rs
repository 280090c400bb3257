//! Discrete token-flow engine with Petri-net firing semantics.
//!
//! See [`net`] for the data model and firing rules, [`options`] for
//! simulation configuration.
#![warn(non_snake_case)]

pub mod logging;
pub mod net;
pub mod options;

pub use net::{Net, NetError, NetResult};
pub use options::{DeadlockPolicy, SimulationOptions};
