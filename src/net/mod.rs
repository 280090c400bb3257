//! # Place/transition nets with typed edges
//!
//! A [`Net`] owns three registries: places holding non-negative token counts,
//! transitions, and the edges joining them. Transitions and edges refer to
//! each other only through handles ([`EdgeId`], [`PlaceId`],
//! [`TransitionId`]); the net keeps both sides of every link in agreement.
//!
//! * a transition is **drawable** when every incoming edge is activable
//!   (`WeightedIn`: `M[p] >= w`, `Empty`: `M[p] >= 1`, `Zero`: `M[p] == 0`);
//! * **drawing** it activates the incoming edges in insertion order, then the
//!   outgoing ones, so a place that is both input and output is drained
//!   before it is refilled;
//! * [`Net::launch_simulation`] repeatedly draws a uniformly chosen firable
//!   transition using a seedable RNG.
//!
//! ## Example
//!
//! ```rust
//! use petri_flow::net::Net;
//!
//! let mut net = Net::with_seed(0);
//! let p0 = net.add_place(2);
//! let p1 = net.add_place(0);
//! let t0 = net.add_transition();
//!
//! net.add_input_edge(2, p0, t0).unwrap();
//! net.add_output_edge(3, t0, p1).unwrap();
//!
//! assert_eq!(net.firable(), vec![t0]);
//! net.step_simulation(t0).unwrap();
//! assert_eq!(net.tokens(p0), Ok(0));
//! assert_eq!(net.tokens(p1), Ok(3));
//! ```

pub mod core;
pub mod edge;
pub mod error;
pub mod ids;
pub mod marking;
pub mod place;
pub mod registry;
pub mod simulation;
pub mod transition;

pub use self::core::Net;
pub use edge::{Direction, Edge, EdgeKind};
pub use error::{NetError, NetResult};
pub use ids::{EdgeId, PlaceId, TransitionId};
pub use marking::Marking;
pub use place::{Place, Tokens};
pub use registry::{Idx, Registry};
pub use simulation::{RejectedDraw, SimulationTrace};
pub use transition::Transition;
