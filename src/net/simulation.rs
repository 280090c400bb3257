//! Random simulation driver.
//!
//! Each step collects the firable transitions in registry order and draws one
//! of them, chosen uniformly with the supplied [`Rng`]. Runs are reproducible
//! for a given seed and net.
//!
//! A transition can be firable and still fail to draw, e.g. when an `Empty`
//! edge and a `WeightedIn` edge read the same place. The failed draw leaves
//! the marking untouched; it is recorded as a rejection and another candidate
//! is picked for the same step. A step whose candidates all fail counts as
//! idle.
use rand::Rng;

use crate::net::core::Net;
use crate::net::error::NetError;
use crate::net::ids::TransitionId;
use crate::options::{DeadlockPolicy, SimulationOptions};

/// A firable transition whose draw failed and was rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedDraw {
    pub step: u64,
    pub transition: TransitionId,
    pub error: NetError,
}

/// What happened at each step of a run: the transition drawn, or `None` for
/// a step where nothing could be drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationTrace {
    steps: Vec<Option<TransitionId>>,
    rejected: Vec<RejectedDraw>,
    halted: bool,
}

impl SimulationTrace {
    pub fn steps(&self) -> &[Option<TransitionId>] {
        &self.steps
    }

    pub fn fired(&self) -> impl Iterator<Item = TransitionId> + '_ {
        self.steps.iter().flatten().copied()
    }

    pub fn fired_count(&self) -> usize {
        self.fired().count()
    }

    pub fn idle_count(&self) -> usize {
        self.steps.len() - self.fired_count()
    }

    pub fn rejected(&self) -> &[RejectedDraw] {
        &self.rejected
    }

    /// True when the run stopped early under [`DeadlockPolicy::Halt`].
    pub fn halted(&self) -> bool {
        self.halted
    }
}

impl Net {
    /// Runs `steps` steps using the net's own RNG. Steps where nothing can be
    /// drawn leave the net untouched.
    pub fn launch_simulation(&mut self, steps: u64) -> SimulationTrace {
        self.simulate_with_own_rng(steps, DeadlockPolicy::Idle)
    }

    /// Same as [`Net::launch_simulation`] with a caller-supplied random source.
    pub fn launch_simulation_with<R>(&mut self, steps: u64, rng: &mut R) -> SimulationTrace
    where
        R: Rng,
    {
        self.simulate(steps, DeadlockPolicy::Idle, rng)
    }

    /// Runs a simulation configured by `options`, reseeding the net's RNG
    /// first when a seed is given.
    pub fn run(&mut self, options: &SimulationOptions) -> SimulationTrace {
        if let Some(seed) = options.seed {
            self.reseed(seed);
        }
        self.simulate_with_own_rng(options.steps, options.on_deadlock)
    }

    fn simulate_with_own_rng(&mut self, steps: u64, policy: DeadlockPolicy) -> SimulationTrace {
        let mut rng = self.rng.clone();
        let trace = self.simulate(steps, policy, &mut rng);
        self.rng = rng;
        trace
    }

    fn simulate<R>(&mut self, steps: u64, policy: DeadlockPolicy, rng: &mut R) -> SimulationTrace
    where
        R: Rng,
    {
        let mut trace = SimulationTrace::default();

        for step in 0..steps {
            let mut candidates = self.firable();
            let mut drawn = None;
            while !candidates.is_empty() {
                let chosen = candidates.remove(rng.random_range(0..candidates.len()));
                log::trace!("step {step}: drawing {chosen}");
                match self.draw(chosen) {
                    Ok(()) => {
                        drawn = Some(chosen);
                        break;
                    }
                    Err(error) => {
                        log::warn!("step {step}: firable {chosen} failed to draw: {error}");
                        trace.rejected.push(RejectedDraw {
                            step,
                            transition: chosen,
                            error,
                        });
                    }
                }
            }

            if drawn.is_none() {
                log::trace!("step {step}: nothing drawable");
                if policy == DeadlockPolicy::Halt {
                    trace.halted = true;
                    break;
                }
            }
            trace.steps.push(drawn);
        }

        log::info!(
            "simulation finished after {} steps: {} fired, {} idle{}",
            trace.steps.len(),
            trace.fired_count(),
            trace.idle_count(),
            if trace.halted { ", halted" } else { "" }
        );
        trace
    }
}
