//! Parsing simulation options.
//! `--steps {n}` or `-n`, `--seed {u64}` or `-s`, `--on-deadlock {idle|halt}` or `-d`
//!
//! The same flags are read from the `PETRI_FLAGS` environment variable by
//! [`SimulationOptions::from_env`].

use clap::{Arg, Command, value_parser};
use thiserror::Error;

pub const FLAGS_ENV: &str = "PETRI_FLAGS";

const DEFAULT_STEPS: u64 = 100;

/// What a simulation step does when no transition is firable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeadlockPolicy {
    /// The step is spent without mutating the net; the run continues.
    #[default]
    Idle,
    /// The run stops at the first step with nothing to fire.
    Halt,
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("malformed option string: {0}")]
    Split(#[from] shellwords::MismatchedQuotes),
    #[error(transparent)]
    Parse(#[from] clap::Error),
}

fn make_options_parser() -> Command {
    Command::new("petri-flow")
        .no_binary_name(true)
        .version("v0.1.0")
        .arg(
            Arg::new("steps")
                .short('n')
                .long("steps")
                .help("Number of simulation steps")
                .value_parser(value_parser!(u64))
                .default_value("100"),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .help("Seed for transition selection; omitted means seeded from the OS")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("on-deadlock")
                .short('d')
                .long("on-deadlock")
                .help("Behaviour when no transition is firable")
                .value_parser(["idle", "halt"])
                .default_value("idle"),
        )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOptions {
    pub steps: u64,
    pub seed: Option<u64>,
    pub on_deadlock: DeadlockPolicy,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        SimulationOptions {
            steps: DEFAULT_STEPS,
            seed: None,
            on_deadlock: DeadlockPolicy::Idle,
        }
    }
}

impl SimulationOptions {
    pub fn parse_from_str(s: &str) -> Result<Self, OptionsError> {
        let flags = shellwords::split(s)?;
        Self::parse_from_args(&flags)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self, OptionsError> {
        let matches = make_options_parser().try_get_matches_from(flags.iter())?;

        let steps = matches
            .get_one::<u64>("steps")
            .copied()
            .unwrap_or(DEFAULT_STEPS);
        let seed = matches.get_one::<u64>("seed").copied();
        let on_deadlock = match matches.get_one::<String>("on-deadlock").map(String::as_str) {
            Some("halt") => DeadlockPolicy::Halt,
            _ => DeadlockPolicy::Idle,
        };

        Ok(SimulationOptions {
            steps,
            seed,
            on_deadlock,
        })
    }

    /// Options from `PETRI_FLAGS`, or the defaults when it is unset.
    pub fn from_env() -> Result<Self, OptionsError> {
        match std::env::var(FLAGS_ENV) {
            Ok(flags) => Self::parse_from_str(&flags),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn with_steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_deadlock_policy(mut self, policy: DeadlockPolicy) -> Self {
        self.on_deadlock = policy;
        self
    }
}
