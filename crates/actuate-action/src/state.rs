//! Execution states and their groups.
//!
//! Every state is a single bit so that group membership is one mask test:
//! Candidate -> Init -> Will -> Do -> Did/Canceled/Failed

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an execution. Exactly one is current at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum State {
    Candidate = 0b0000_0001,
    Init = 0b0000_0010,
    Will = 0b0000_0100,
    Do = 0b0000_1000,
    Did = 0b0001_0000,
    Canceled = 0b0010_0000,
    Failed = 0b0100_0000,
}

/// A set of states, stored as the union of their bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateSet(u8);

impl StateSet {
    pub const EXECUTING: StateSet = StateSet::of(&[State::Init, State::Will, State::Do]);
    pub const REJECTED: StateSet = StateSet::of(&[State::Canceled, State::Failed]);
    pub const FINISHED: StateSet = StateSet::of(&[State::Did, State::Canceled, State::Failed]);
    pub const CANCELABLE: StateSet = StateSet::of(&[State::Init, State::Will]);
    pub const EDITABLE: StateSet = StateSet::of(&[State::Candidate, State::Init]);

    /// Build a set from a list of states.
    pub const fn of(states: &[State]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < states.len() {
            bits |= states[i] as u8;
            i += 1;
        }
        StateSet(bits)
    }

    pub const fn contains(self, state: State) -> bool {
        self.0 & state as u8 != 0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl State {
    pub const ALL: [State; 7] = [
        State::Candidate,
        State::Init,
        State::Will,
        State::Do,
        State::Did,
        State::Canceled,
        State::Failed,
    ];

    pub const fn bit(self) -> u8 {
        self as u8
    }

    pub const fn is_candidate(self) -> bool {
        matches!(self, State::Candidate)
    }

    pub const fn is_executing(self) -> bool {
        StateSet::EXECUTING.contains(self)
    }

    pub const fn is_rejected(self) -> bool {
        StateSet::REJECTED.contains(self)
    }

    pub const fn is_finished(self) -> bool {
        StateSet::FINISHED.contains(self)
    }

    pub const fn is_cancelable(self) -> bool {
        StateSet::CANCELABLE.contains(self)
    }

    pub const fn is_editable(self) -> bool {
        StateSet::EDITABLE.contains(self)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Candidate => write!(f, "candidate"),
            State::Init => write!(f, "init"),
            State::Will => write!(f, "will"),
            State::Do => write!(f, "do"),
            State::Did => write!(f, "did"),
            State::Canceled => write!(f, "canceled"),
            State::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for State {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidate" => Ok(State::Candidate),
            "init" => Ok(State::Init),
            "will" => Ok(State::Will),
            "do" => Ok(State::Do),
            "did" => Ok(State::Did),
            "canceled" => Ok(State::Canceled),
            "failed" => Ok(State::Failed),
            _ => Err(format!("Unknown execution state: {}", s)),
        }
    }
}
