//! Progress values and the report a task hands back after each mutation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// State of one sub-goal: a done flag (animal actions) or an amount (collected items).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressValue {
    Flag(bool),
    Amount(u32),
}

impl ProgressValue {
    pub fn is_done(self) -> bool {
        match self {
            ProgressValue::Flag(done) => done,
            ProgressValue::Amount(n) => n > 0,
        }
    }

    pub fn amount(self) -> u32 {
        match self {
            ProgressValue::Flag(done) => u32::from(done),
            ProgressValue::Amount(n) => n,
        }
    }
}

impl From<bool> for ProgressValue {
    fn from(done: bool) -> Self {
        ProgressValue::Flag(done)
    }
}

impl From<u32> for ProgressValue {
    fn from(n: u32) -> Self {
        ProgressValue::Amount(n)
    }
}

/// Sub-goal name -> state.
pub type ProgressMap = BTreeMap<String, ProgressValue>;

/// What a progress mutation did to the task.
///
/// The registry routes on this instead of the task calling back into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressReport {
    /// The task is completed after this call.
    pub completed: bool,
    /// This call performed the active -> completed transition.
    pub newly_completed: bool,
    /// Progress was merged (false when the task is failed).
    pub applied: bool,
}

impl ProgressReport {
    pub(crate) fn rejected(completed: bool) -> Self {
        Self {
            completed,
            newly_completed: false,
            applied: false,
        }
    }
}
