//! Router - table-driven successor lookup.
//!
//! Step functions compute results only; what runs next is decided here, after
//! the step has executed. Keeping the table outside the steps lets a step be
//! reused in a different flow by swapping the table.

use super::step::Step;

/// Successor table for the standard setup flow.
const SETUP_FLOW: [(Step, Step); 10] = [
    (Step::Greeting, Step::ClassifyDomain),
    (Step::ClassifyDomain, Step::AskActions),
    (Step::AskActions, Step::ExtractActions),
    (Step::ExtractActions, Step::AskSegments),
    (Step::AskSegments, Step::ExtractSegments),
    (Step::ExtractSegments, Step::AskGoals),
    (Step::AskGoals, Step::ExtractGoals),
    (Step::ExtractGoals, Step::Complete),
    (Step::Complete, Step::End),
    (Step::End, Step::End),
];

/// Pure, total mapping from a step to its successor.
#[derive(Debug, Clone, Copy)]
pub struct Router {
    table: &'static [(Step, Step)],
}

impl Router {
    /// Router for the standard setup flow.
    pub fn setup_flow() -> Self {
        Self { table: &SETUP_FLOW }
    }

    /// Returns the step that follows `step`.
    ///
    /// Steps absent from the table route to the terminal marker.
    pub fn next(&self, step: Step) -> Step {
        self.table
            .iter()
            .find(|(from, _)| *from == step)
            .map(|(_, to)| *to)
            .unwrap_or(Step::End)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::setup_flow()
    }
}
