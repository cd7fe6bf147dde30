// Badge catalog and rule evaluation.
// Criteria are pure functions over the action log; the evaluator persists results.

pub mod criteria;
pub mod evaluator;
pub mod handlers;
