// Quiz scoring, the improvement-only award, and the progression gate.
// `scoring` and `gate` are pure; `service` wires them to the store.

pub mod gate;
pub mod handlers;
pub mod scoring;
pub mod service;
