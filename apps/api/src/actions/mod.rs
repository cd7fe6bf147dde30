// Action log intake. Every recorded action is followed by a badge
// evaluation pass for the same user.

pub mod handlers;
pub mod service;
