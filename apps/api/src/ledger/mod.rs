// Points ledger reads: the per-user profile and the leaderboard.
// Writes to `users.points` happen only inside the store's batches.

pub mod handlers;
pub mod service;
