// Challenge submission pipeline.
// No real verification happens: only link proofs are shape-checked. Badge
// evaluation is left to the caller (see `POST /api/v1/actions` and `GET /api/v1/badges`).

pub mod classify;
pub mod handlers;
pub mod pipeline;
