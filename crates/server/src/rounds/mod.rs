//! Per-mini-game round logic.
//!
//! Each mini-game owns its ephemeral round state, its display text, and its
//! handler impls on [`Hub`](crate::server::hub::Hub). The session's phase
//! machine and tally arithmetic live in `session` and `scoring`; these
//! modules wire client events to them.

pub mod game1;
pub mod game2;
pub mod game3;
pub mod game4;
