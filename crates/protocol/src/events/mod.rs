//! Event definitions for the sendoff wire protocol.
//!
//! This module contains both client -> server and server -> client event
//! types. Events travel as JSON text frames, adjacently tagged:
//!
//! ```json
//! { "event": "join-game", "data": { "code": "AB1X9", "name": "Maya" } }
//! ```
//!
//! Event names keep the original kebab-case socket vocabulary; payload
//! fields are camelCase. Events that carry a single bare value on the wire
//! (`timer-tick`, `update-pitcher`, `show-results`, ...) serialize that
//! value directly as `data`.

mod client;
mod server;

pub use client::*;
pub use server::*;
