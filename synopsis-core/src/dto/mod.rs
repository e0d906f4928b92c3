//! Data Transfer Objects
//!
//! Wire shapes exchanged with external systems. DTOs are kept separate from
//! the domain types so payload quirks do not leak into the core logic.

pub mod event;
pub mod job;
