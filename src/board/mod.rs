//! Lead Board
//!
//! Engine, projection and drop controller for the Kanban board.

mod controller;
mod engine;
mod projection;

pub use controller::*;
pub use engine::*;
pub use projection::*;
