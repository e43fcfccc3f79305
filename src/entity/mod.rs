//! Participants and the per-trial world they live in

pub mod enemy;
pub mod state;

pub use enemy::Enemy;
pub use state::WorldState;
