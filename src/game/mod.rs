//! Game simulation modules

pub mod collision;
pub mod engine;
pub mod entities;
pub mod pause;
pub mod physics;
pub mod restart;
pub mod snapshot;
pub mod spawn;
pub mod world;

pub use world::World;
