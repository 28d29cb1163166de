pub mod arena;
pub mod combat;
pub mod mortality;
pub mod steering;
