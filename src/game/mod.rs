pub mod constants;
pub mod match_result;
pub mod snapshot;
pub mod state;
pub mod systems;
pub mod tournament;
