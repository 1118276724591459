pub mod delete;
pub mod dishes;
pub mod refresh;
pub mod snapshot;
pub mod status;
