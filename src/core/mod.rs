pub mod engine;
pub mod events;
pub mod fingerprint;
pub mod model;
pub mod planner;
pub mod saver;
pub mod scanner;
