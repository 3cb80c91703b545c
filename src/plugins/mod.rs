pub mod registry;
pub mod subdb;
