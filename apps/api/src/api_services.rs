mod database;
mod state_builder;

pub use database::connect_and_migrate;
pub use state_builder::build_app_state;
#[cfg(test)]
pub use state_builder::{ServiceAdapters, assemble_app_state};
