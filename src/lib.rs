pub mod action;
pub mod clock;
pub mod config;
pub mod error;
pub mod goals;
pub mod logging;
pub mod planning;
pub mod runner;
pub mod types;
