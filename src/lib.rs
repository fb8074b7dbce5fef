// Library crate: the controller and everything it drives. main.rs is the
// command-line front end; the integration tests use this crate directly.

pub mod assertions;
pub mod backend;
pub mod config;
pub mod controller;
pub mod detail;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod model;
pub mod render;
pub mod state;
pub mod terminal;
pub mod variables;
pub mod view;
