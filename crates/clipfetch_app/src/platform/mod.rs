//! Terminal front end: argument parsing, logging, the message loop and
//! effect execution.
mod app;
mod cli;
mod effects;
mod logging;
mod render;

pub use app::run_app;
