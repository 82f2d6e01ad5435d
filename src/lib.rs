pub mod cli;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod formats;
pub mod pipeline;
pub mod preview;
pub mod report;
pub mod selection;
pub mod session;
pub mod util;
