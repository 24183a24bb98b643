pub mod cadence;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod keyboard;
pub mod lexicon;
pub mod model;
pub mod progress;
pub mod sim;
pub mod sink;
pub mod trace;

pub use error::TypingError;
