//! AI picture frame: prompt in, framed picture on an e-ink panel out.
//!
//! Wires the compositor, the history store and the generation client into
//! the frame's commands.

pub mod bootstrap;
pub mod chooser;
pub mod commands;
pub mod config;
pub mod display;

pub use bootstrap::{build_app, init_foundation};
pub use commands::{FrameApp, ImageSource};
