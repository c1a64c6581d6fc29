//! Version-control command vocabulary
//!
//! The publisher talks to version control only through command lines built
//! here, so any system with equivalent primitives can be plugged in.

pub mod git_commands;

pub use git_commands::{GitCommands, VersionControl};
