//! Keyboard-wedge input handling.
//!
//! - [`assembler`] turns a keystroke stream into discrete [`ScanEvent`]s.
//! - [`classifier`] decides what a scan string means before any decoding.
//! - [`keymap`] maps raw characters to keystrokes.
//! - [`timer`] is the injected idle-timer seam.

pub mod assembler;
pub mod classifier;
pub mod keymap;
pub mod timer;

pub use assembler::{IdleTimeouts, ScanAssembler, ScanEvent};
pub use classifier::{Classification, Classifier, Command, CommandVocabulary};
pub use keymap::{Control, KeyInput, KeyMap, TerminatorKey, UnknownTerminatorKey};
pub use timer::{IdleScheduler, SimulatedScheduler, TimerId};
