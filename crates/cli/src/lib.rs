//! Terminal front end: keystrokes on stdin, notices on stderr, exported rows
//! on stdout.

pub mod driver;
pub mod input;
pub mod scheduler;

pub use driver::Driver;
pub use input::{Utf8Chunker, spawn_stdin_reader};
pub use scheduler::DeadlineScheduler;
