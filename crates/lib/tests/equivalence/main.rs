//! Golden tests comparing wrapped operations against the native tools they mirror.

mod common;
mod file_tests;
mod runner_tests;
mod archive_tests;
