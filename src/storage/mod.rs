//! Storage helpers
//!
//! JSON file writes shared by the backup walker and the settings file.

pub mod file_io;

pub use file_io::write_json_atomic;
