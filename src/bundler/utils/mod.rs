//! Filesystem and process helpers shared by the disk image workflow.

pub mod command;
pub mod fs;
