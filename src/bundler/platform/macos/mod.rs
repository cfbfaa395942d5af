//! macOS disk image support.

pub mod dmg;
