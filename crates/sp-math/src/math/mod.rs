//! Core math modules.

pub mod describe;
