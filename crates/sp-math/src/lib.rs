//! Sales pipeline math utilities.

pub mod math;

pub use math::describe::*;
