pub mod indicators;
pub mod mood;
pub mod profile;

#[cfg(test)]
mod indicators_tests;

pub use indicators::*;
pub use mood::*;
pub use profile::*;
