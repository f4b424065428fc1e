pub mod calculator;
pub mod policy;

pub use calculator::*;
pub use policy::*;
