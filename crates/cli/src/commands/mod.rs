pub mod dump;
pub mod probe;

pub use dump::*;
pub use probe::*;
