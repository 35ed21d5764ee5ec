mod fs;

pub use fs::*;
