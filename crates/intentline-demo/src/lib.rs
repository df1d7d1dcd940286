pub mod cli;
pub mod report;
pub mod runner;

pub use cli::*;
pub use report::*;
pub use runner::*;
