pub mod config;
pub mod report;
pub mod verify;

pub use config::*;
pub use report::*;
pub use verify::*;
