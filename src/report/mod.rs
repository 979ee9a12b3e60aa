//! Report module - summarizing training results

pub mod export;
pub mod summary;
pub mod training_report;

pub use export::*;
pub use summary::*;
pub use training_report::*;
