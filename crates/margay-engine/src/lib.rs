#![doc = include_str!("../README.md")]

pub mod eval;
pub mod exhaustive;
pub mod pipeline;
pub mod result;
pub mod search;

pub use eval::{evaluate, satisfying_points};
pub use pipeline::{run, EngineError, EngineMode, RunOptions};
pub use result::{RunReport, Witness};
pub use search::TraceSearch;
