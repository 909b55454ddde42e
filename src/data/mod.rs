//! Time-indexed tables and their preparation for regression

pub mod frame;
pub mod processor;
pub mod synthetic;

pub use frame::{Frame, FrameError};
pub use processor::{ChronologicalSplit, Dataset, SplitRule};
