pub mod cursor;
pub mod task;

pub use cursor::{CycleEnd, RefreshCursor};
pub use task::{RefreshLoop, StartError};
