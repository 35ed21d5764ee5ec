pub mod task;
pub mod tid;

pub use task::Task;
pub use tid::{Tid, TidHandle, tid_alloc};
