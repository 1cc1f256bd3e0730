mod task;

pub use task::{MAX_DESCRIPTION_LEN, Task, TaskStatus, derive_status};
