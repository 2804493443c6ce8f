mod local;
mod traits;

pub use local::LocalService;
pub use traits::{ServiceError, TaskForm, TaskService};
