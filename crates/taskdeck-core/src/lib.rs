pub mod due_date;
pub mod task;

pub use task::{Category, Color, Comment, Status, Task};
