//! Queue module: normalization, recipient expansion and the task queue.

mod expand;
mod normalize;
mod task_queue;

pub use expand::{BodyTemplates, expand, expand_recipient};
pub use normalize::{Normalization, normalize, split_recipients};
pub use task_queue::{Popped, TaskQueue};
