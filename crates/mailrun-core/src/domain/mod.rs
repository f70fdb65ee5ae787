//! Domain model (tasks, outcomes, file states, identifiers, errors).

pub mod errors;
pub mod ids;
pub mod outcome;
pub mod state;
pub mod task;

pub use errors::{ErrorKind, LookupError, MailrunError};
pub use ids::{ArtifactId, ContentId};
pub use outcome::DeliveryOutcome;
pub use state::{MessageFileState, TaskFileState};
pub use task::{
    MailerFields, NormalizedTask, QueuedTask, RecipientEntry, RenderedRecipient, RenderedTask,
    ServiceKind, Substitutions, TaskBody, TaskRecord,
};
