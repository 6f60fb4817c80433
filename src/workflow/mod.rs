pub mod accumulation;
pub mod direct_entry;
pub mod dispatch;
pub mod submission;

pub use accumulation::AccumulationController;
pub use direct_entry::DirectEntry;
pub use submission::SubmissionController;
