pub mod outcome;
pub mod process;
pub mod question_buffer;

pub use outcome::{preview, Acknowledgement, DirectOutcome, SubmissionOutcome};
pub use process::{ProcessReply, ProcessRequest};
pub use question_buffer::QuestionBuffer;
