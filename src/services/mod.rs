pub mod archiver;
pub mod assembler;
pub mod capturer;
pub mod submitter;

pub use archiver::ArchiveFinalizer;
pub use assembler::ReceiptAssembler;
pub use capturer::ArtifactCapturer;
pub use submitter::{run_submit_loop, OrderSubmitter, RetryPolicy, SubmissionState, SubmitSurface};
