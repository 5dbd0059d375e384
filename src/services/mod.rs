pub mod payment;
pub mod proof_upload;
pub mod status;
pub mod submission;

pub use payment::PaymentService;
pub use proof_upload::{validate_submission, PaymentProofUploader};
pub use status::{derive_actions, BookingAction, BookingStatusView, BookingStatusViewer};
pub use submission::{validate_form, BookingSubmissionService, SubmissionStatus};
