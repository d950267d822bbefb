mod busy;
mod controller;
mod form;
mod notice;
mod render;
mod report;
mod transcript;
mod upload;

pub use controller::SessionController;
pub use form::PredictionForm;
pub use notice::{Notice, NoticeLevel, Notifier};
pub use transcript::{Role, TranscriptEntry};
pub use upload::read_report;
