pub mod error;
pub mod mailer;
