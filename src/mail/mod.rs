pub mod mailer;
pub mod smtp;
pub mod template;

pub use mailer::{MailError, Mailer, OutgoingEmail};
pub use smtp::{EmailConfig, LogMailer, SmtpMailer};
