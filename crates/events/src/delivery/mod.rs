//! Concrete notifiers.
//!
//! Email goes through SMTP; SMS and WhatsApp go through the Twilio messaging
//! API and differ only in how addresses are written.

pub mod email;
pub mod twilio;
