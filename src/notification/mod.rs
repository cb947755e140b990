//! Turning stored emails into delivered messages.

pub mod local;
pub mod message;
pub mod recipients;
pub mod sender;
pub mod smtp;
pub mod transport;
