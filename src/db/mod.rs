//! SQL persistence behind a small synchronous port.

pub mod email_store;
pub mod mysql_adapter;
pub mod port;
