pub mod smtp_transport;
