//! The `Email` record: addressing rules, validation, and storage.

pub mod address;
pub mod changeset;
pub mod csv;
pub mod entity;
pub mod repository;
