pub mod entity;
pub mod send;
pub mod template;
pub mod validation;
