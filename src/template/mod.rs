//! Template text handling: flattening submission data and rendering bodies.

pub mod flatten;
pub mod renderer;
