//! World module - model ingestion
//!
//! Turns Wavefront OBJ text into meshes of flat primitives.

mod obj;

pub use obj::*;
