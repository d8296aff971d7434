//! Core data structures for wirefront
//!
//! This crate provides the fundamental types shared by the OBJ loader:
//! an ordered, cursor-addressable sequence container used as the growable
//! buffer during parsing, vertices with packed colors, and wireframe meshes
//! made of a vertex buffer and an edge index buffer.

pub mod error;
pub mod mesh;
pub mod sequence;
pub mod vertex;

pub use error::*;
pub use mesh::*;
pub use sequence::{Cursor, Sequence};
pub use vertex::*;
