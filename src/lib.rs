//! # wirefront
//!
//! A streaming Wavefront OBJ loader producing wireframe meshes.
//!
//! This is the umbrella crate that provides convenient access to all wirefront
//! functionality. You can use this crate to get everything in one place, or use
//! the individual crates for more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: sequence container, vertices, colors and wireframe meshes
//! - **I/O**: streaming OBJ tokenizer, semantic parser and file loading
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wirefront::prelude::*;
//!
//! let mut mesh = load("model.obj")?;
//! for (a, b) in mesh.lines() {
//!     println!("{:?} -> {:?}", a.position, b.position);
//! }
//! unload(&mut mesh);
//! # Ok::<(), wirefront::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables io
//! - `io`: OBJ loading

// Re-export core functionality
pub use wirefront_core::*;

#[cfg(feature = "io")]
pub use wirefront_io as io;

/// Convenient imports for common use cases
pub mod prelude {
    pub use wirefront_core::*;

    #[cfg(feature = "io")]
    pub use wirefront_io::{
        load, load_dir, load_many, read_mesh, tokenize, tokenize_file, unload, Command,
        Diagnostic, DiagnosticKind, LoadReport, MeshReader, ObjLoadOptions, ObjParser,
        ObjReader, Token, TokenHandler, TokenKind, Tokenizer,
    };
}
