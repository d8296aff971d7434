//! I/O operations for wireframe meshes
//!
//! This crate loads Wavefront OBJ text into [`Mesh`] values. Loading is split
//! into a streaming [`tokenizer`] and a semantic parser ([`obj::ObjParser`])
//! that turns `v` and `f` lines into a vertex buffer and an edge index buffer.

pub mod error;
pub mod obj;
pub mod tokenizer;

#[cfg(test)]
mod tests;

pub use error::*;
pub use obj::{LoadReport, ObjLoadOptions, ObjParser, ObjReader};
pub use tokenizer::{tokenize, tokenize_file, Token, TokenHandler, TokenKind, Tokenizer};

pub use wirefront_core::{Error, Mesh, Result};

use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<Mesh>;
}

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("obj") => ObjReader::read_mesh(path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

/// Load an OBJ file with default options
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    ObjReader::read_mesh(path)
}

/// Release the buffers of a loaded mesh
pub fn unload(mesh: &mut Mesh) {
    mesh.unload();
}

/// Load several OBJ files in parallel, one result per path in input order
pub fn load_many<P>(paths: &[P]) -> Vec<Result<Mesh>>
where
    P: AsRef<Path> + Sync,
{
    paths.par_iter().map(load).collect()
}

/// Load every `.obj` file directly inside `dir`, pairing each with its path
pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<(PathBuf, Result<Mesh>)>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_obj = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));
        if is_obj && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let meshes = load_many(&paths);
    Ok(paths.into_iter().zip(meshes).collect())
}
