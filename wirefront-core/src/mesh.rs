//! Wireframe mesh data structures
//!
//! A [`Mesh`] keeps a vertex buffer and an index buffer together. The index
//! buffer always holds an even number of entries: every consecutive pair
//! names one undirected edge between two vertex-buffer positions.

use crate::error::{Error, Result};
use crate::vertex::Vertex;
use serde::{Deserialize, Serialize};

/// Position of a vertex inside a [`VertexBuffer`]
pub type Index = u32;

/// Fixed-size buffer of vertices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexBuffer {
    vertices: Box<[Vertex]>,
}

impl VertexBuffer {
    /// Allocate a buffer holding exactly the vertices of `iter`
    pub fn try_from_iter<I>(iter: I) -> Result<Self>
    where
        I: IntoIterator<Item = Vertex>,
        I::IntoIter: ExactSizeIterator,
    {
        Ok(Self {
            vertices: collect_exact(iter)?,
        })
    }

    /// Get the vertex at `index`
    pub fn get(&self, index: Index) -> Option<&Vertex> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.vertices.get(index))
    }

    /// Get the number of vertices
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// View the vertices as a slice
    pub fn as_slice(&self) -> &[Vertex] {
        &self.vertices
    }

    /// View the raw vertex bytes, ready for upload to a GPU buffer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl From<Vec<Vertex>> for VertexBuffer {
    fn from(vertices: Vec<Vertex>) -> Self {
        Self {
            vertices: vertices.into_boxed_slice(),
        }
    }
}

/// Fixed-size buffer of edge indices, two per edge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexBuffer {
    indices: Box<[Index]>,
}

impl IndexBuffer {
    /// Allocate a buffer holding exactly the indices of `iter`.
    ///
    /// Fails with [`Error::InvalidData`] when the count is odd.
    pub fn try_from_iter<I>(iter: I) -> Result<Self>
    where
        I: IntoIterator<Item = Index>,
        I::IntoIter: ExactSizeIterator,
    {
        let iter = iter.into_iter();
        if iter.len() % 2 != 0 {
            return Err(Error::InvalidData(format!(
                "index buffer needs an even number of indices, got {}",
                iter.len()
            )));
        }
        Ok(Self {
            indices: collect_exact(iter)?,
        })
    }

    /// Get the number of indices
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Get the number of edges
    pub fn line_count(&self) -> usize {
        self.indices.len() / 2
    }

    /// Iterate over the edges as index pairs
    pub fn lines(&self) -> impl Iterator<Item = (Index, Index)> + '_ {
        self.indices.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }

    /// View the indices as a slice
    pub fn as_slice(&self) -> &[Index] {
        &self.indices
    }
}

/// A wireframe mesh: vertices plus undirected edges between them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: VertexBuffer,
    pub indices: IndexBuffer,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from its two buffers
    pub fn from_buffers(vertices: VertexBuffer, indices: IndexBuffer) -> Self {
        Self { vertices, indices }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of edges
    pub fn line_count(&self) -> usize {
        self.indices.line_count()
    }

    /// Check if the mesh holds neither vertices nor edges
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Iterate over every edge as a pair of vertices.
    ///
    /// Pairs naming a position outside the vertex buffer are skipped.
    pub fn lines(&self) -> impl Iterator<Item = (&Vertex, &Vertex)> + '_ {
        self.indices
            .lines()
            .filter_map(|(a, b)| Some((self.vertices.get(a)?, self.vertices.get(b)?)))
    }

    /// Release both buffers and leave the mesh empty.
    ///
    /// Unloading an already empty mesh does nothing.
    pub fn unload(&mut self) {
        if self.is_empty() {
            return;
        }
        self.vertices = VertexBuffer::default();
        self.indices = IndexBuffer::default();
    }
}

fn collect_exact<T, I>(iter: I) -> Result<Box<[T]>>
where
    I: IntoIterator<Item = T>,
    I::IntoIter: ExactSizeIterator,
{
    let iter = iter.into_iter();
    let mut items = Vec::new();
    items.try_reserve_exact(iter.len())?;
    items.extend(iter);
    Ok(items.into_boxed_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::Point3f;
    use approx::assert_relative_eq;

    fn triangle() -> Mesh {
        let vertices = VertexBuffer::try_from_iter(vec![
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(1.0, 0.0, 0.0),
            Vertex::new(1.0, 1.0, 0.0),
        ])
        .unwrap();
        let indices = IndexBuffer::try_from_iter(vec![0, 1, 1, 2, 2, 0]).unwrap();
        Mesh::from_buffers(vertices, indices)
    }

    #[test]
    fn test_mesh_counts() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.line_count(), 3);
        assert_eq!(mesh.indices.len(), 6);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn test_lines_resolve_vertices() {
        let mesh = triangle();
        let lines: Vec<(Point3f, Point3f)> = mesh
            .lines()
            .map(|(a, b)| (a.position, b.position))
            .collect();
        assert_eq!(lines.len(), 3);
        assert_relative_eq!(lines[0].0, Point3f::new(0.0, 0.0, 0.0));
        assert_relative_eq!(lines[0].1, Point3f::new(1.0, 0.0, 0.0));
        assert_relative_eq!(lines[2].0, Point3f::new(1.0, 1.0, 0.0));
        assert_relative_eq!(lines[2].1, Point3f::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_lines_skip_out_of_range_pairs() {
        let vertices = VertexBuffer::from(vec![Vertex::default(), Vertex::default()]);
        let indices = IndexBuffer::try_from_iter(vec![0, 1, 1, 7]).unwrap();
        let mesh = Mesh::from_buffers(vertices, indices);
        assert_eq!(mesh.line_count(), 2);
        assert_eq!(mesh.lines().count(), 1);
    }

    #[test]
    fn test_odd_index_count_is_rejected() {
        let result = IndexBuffer::try_from_iter(vec![0, 1, 2]);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_vertex_lookup_is_bounds_checked() {
        let mesh = triangle();
        assert!(mesh.vertices.get(2).is_some());
        assert!(mesh.vertices.get(3).is_none());
        assert_eq!(mesh.vertices.as_bytes().len(), 3 * std::mem::size_of::<Vertex>());
    }

    #[test]
    fn test_unload_twice_is_a_no_op() {
        let mut mesh = triangle();
        mesh.unload();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.line_count(), 0);

        mesh.unload();
        assert!(mesh.is_empty());
        assert_eq!(mesh, Mesh::new());
    }
}
