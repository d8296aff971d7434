//! Vertex and color types

use bytemuck::{Pod, Zeroable};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// Packed RGBA color, stored as `0xRRGGBBAA`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(transparent)]
pub struct Color(pub u32);

/// Color given to vertices that carry no color of their own (opaque white)
pub const DEFAULT_COLOR: Color = Color(0xFFFF_FFFF);

impl Color {
    /// Pack four 8-bit channels
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_be_bytes([r, g, b, a]))
    }

    /// Pack three 8-bit channels with full opacity
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba(r, g, b, 0xFF)
    }

    /// Unpack into `[r, g, b, a]`
    pub const fn rgba(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl Default for Color {
    fn default() -> Self {
        DEFAULT_COLOR
    }
}

/// A mesh vertex: position plus packed color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Vertex {
    pub position: Point3f,
    pub color: Color,
}

unsafe impl Pod for Vertex {}
unsafe impl Zeroable for Vertex {}

impl Vertex {
    /// Create a vertex with the default color
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Point3f::new(x, y, z),
            color: DEFAULT_COLOR,
        }
    }

    /// Replace the color of this vertex
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Point3f::origin(),
            color: DEFAULT_COLOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_color_packing() {
        let color = Color::from_rgba(0x12, 0x34, 0x56, 0x78);
        assert_eq!(color.0, 0x1234_5678);
        assert_eq!(color.rgba(), [0x12, 0x34, 0x56, 0x78]);
        assert_eq!(Color::from_rgb(1, 2, 3).rgba(), [1, 2, 3, 255]);
        assert_eq!(Color::default(), DEFAULT_COLOR);
    }

    #[test]
    fn test_vertex_layout_has_no_padding() {
        assert_eq!(std::mem::size_of::<Vertex>(), 16);
        let vertices = [Vertex::new(1.0, 2.0, 3.0), Vertex::default()];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 32);
    }

    #[test]
    fn test_vertex_defaults() {
        let vertex = Vertex::default();
        assert_relative_eq!(vertex.position, Point3f::origin());
        assert_eq!(vertex.color, DEFAULT_COLOR);

        let red = Vertex::new(0.0, 1.0, 0.0).with_color(Color::from_rgb(255, 0, 0));
        assert_relative_eq!(red.position, Point3f::new(0.0, 1.0, 0.0));
        assert_eq!(red.color.rgba(), [255, 0, 0, 255]);
    }
}
