//! Wavefront OBJ wireframe loading
//!
//! [`ObjParser`] consumes the token stream produced by the
//! [`tokenizer`](crate::tokenizer) and assembles vertices and face outlines.
//! Only `v` and `f` lines are understood. Every face becomes a closed run of
//! undirected edges, so the result is a wireframe rather than a surface.
//!
//! ```text
//! v 0 0 0
//! v 1 0 0
//! v 1 1 0
//! f 1 2 3        -> edges (0,1) (1,2) (2,0)
//! ```

use crate::error::{Command, Diagnostic, DiagnosticKind};
use crate::tokenizer::{tokenize, Token, TokenHandler, TokenKind};
use crate::MeshReader;
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::ops::ControlFlow;
use std::path::Path;
use wirefront_core::{
    Color, Error, Index, IndexBuffer, Mesh, Result, Sequence, Vertex, VertexBuffer, DEFAULT_COLOR,
};

/// Options for loading OBJ files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjLoadOptions {
    /// Color given to every loaded vertex
    pub default_color: Color,
    /// Largest accepted face, `None` for any size
    pub max_face_indices: Option<usize>,
}

impl Default for ObjLoadOptions {
    fn default() -> Self {
        Self {
            default_color: DEFAULT_COLOR,
            max_face_indices: Some(4),
        }
    }
}

impl ObjLoadOptions {
    /// Set the vertex color
    pub fn with_default_color(mut self, color: Color) -> Self {
        self.default_color = color;
        self
    }

    /// Accept faces with any number of indices
    pub fn unbounded_faces(mut self) -> Self {
        self.max_face_indices = None;
        self
    }
}

/// Outcome of a successful load: the mesh plus diagnostics for every line
/// that was skipped or only partly understood
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub mesh: Mesh,
    pub diagnostics: Vec<Diagnostic>,
}

/// Token consumer building a wireframe mesh
pub struct ObjParser {
    options: ObjLoadOptions,
    command: Command,
    counter: usize,
    line: usize,
    position: [f32; 3],
    face: Vec<i64>,
    rejected: Option<DiagnosticKind>,
    vertices: Sequence<Vertex>,
    indices: Sequence<Index>,
    // Faces naming vertices not defined yet: (line, highest position).
    pending: Vec<(usize, Index)>,
    diagnostics: Vec<Diagnostic>,
    failure: Option<Error>,
}

impl Default for ObjParser {
    fn default() -> Self {
        Self::new(ObjLoadOptions::default())
    }
}

impl ObjParser {
    /// Create a parser with empty accumulators
    pub fn new(options: ObjLoadOptions) -> Self {
        Self {
            options,
            command: Command::None,
            counter: 0,
            line: 1,
            position: [0.0; 3],
            face: Vec::new(),
            rejected: None,
            vertices: Sequence::new(),
            indices: Sequence::new(),
            pending: Vec::new(),
            diagnostics: Vec::new(),
            failure: None,
        }
    }

    /// Command the current line is building
    pub fn command(&self) -> Command {
        self.command
    }

    /// Number of vertices accepted so far
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edge indices accepted so far
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Diagnostics collected so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take the error that made the parser stop the tokenizer, if any
    pub fn take_failure(&mut self) -> Option<Error> {
        self.failure.take()
    }

    /// Feed one token.
    ///
    /// Errors are fatal for the load; recoverable problems end up in
    /// [`diagnostics`](Self::diagnostics).
    pub fn accept(&mut self, token: Token<'_>) -> Result<()> {
        self.line = token.line;

        if token.kind == TokenKind::EndLine {
            return self.end_line();
        }
        if token.is_failure() {
            return Ok(());
        }

        match (self.command, token.kind) {
            (Command::None, TokenKind::Text) => match token.text {
                "v" => self.begin(Command::Vertex),
                "f" => self.begin(Command::Face),
                other => self.report(DiagnosticKind::UnknownCommand(other.to_string())),
            },
            (Command::Vertex, TokenKind::Number) => self.vertex_field(token.text),
            (Command::Face, TokenKind::Number) => self.face_field(token.text)?,
            (Command::Vertex | Command::Face, TokenKind::Text) => {
                self.report(DiagnosticKind::UnexpectedText(token.text.to_string()))
            }
            _ => {}
        }

        if self.command == Command::None {
            self.command = Command::Wait;
        }
        Ok(())
    }

    /// Finalize a pending unterminated line and copy the accumulators into
    /// fixed buffers
    pub fn finish(mut self) -> Result<LoadReport> {
        if let Some(failure) = self.failure.take() {
            return Err(failure);
        }
        self.end_line()?;
        if self.indices.len() % 2 != 0 {
            return Err(Error::InvalidData(format!(
                "index buffer needs an even number of indices, got {}",
                self.indices.len()
            )));
        }

        let count = self.vertices.len();
        for (line, highest) in std::mem::take(&mut self.pending) {
            if !defined(highest, count) {
                let raw = (u64::from(highest) + 1).to_string();
                self.report_at(line, DiagnosticKind::IndexOutOfRange(raw));
            }
        }

        let mut edges = Vec::new();
        edges.try_reserve_exact(self.indices.len())?;
        for (a, b) in self.indices.iter().copied().tuples::<(Index, Index)>() {
            if defined(a, count) && defined(b, count) {
                edges.push(a);
                edges.push(b);
            }
        }

        let vertices = VertexBuffer::try_from_iter(self.vertices.iter().copied())?;
        let indices = IndexBuffer::try_from_iter(edges)?;
        debug!(
            "Loaded {} vertices and {} edges ({} diagnostics)",
            vertices.len(),
            indices.line_count(),
            self.diagnostics.len()
        );

        Ok(LoadReport {
            mesh: Mesh::from_buffers(vertices, indices),
            diagnostics: self.diagnostics,
        })
    }

    fn begin(&mut self, command: Command) {
        self.command = command;
        self.counter = 0;
        self.position = [0.0; 3];
        self.face.clear();
        self.rejected = None;
    }

    fn vertex_field(&mut self, text: &str) {
        if self.counter < self.position.len() {
            match coordinate(text) {
                Some(value) => self.position[self.counter] = value,
                None => self.reject(DiagnosticKind::InvalidNumber(text.to_string())),
            }
        }
        self.counter += 1;
    }

    fn face_field(&mut self, text: &str) -> Result<()> {
        let within_bound = self
            .options
            .max_face_indices
            .map_or(true, |max| self.counter < max);

        if within_bound {
            match text.parse::<i64>() {
                Ok(value) => {
                    self.face.try_reserve(1)?;
                    self.face.push(value);
                }
                Err(_) => self.reject(DiagnosticKind::IndexOutOfRange(text.to_string())),
            }
        }
        self.counter += 1;
        Ok(())
    }

    fn end_line(&mut self) -> Result<()> {
        let result = match self.command {
            Command::Vertex => self.complete_vertex(),
            Command::Face => self.complete_face(),
            Command::None | Command::Wait => Ok(()),
        };
        self.counter = 0;
        self.command = Command::None;
        self.rejected = None;
        result
    }

    fn complete_vertex(&mut self) -> Result<()> {
        if !matches!(self.counter, 3 | 4) {
            self.report(DiagnosticKind::FieldCountMismatch {
                command: Command::Vertex,
                found: self.counter,
            });
            return Ok(());
        }
        if let Some(kind) = self.rejected.take() {
            self.report(kind);
            return Ok(());
        }

        let [x, y, z] = self.position;
        let vertex = Vertex::new(x, y, z).with_color(self.options.default_color);
        self.vertices.push_back(vertex)?;
        Ok(())
    }

    fn complete_face(&mut self) -> Result<()> {
        if self.counter < 2 {
            return Ok(());
        }
        if let Some(max) = self.options.max_face_indices {
            if self.counter > max {
                self.report(DiagnosticKind::FieldCountMismatch {
                    command: Command::Face,
                    found: self.counter,
                });
                return Ok(());
            }
        }
        if let Some(kind) = self.rejected.take() {
            self.report(kind);
            return Ok(());
        }

        let mut outline = Vec::new();
        outline.try_reserve_exact(self.face.len())?;
        let mut unresolved = None;
        for &raw in &self.face {
            match self.resolve(raw) {
                Some(index) => outline.push(index),
                None => {
                    unresolved = Some(raw);
                    break;
                }
            }
        }
        if let Some(raw) = unresolved {
            self.report(DiagnosticKind::IndexOutOfRange(raw.to_string()));
            return Ok(());
        }

        if let Some(&highest) = outline.iter().max() {
            if !defined(highest, self.vertices.len()) {
                self.pending.try_reserve(1)?;
                self.pending.push((self.line, highest));
            }
        }

        self.indices.try_reserve(outline.len() * 2)?;
        for (a, b) in outline.into_iter().circular_tuple_windows::<(Index, Index)>() {
            self.indices.push_back(a)?;
            self.indices.push_back(b)?;
        }
        Ok(())
    }

    // 1-based, negative values count back from the last vertex defined so
    // far. Positive values may point past it; `finish` checks them.
    fn resolve(&self, raw: i64) -> Option<Index> {
        let position = match raw {
            0 => return None,
            r if r > 0 => r - 1,
            r => i64::try_from(self.vertices.len()).ok()? + r,
        };
        Index::try_from(position).ok()
    }

    fn reject(&mut self, kind: DiagnosticKind) {
        if self.rejected.is_none() {
            self.rejected = Some(kind);
        }
    }

    fn report(&mut self, kind: DiagnosticKind) {
        self.report_at(self.line, kind);
    }

    fn report_at(&mut self, line: usize, kind: DiagnosticKind) {
        let diagnostic = Diagnostic { line, kind };
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

fn defined(index: Index, count: usize) -> bool {
    usize::try_from(index).map_or(false, |index| index < count)
}

// A lone `-` reads as zero.
fn coordinate(text: &str) -> Option<f32> {
    match text {
        "-" => Some(0.0),
        _ => text.parse().ok(),
    }
}

impl TokenHandler for ObjParser {
    fn handle(&mut self, token: Token<'_>) -> ControlFlow<()> {
        match self.accept(token) {
            Ok(()) => ControlFlow::Continue(()),
            Err(error) => {
                self.failure = Some(error);
                ControlFlow::Break(())
            }
        }
    }
}

/// OBJ wireframe reader
pub struct ObjReader;

impl ObjReader {
    /// Parse OBJ text from any byte stream
    pub fn read_from<R: Read>(reader: R, options: &ObjLoadOptions) -> Result<LoadReport> {
        let mut parser = ObjParser::new(*options);
        match tokenize(reader, &mut parser) {
            Ok(()) => parser.finish(),
            Err(error) => Err(parser.take_failure().unwrap_or(error)),
        }
    }

    /// Load an OBJ file with explicit options
    pub fn load_with_options<P: AsRef<Path>>(path: P, options: &ObjLoadOptions) -> Result<LoadReport> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::MissingArgument("path"));
        }

        debug!("Loading OBJ file {}", path.display());
        let file = File::open(path)?;
        Self::read_from(file, options)
    }
}

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<Mesh> {
        Self::load_with_options(path, &ObjLoadOptions::default()).map(|report| report.mesh)
    }
}
