//! Tests for the OBJ semantic parser

use crate::error::{Command, DiagnosticKind};
use crate::obj::{LoadReport, ObjLoadOptions, ObjParser, ObjReader};
use crate::tokenizer::{Token, TokenKind};
use approx::assert_relative_eq;
use wirefront_core::{Color, Error, Point3f, Result, DEFAULT_COLOR};

fn parse(input: &str) -> Result<LoadReport> {
    ObjReader::read_from(input.as_bytes(), &ObjLoadOptions::default())
}

fn parse_with(input: &str, options: ObjLoadOptions) -> Result<LoadReport> {
    ObjReader::read_from(input.as_bytes(), &options)
}

fn kinds(report: &LoadReport) -> Vec<DiagnosticKind> {
    report.diagnostics.iter().map(|d| d.kind.clone()).collect()
}

const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n";

#[test]
fn test_comment_then_vertex() {
    let report = parse("# comment\nv 1 2 3\n").unwrap();
    let vertices = report.mesh.vertices.as_slice();
    assert_eq!(vertices.len(), 1);
    assert_relative_eq!(vertices[0].position, Point3f::new(1.0, 2.0, 3.0));
    assert!(report.mesh.indices.is_empty());
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_triangle_outline() {
    let report = parse(TRIANGLE).unwrap();
    assert_eq!(report.mesh.vertex_count(), 3);
    assert_eq!(report.mesh.indices.as_slice(), &[0, 1, 1, 2, 2, 0]);
    assert_eq!(report.mesh.line_count(), 3);
}

#[test]
fn test_vertex_coordinates_and_color() {
    let report = parse("v -1.5 0.25 10\nv 3 -4 5 1\n").unwrap();
    let vertices = report.mesh.vertices.as_slice();
    assert_eq!(vertices.len(), 2);
    assert_relative_eq!(vertices[0].position, Point3f::new(-1.5, 0.25, 10.0));
    assert_relative_eq!(vertices[1].position, Point3f::new(3.0, -4.0, 5.0));
    assert!(vertices.iter().all(|v| v.color == DEFAULT_COLOR));
}

#[test]
fn test_configured_vertex_color() {
    let red = Color::from_rgb(255, 0, 0);
    let options = ObjLoadOptions::default().with_default_color(red);
    let report = parse_with(TRIANGLE, options).unwrap();
    assert!(report.mesh.vertices.as_slice().iter().all(|v| v.color == red));
}

#[test]
fn test_short_vertex_is_dropped() {
    let report = parse("v 1 2\n").unwrap();
    assert_eq!(report.mesh.vertex_count(), 0);
    assert_eq!(
        kinds(&report),
        vec![DiagnosticKind::FieldCountMismatch {
            command: Command::Vertex,
            found: 2
        }]
    );
}

#[test]
fn test_long_vertex_is_dropped() {
    let report = parse("v 1 2 3 4 5\n").unwrap();
    assert_eq!(report.mesh.vertex_count(), 0);
    assert_eq!(
        kinds(&report),
        vec![DiagnosticKind::FieldCountMismatch {
            command: Command::Vertex,
            found: 5
        }]
    );
}

#[test]
fn test_single_index_face_is_discarded_silently() {
    let report = parse("v 0 0 0\nf 1\n").unwrap();
    assert_eq!(report.mesh.line_count(), 0);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_two_index_face_closes_on_itself() {
    let report = parse("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap();
    assert_eq!(report.mesh.indices.as_slice(), &[0, 1, 1, 0]);
}

#[test]
fn test_quad_outline() {
    let input = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
    let report = parse(input).unwrap();
    assert_eq!(report.mesh.indices.as_slice(), &[0, 1, 1, 2, 2, 3, 3, 0]);
}

#[test]
fn test_face_above_bound_is_dropped() {
    let input = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 0 2 0\nf 1 2 3 4 5\n";
    let report = parse(input).unwrap();
    assert_eq!(report.mesh.line_count(), 0);
    assert_eq!(
        kinds(&report),
        vec![DiagnosticKind::FieldCountMismatch {
            command: Command::Face,
            found: 5
        }]
    );

    let report = parse_with(input, ObjLoadOptions::default().unbounded_faces()).unwrap();
    assert_eq!(
        report.mesh.indices.as_slice(),
        &[0, 1, 1, 2, 2, 3, 3, 4, 4, 0]
    );
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_relative_indices() {
    let report = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf -3 -2 -1\n").unwrap();
    assert_eq!(report.mesh.indices.as_slice(), &[0, 1, 1, 2, 2, 0]);
}

#[test]
fn test_indices_outside_defined_vertices() {
    let report = parse("v 0 0 0\nf 1 2\n").unwrap();
    assert_eq!(report.mesh.line_count(), 0);
    assert_eq!(kinds(&report), vec![DiagnosticKind::IndexOutOfRange("2".into())]);

    let report = parse("v 0 0 0\nv 1 0 0\nf 0 1\n").unwrap();
    assert_eq!(kinds(&report), vec![DiagnosticKind::IndexOutOfRange("0".into())]);

    let report = parse("v 0 0 0\nf -2 1\n").unwrap();
    assert_eq!(kinds(&report), vec![DiagnosticKind::IndexOutOfRange("-2".into())]);
}

#[test]
fn test_face_may_precede_its_vertices() {
    let report = parse("f 1 2 3\nv 0 0 0\nv 1 0 0\nv 1 1 0\n").unwrap();
    assert_eq!(report.mesh.vertex_count(), 3);
    assert_eq!(report.mesh.indices.as_slice(), &[0, 1, 1, 2, 2, 0]);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_forward_reference_never_defined() {
    let report = parse("f 1 5 2\nv 0 0 0\nv 1 0 0\n").unwrap();
    assert_eq!(report.mesh.vertex_count(), 2);
    assert_eq!(report.mesh.indices.as_slice(), &[1, 0]);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].line, 1);
    assert_eq!(
        report.diagnostics[0].kind,
        DiagnosticKind::IndexOutOfRange("5".into())
    );
}

#[test]
fn test_lone_minus_reads_as_zero() {
    let report = parse("v - 1 2\n").unwrap();
    let vertices = report.mesh.vertices.as_slice();
    assert_eq!(vertices.len(), 1);
    assert_relative_eq!(vertices[0].position, Point3f::new(0.0, 1.0, 2.0));
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_lone_minus_in_face_drops_only_that_face() {
    let report = parse("v 0 0 0\nv 1 0 0\nf 1 - 2\nf 1 2\n").unwrap();
    assert_eq!(report.mesh.indices.as_slice(), &[0, 1, 1, 0]);
    assert_eq!(kinds(&report), vec![DiagnosticKind::IndexOutOfRange("-".into())]);
}

#[test]
fn test_unreadable_coordinate_drops_the_vertex() {
    let token = |kind, text| Token {
        kind,
        text,
        line: 4,
        column: 1,
    };

    let mut parser = ObjParser::default();
    parser.accept(token(TokenKind::Text, "v")).unwrap();
    for value in ["1", "nan-ish", "3"] {
        parser.accept(token(TokenKind::Number, value)).unwrap();
    }
    parser.accept(token(TokenKind::EndLine, "")).unwrap();
    assert_eq!(parser.vertex_count(), 0);

    let report = parser.finish().unwrap();
    assert!(report.mesh.is_empty());
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].line, 4);
    assert_eq!(
        report.diagnostics[0].kind,
        DiagnosticKind::InvalidNumber("nan-ish".into())
    );
}

#[test]
fn test_fractional_index_is_rejected() {
    let report = parse("v 0 0 0\nv 1 0 0\nf 1.5 2\n").unwrap();
    assert_eq!(report.mesh.line_count(), 0);
    assert_eq!(kinds(&report), vec![DiagnosticKind::IndexOutOfRange("1.5".into())]);
}

#[test]
fn test_every_index_stays_inside_vertex_buffer() {
    let input = "v 0 0 0\nv 1 0 0\nf 1 2\nv 1 1 0\nf 3 1 -1\nf 9 1\n";
    let report = parse(input).unwrap();
    let count = report.mesh.vertex_count() as u32;
    assert!(report.mesh.indices.as_slice().iter().all(|&i| i < count));
    assert_eq!(report.mesh.lines().count(), report.mesh.line_count());
}

#[test]
fn test_unknown_commands_are_reported_and_skipped() {
    let report = parse("vn 0 0 1\nvt 0.5 0.5\nusemtl wood\nv 1 1 1\n").unwrap();
    assert_eq!(report.mesh.vertex_count(), 1);
    assert_eq!(
        kinds(&report),
        vec![
            DiagnosticKind::UnknownCommand("vn".into()),
            DiagnosticKind::UnknownCommand("vt".into()),
            DiagnosticKind::UnknownCommand("usemtl".into()),
        ]
    );
    let lines: Vec<usize> = report.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![1, 2, 3]);
}

#[test]
fn test_text_inside_command_keeps_the_record() {
    let report = parse("v 1 2 abc 3\n").unwrap();
    assert_eq!(report.mesh.vertex_count(), 1);
    assert_relative_eq!(
        report.mesh.vertices.as_slice()[0].position,
        Point3f::new(1.0, 2.0, 3.0)
    );
    assert_eq!(kinds(&report), vec![DiagnosticKind::UnexpectedText("abc".into())]);
}

#[test]
fn test_line_starting_with_number_is_ignored() {
    let report = parse("1 2 3\nv 1 2 3\n").unwrap();
    assert_eq!(report.mesh.vertex_count(), 1);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_unterminated_last_line_is_finalized() {
    let report = parse("v 1 2 3").unwrap();
    assert_eq!(report.mesh.vertex_count(), 1);

    let report = parse("v 0 0 0\nv 1 0 0\nf 1 2").unwrap();
    assert_eq!(report.mesh.indices.as_slice(), &[0, 1, 1, 0]);
}

#[test]
fn test_crlf_and_blank_lines() {
    let input = "# exported\r\n\r\nv 0 0 0\r\n\r\nv 1 0 0\r\nv 1 1 0\r\n\r\nf 1 2 3\r\n";
    let report = parse(input).unwrap();
    assert_eq!(report.mesh.vertex_count(), 3);
    assert_eq!(report.mesh.line_count(), 3);
}

#[test]
fn test_diagnostic_reports_its_line() {
    let report = parse("v 0 0 0\n\nv 1\n").unwrap();
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].line, 3);
    assert_eq!(
        report.diagnostics[0].to_string(),
        "line 3: vertex has 1 numeric fields"
    );
}

#[test]
fn test_malformed_number_fails_the_load() {
    let result = parse("v 1.2.3 0 0\n");
    assert!(matches!(result, Err(Error::MalformedNumber { line: 1, .. })));
}

#[test]
fn test_empty_input_gives_empty_mesh() {
    let report = parse("").unwrap();
    assert!(report.mesh.is_empty());
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_parser_state_transitions() {
    let token = |kind, text| Token {
        kind,
        text,
        line: 1,
        column: 1,
    };

    let mut parser = ObjParser::default();
    assert_eq!(parser.command(), Command::None);

    parser.accept(token(TokenKind::Text, "v")).unwrap();
    assert_eq!(parser.command(), Command::Vertex);
    parser.accept(token(TokenKind::Number, "")).unwrap();
    for value in ["1", "2", "3"] {
        parser.accept(token(TokenKind::Number, value)).unwrap();
    }
    parser.accept(token(TokenKind::EndLine, "")).unwrap();
    assert_eq!(parser.command(), Command::None);
    assert_eq!(parser.vertex_count(), 1);

    parser.accept(token(TokenKind::Number, "7")).unwrap();
    assert_eq!(parser.command(), Command::Wait);
    parser.accept(token(TokenKind::Text, "f")).unwrap();
    assert_eq!(parser.command(), Command::Wait);
    parser.accept(token(TokenKind::EndLine, "")).unwrap();
    assert_eq!(parser.command(), Command::None);

    parser.accept(token(TokenKind::Text, "g")).unwrap();
    assert_eq!(parser.command(), Command::Wait);
    assert_eq!(parser.diagnostics().len(), 1);

    let report = parser.finish().unwrap();
    assert_eq!(report.mesh.vertex_count(), 1);
    assert_eq!(report.mesh.line_count(), 0);
}
