/// Wavefront OBJ parser (positions and polygon faces only)
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, i64 as index, space0, space1},
    combinator::{all_consuming, cut, map, opt, rest},
    multi::separated_list1,
    number::complete::float,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::MeshError;
use crate::geometry::Mesh;
use crate::math::{HomogeneousExt, Vec4};

#[derive(Debug, PartialEq)]
enum Record {
    Vertex(Vec4),
    Face(Vec<i64>),
    Ignored,
}

/// `x y z [w]`; the optional weight is accepted and discarded
fn vertex_coords(input: &str) -> IResult<&str, Vec4> {
    map(
        tuple((
            float,
            preceded(space1, float),
            preceded(space1, float),
            opt(preceded(space1, float)),
        )),
        |(x, y, z, _w)| Vec4::point(x, y, z),
    )(input)
}

/// One face corner in any of the `v`, `v/vt`, `v//vn`, `v/vt/vn` forms;
/// only the position index is kept
fn face_index(input: &str) -> IResult<&str, i64> {
    terminated(
        index,
        opt(preceded(
            char('/'),
            pair(opt(index), opt(preceded(char('/'), index))),
        )),
    )(input)
}

/// Known records commit once their keyword matches, so a malformed `v` or `f`
/// line is an error rather than an ignored record
fn record(input: &str) -> IResult<&str, Record> {
    alt((
        map(
            preceded(pair(tag("v"), space1), cut(vertex_coords)),
            Record::Vertex,
        ),
        map(
            preceded(
                pair(tag("f"), space1),
                cut(separated_list1(space1, face_index)),
            ),
            Record::Face,
        ),
        map(rest, |_| Record::Ignored),
    ))(input)
}

/// OBJ indices are 1-based; negative ones count back from the last vertex
/// defined so far
fn resolve_index(raw: i64, defined: usize, line: usize) -> Result<usize, MeshError> {
    let resolved = match raw {
        0 => None,
        i if i > 0 => usize::try_from(i - 1).ok(),
        i => usize::try_from(defined as i64 + i).ok(),
    };
    resolved.ok_or_else(|| MeshError::Parse {
        line,
        message: format!("invalid vertex index {}", raw),
    })
}

/// Parse OBJ text into a mesh, fan-triangulating polygon faces
pub fn parse_obj(input: &str) -> Result<Mesh, MeshError> {
    let mut vertices = Vec::new();
    let mut polygons = Vec::new();

    for (i, raw_line) in input.lines().enumerate() {
        let line_number = i + 1;
        let line = raw_line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let (_, record) = all_consuming(terminated(record, space0))(line).map_err(|_| {
            MeshError::Parse {
                line: line_number,
                message: format!("malformed record `{}`", line),
            }
        })?;

        match record {
            Record::Vertex(vertex) => vertices.push(vertex),
            Record::Face(indices) => {
                let polygon = indices
                    .into_iter()
                    .map(|raw| resolve_index(raw, vertices.len(), line_number))
                    .collect::<Result<Vec<_>, _>>()?;
                polygons.push(polygon);
            }
            Record::Ignored => {}
        }
    }

    Mesh::from_polygons(vertices, &polygons)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# a unit quad
o quad
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0 1.0
vt 0.0 0.0
vn 0.0 0.0 1.0
s off
f 1 2 3 4
";

    #[test]
    fn test_parse_quad_is_fan_triangulated() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.faces()[0].indices, [0, 1, 2]);
        assert_eq!(mesh.faces()[1].indices, [0, 2, 3]);
        assert_eq!(mesh.vertices()[3], Vec4::point(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_face_index_forms() {
        assert_eq!(face_index("7"), Ok(("", 7)));
        assert_eq!(face_index("7/2"), Ok(("", 7)));
        assert_eq!(face_index("7//3"), Ok(("", 7)));
        assert_eq!(face_index("7/2/3"), Ok(("", 7)));
        assert_eq!(face_index("-1/2/3"), Ok(("", -1)));
    }

    #[test]
    fn test_mixed_forms_and_negative_indices() {
        let text = "\
v -1 -1 0
v 1 -1 0
v 0 1 0   # apex
f -3/1/1 -2//1 -1/3
";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.faces()[0].indices, [0, 1, 2]);
    }

    #[test]
    fn test_records_are_distinguished_from_prefixes() {
        assert!(matches!(record("vt 0.5 0.5"), Ok((_, Record::Ignored))));
        assert!(matches!(record("vn 0 0 1"), Ok((_, Record::Ignored))));
        assert!(matches!(record("v 1 2 3"), Ok((_, Record::Vertex(_)))));
    }

    #[test]
    fn test_malformed_vertex_reports_line() {
        let text = "v 0 0 0\nv 1 nope 0\n";
        assert!(matches!(
            parse_obj(text),
            Err(MeshError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_zero_index_is_rejected() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n";
        assert!(matches!(
            parse_obj(text),
            Err(MeshError::Parse { line: 4, .. })
        ));
    }

    #[test]
    fn test_out_of_range_and_degenerate_faces() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n";
        assert!(matches!(
            parse_obj(text),
            Err(MeshError::IndexOutOfRange { index: 8, .. })
        ));

        let text = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        assert!(matches!(
            parse_obj(text),
            Err(MeshError::DegeneratePolygon { face: 0, len: 2 })
        ));

        assert!(matches!(parse_obj("# nothing here\n"), Err(MeshError::Empty)));
    }
}
