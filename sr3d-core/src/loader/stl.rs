/// STL file parser for binary and ASCII formats
use log::debug;
use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::{count, many0},
    number::complete::{float, le_f32, le_u16, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::MeshError;
use crate::geometry::Mesh;
use crate::math::{HomogeneousExt, Vec4};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Every facet brings its own three vertices; nothing is welded
fn facets_to_mesh(facets: Vec<[Vec4; 3]>) -> Result<Mesh, MeshError> {
    let triangles = (0..facets.len())
        .map(|i| [3 * i, 3 * i + 1, 3 * i + 2])
        .collect();
    let vertices = facets.into_iter().flatten().collect();
    Mesh::new(vertices, triangles)
}

fn binary_point(input: &[u8]) -> IResult<&[u8], Vec4> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Vec4::point(x, y, z)))
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], [Vec4; 3]> {
    // Stored normal is recomputed from the winding
    let (input, _normal) = take(12usize)(input)?;
    let (input, (a, b, c)) = tuple((binary_point, binary_point, binary_point))(input)?;
    let (input, _attribute_bytes) = le_u16(input)?;
    Ok((input, [a, b, c]))
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, MeshError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(MeshError::Truncated(format!(
            "binary STL needs at least {} bytes, got {}",
            HEADER_LEN + 4,
            data.len()
        )));
    }

    let body = &data[HEADER_LEN..];
    let (body, facet_count) = le_u32::<_, nom::error::Error<&[u8]>>(body)
        .map_err(|_| MeshError::Truncated("missing facet count".to_string()))?;
    let facet_count = facet_count as usize;

    let needed = facet_count.saturating_mul(FACET_LEN);
    if body.len() < needed {
        return Err(MeshError::Truncated(format!(
            "header declares {} facets ({} bytes) but only {} bytes follow",
            facet_count,
            needed,
            body.len()
        )));
    }

    let (_, facets) = count(binary_facet, facet_count)(body)
        .map_err(|_| MeshError::Truncated("facet data ended early".to_string()))?;
    facets_to_mesh(facets)
}

fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, (x, y, z)))
}

fn parse_vertex(input: &str) -> IResult<&str, Vec4> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, (x, y, z)) = parse_vector3(input)?;
    Ok((input, Vec4::point(x, y, z)))
}

fn parse_facet(input: &str) -> IResult<&str, [Vec4; 3]> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, a) = parse_vertex(input)?;
    let (input, b) = parse_vertex(input)?;
    let (input, c) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, [a, b, c]))
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Vec<[Vec4; 3]>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    // Optional solid name runs to the end of the line
    let (input, _) = not_line_ending(input)?;
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    Ok((input, facets))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, MeshError> {
    match parse_ascii_stl_impl(input) {
        Ok((_, facets)) => facets_to_mesh(facets),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let consumed = input.len() - e.input.len();
            Err(MeshError::Parse {
                line: input[..consumed].matches('\n').count() + 1,
                message: format!("unexpected token in ASCII STL ({:?})", e.code),
            })
        }
        Err(nom::Err::Incomplete(_)) => {
            Err(MeshError::Truncated("ASCII STL ended early".to_string()))
        }
    }
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Mesh, MeshError> {
    // Binary headers may also start with "solid", so ASCII is only a guess
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            match parse_ascii_stl(text) {
                Ok(mesh) => return Ok(mesh),
                Err(e) => debug!("not ASCII STL ({}), trying binary", e),
            }
        }
    }

    parse_binary_stl(data)
}
