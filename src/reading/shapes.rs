//! Outlines from ESRI shapefiles (`.shp`), e.g. the
//! [Natural Earth](https://www.naturalearthdata.com) boundary and river sets.
//!
//! Only the geometry file is read. Each record becomes a [`Shape`] holding
//! its parts as separate point groups, ready to be drawn as lines.

use std::{io::Read, path::Path};

use tracing::{debug, info};

use crate::error::{open_file, GridError};

const FILE_CODE: i32 = 9994;
const VERSION: i32 = 1000;
const HEADER_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub record: i32,
    pub parts: Vec<Vec<(f64, f64)>>,
}

impl Shape {
    pub fn num_points(&self) -> usize {
        self.parts.iter().map(Vec::len).sum()
    }
}

pub fn load_shapes(path: &Path) -> Result<Vec<Shape>, GridError> {
    let mut bytes = Vec::new();
    open_file(path)?.read_to_end(&mut bytes)?;

    let shapes = parse_shapes(&bytes, path)?;
    info!(
        count = shapes.len(),
        points = shapes.iter().map(Shape::num_points).sum::<usize>(),
        path = %path.display(),
        "loaded shapes"
    );

    Ok(shapes)
}

pub fn parse_shapes(bytes: &[u8], path: &Path) -> Result<Vec<Shape>, GridError> {
    if bytes.len() < HEADER_LEN {
        return Err(GridError::invalid(format!("{}: shapefile header too short", path.display())));
    }
    if be_i32(bytes, 0) != FILE_CODE || le_i32(bytes, 28) != VERSION {
        return Err(GridError::invalid(format!("{}: not a shapefile", path.display())));
    }

    let mut cursor = Cursor {
        bytes,
        pos: HEADER_LEN,
        path,
    };
    let mut shapes = Vec::new();

    while cursor.remaining() >= 8 {
        let record = cursor.be_i32()?;
        let content_len = cursor.be_i32()?.max(0) as usize * 2;
        let content = cursor.take(content_len)?;

        if let Some(shape) = parse_record(record, content, path)? {
            shapes.push(shape);
        }
    }

    Ok(shapes)
}

fn parse_record(record: i32, content: &[u8], path: &Path) -> Result<Option<Shape>, GridError> {
    let mut rec = Cursor {
        bytes: content,
        pos: 0,
        path,
    };

    let shape_type = rec.le_i32()?;
    let parts = match shape_type {
        0 => return Ok(None),
        // point, point Z, point M
        1 | 11 | 21 => vec![vec![rec.point()?]],
        // polyline and polygon with their Z and M variants
        3 | 5 | 13 | 15 | 23 | 25 => read_parts(&mut rec)?,
        other => {
            debug!(record, shape_type = other, "skipping unsupported shape");
            return Ok(None);
        }
    };

    Ok(Some(Shape { record, parts }))
}

fn read_parts(rec: &mut Cursor) -> Result<Vec<Vec<(f64, f64)>>, GridError> {
    rec.take(32)?; // bounding box
    let num_parts = rec.le_i32()?.max(0) as usize;
    let num_points = rec.le_i32()?.max(0) as usize;

    // part indices take 4 bytes each, points 16
    if num_parts > rec.remaining() / 4 || num_points > rec.remaining() / 16 {
        return Err(GridError::Parse {
            path: rec.path.to_path_buf(),
            line: 0,
            reason: format!(
                "record claims {num_parts} parts and {num_points} points at byte {}",
                rec.pos
            ),
        });
    }

    let mut starts = Vec::with_capacity(num_parts + 1);
    for _ in 0..num_parts {
        starts.push((rec.le_i32()?.max(0) as usize).min(num_points));
    }
    starts.push(num_points);

    let points = (0..num_points)
        .map(|_| rec.point())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(starts
        .windows(2)
        .filter(|w| w[0] < w[1])
        .map(|w| points[w[0]..w[1]].to_vec())
        .collect())
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    path: &'a Path,
}

impl<'a> Cursor<'a> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], GridError> {
        if self.remaining() < n {
            return Err(GridError::Parse {
                path: self.path.to_path_buf(),
                line: 0,
                reason: format!("truncated record at byte {}", self.pos),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn be_i32(&mut self) -> Result<i32, GridError> {
        Ok(be_i32(self.take(4)?, 0))
    }

    fn le_i32(&mut self) -> Result<i32, GridError> {
        Ok(le_i32(self.take(4)?, 0))
    }

    fn le_f64(&mut self) -> Result<f64, GridError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(f64::from_le_bytes(buf))
    }

    fn point(&mut self) -> Result<(f64, f64), GridError> {
        Ok((self.le_f64()?, self.le_f64()?))
    }
}

fn be_i32(bytes: &[u8], at: usize) -> i32 {
    i32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn le_i32(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn header(shape_type: i32) -> Vec<u8> {
        let mut h = vec![0u8; HEADER_LEN];
        h[0..4].copy_from_slice(&FILE_CODE.to_be_bytes());
        h[28..32].copy_from_slice(&VERSION.to_le_bytes());
        h[32..36].copy_from_slice(&shape_type.to_le_bytes());
        h
    }

    fn record(number: i32, content: Vec<u8>) -> Vec<u8> {
        let mut r = Vec::new();
        r.extend(number.to_be_bytes());
        r.extend(((content.len() / 2) as i32).to_be_bytes());
        r.extend(content);
        r
    }

    fn poly(shape_type: i32, parts: &[i32], points: &[(f64, f64)]) -> Vec<u8> {
        let mut c = Vec::new();
        c.extend(shape_type.to_le_bytes());
        c.extend([0u8; 32]);
        c.extend((parts.len() as i32).to_le_bytes());
        c.extend((points.len() as i32).to_le_bytes());
        for p in parts {
            c.extend(p.to_le_bytes());
        }
        for (x, y) in points {
            c.extend(x.to_le_bytes());
            c.extend(y.to_le_bytes());
        }
        c
    }

    #[test]
    fn should_split_polygon_into_parts() {
        let points = [(0.0, 0.0), (1.0, 0.0), (0.0, 0.0), (5.0, 5.0), (6.0, 5.0)];
        let mut bytes = header(5);
        bytes.extend(record(1, poly(5, &[0, 3], &points)));

        let shapes = parse_shapes(&bytes, Path::new("t.shp")).unwrap();

        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].record, 1);
        assert_eq!(shapes[0].parts.len(), 2);
        assert_eq!(shapes[0].parts[0], vec![(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]);
        assert_eq!(shapes[0].parts[1], vec![(5.0, 5.0), (6.0, 5.0)]);
        assert_eq!(shapes[0].num_points(), 5);
    }

    #[test]
    fn should_skip_null_shapes_and_read_points() {
        let mut bytes = header(1);
        bytes.extend(record(1, 0i32.to_le_bytes().to_vec()));

        let mut point = 1i32.to_le_bytes().to_vec();
        point.extend(2.5f64.to_le_bytes());
        point.extend((-3.0f64).to_le_bytes());
        bytes.extend(record(2, point));

        let shapes = parse_shapes(&bytes, Path::new("t.shp")).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].parts, vec![vec![(2.5, -3.0)]]);
    }

    #[test]
    fn should_read_polyline_z_xy_only() {
        let mut content = poly(13, &[0], &[(1.0, 2.0), (3.0, 4.0)]);
        // z range and values that follow the x/y block
        content.extend([0u8; 16 + 2 * 8]);
        let mut bytes = header(13);
        bytes.extend(record(7, content));

        let shapes = parse_shapes(&bytes, Path::new("t.shp")).unwrap();
        assert_eq!(shapes[0].parts, vec![vec![(1.0, 2.0), (3.0, 4.0)]]);
    }

    #[test]
    fn should_load_shapes_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rivers.shp");
        let mut bytes = header(3);
        bytes.extend(record(1, poly(3, &[0], &[(0.0, 0.0), (1.0, 1.0), (2.0, 1.0)])));
        std::fs::write(&path, bytes).unwrap();

        let shapes = load_shapes(&path).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].num_points(), 3);

        let err = load_shapes(&dir.path().join("missing.shp")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn should_reject_foreign_file() {
        let bytes = vec![0u8; HEADER_LEN];
        let err = parse_shapes(&bytes, Path::new("t.shp")).unwrap_err();
        assert!(matches!(err, GridError::InvalidInput { .. }));
    }

    #[test]
    fn should_fail_on_oversized_counts() {
        let mut content = poly(5, &[0], &[(0.0, 0.0), (1.0, 1.0)]);
        content[36..40].copy_from_slice(&i32::MAX.to_le_bytes());
        let mut bytes = header(5);
        bytes.extend(record(1, content));

        let err = parse_shapes(&bytes, Path::new("t.shp")).unwrap_err();
        assert!(matches!(err, GridError::Parse { .. }));

        let mut content = poly(5, &[0], &[(0.0, 0.0), (1.0, 1.0)]);
        content[40..44].copy_from_slice(&i32::MAX.to_le_bytes());
        let mut bytes = header(5);
        bytes.extend(record(1, content));

        let err = parse_shapes(&bytes, Path::new("t.shp")).unwrap_err();
        assert!(matches!(err, GridError::Parse { .. }));
    }

    #[test]
    fn should_fail_on_truncated_record() {
        let mut bytes = header(5);
        let mut rec = record(1, poly(5, &[0], &[(0.0, 0.0), (1.0, 1.0)]));
        rec.truncate(rec.len() - 8);
        bytes.extend(rec);

        let err = parse_shapes(&bytes, Path::new("t.shp")).unwrap_err();
        assert!(matches!(err, GridError::Parse { .. }));
    }
}
