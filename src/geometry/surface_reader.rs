use crate::math::{Point, Real};
use na::point;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unknown surface input format `{0}`")]
    UnknownFormat(String),
}

/// Reads the node/cell description of a discontinuity surface from a file.
pub trait SurfaceReader {
    fn read_mesh_nodes(&self, path: &Path) -> Result<Vec<Point<Real>>, ReaderError>;
    fn read_mesh_cells(&self, path: &Path) -> Result<Vec<[usize; 3]>, ReaderError>;
}

/// Returns the reader matching the declared input format of a surface.
pub fn reader_for_format(format: &str) -> Result<Box<dyn SurfaceReader>, ReaderError> {
    match format {
        "ascii" => Ok(Box::new(AsciiSurfaceReader)),
        other => Err(ReaderError::UnknownFormat(other.to_string())),
    }
}

/// Plain-text surface files:
///
/// ```text
/// # comment
/// <nnodes> <ncells>
/// x y z          (nnodes lines)
/// i j k          (ncells lines, triangle connectivity)
/// ```
pub struct AsciiSurfaceReader;

impl AsciiSurfaceReader {
    fn data_lines(&self, path: &Path) -> Result<Vec<String>, ReaderError> {
        let file = File::open(path)?;
        let mut lines = vec![];

        for line in BufReader::new(file).lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            lines.push(trimmed.to_string());
        }

        Ok(lines)
    }

    fn counts(&self, header: &str) -> Result<(usize, usize), ReaderError> {
        let mut fields = header.split_whitespace();
        let nnodes = fields
            .next()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| ReaderError::Parse(format!("bad surface header `{}`", header)))?;
        let ncells = fields
            .next()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| ReaderError::Parse(format!("bad surface header `{}`", header)))?;
        Ok((nnodes, ncells))
    }
}

impl SurfaceReader for AsciiSurfaceReader {
    fn read_mesh_nodes(&self, path: &Path) -> Result<Vec<Point<Real>>, ReaderError> {
        let lines = self.data_lines(path)?;
        let header = lines
            .first()
            .ok_or_else(|| ReaderError::Parse("empty surface file".to_string()))?;
        let (nnodes, _) = self.counts(header)?;

        if lines.len() < 1 + nnodes {
            return Err(ReaderError::Parse(format!(
                "expected {} node lines, found {}",
                nnodes,
                lines.len() - 1
            )));
        }

        let mut nodes = Vec::with_capacity(nnodes);
        for line in &lines[1..1 + nnodes] {
            let coords: Vec<Real> = line
                .split_whitespace()
                .filter_map(|s| s.parse::<Real>().ok())
                .collect();
            if coords.len() != 3 {
                return Err(ReaderError::Parse(format!("bad node line `{}`", line)));
            }
            nodes.push(point![coords[0], coords[1], coords[2]]);
        }

        Ok(nodes)
    }

    fn read_mesh_cells(&self, path: &Path) -> Result<Vec<[usize; 3]>, ReaderError> {
        let lines = self.data_lines(path)?;
        let header = lines
            .first()
            .ok_or_else(|| ReaderError::Parse("empty surface file".to_string()))?;
        let (nnodes, ncells) = self.counts(header)?;

        if lines.len() < 1 + nnodes + ncells {
            return Err(ReaderError::Parse(format!(
                "expected {} cell lines, found {}",
                ncells,
                lines.len().saturating_sub(1 + nnodes)
            )));
        }

        let mut cells = Vec::with_capacity(ncells);
        for line in &lines[1 + nnodes..1 + nnodes + ncells] {
            let ids: Vec<usize> = line
                .split_whitespace()
                .filter_map(|s| s.parse::<usize>().ok())
                .collect();
            if ids.len() != 3 {
                return Err(ReaderError::Parse(format!("bad cell line `{}`", line)));
            }
            cells.push([ids[0], ids[1], ids[2]]);
        }

        Ok(cells)
    }
}
