use crate::math::{Point, Real};
use parry::query::PointQuery;
use parry::shape::Triangle;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelsetError {
    #[error("the discontinuity surface holds no facets")]
    EmptySurface,
    #[error("facet {0} references a node out of bounds")]
    BadFacet(usize),
}

/// An explicit geometric surface embedded in the continuum (e.g. a crack),
/// able to evaluate a signed-distance field at arbitrary query points.
///
/// Surfaces are built once during initialization and are immutable
/// afterwards, except for their frictional coefficient.
pub trait DiscontinuitySurface: Send + Sync {
    /// Builds the surface from its node/cell description. Returns `false`
    /// if the description cannot form a valid surface.
    fn initialize(&mut self, nodes: &[Point<Real>], cells: &[[usize; 3]]) -> bool;

    fn set_friction(&mut self, coef: Real);

    fn friction(&self) -> Real;

    /// Evaluates the signed distance of every point in `points`, pushing one
    /// value per point onto `out`.
    fn compute_levelset(
        &self,
        points: &[Point<Real>],
        out: &mut Vec<Real>,
    ) -> Result<(), LevelsetError>;
}

/// A triangulated discontinuity surface. The level-set sign is taken from
/// the orientation of the closest facet, so consistently wound facets split
/// the surrounding volume into a positive and a negative side.
pub struct TriSurface {
    facets: Vec<Triangle>,
    friction: Real,
}

impl TriSurface {
    pub fn new() -> Self {
        Self {
            facets: vec![],
            friction: 0.0,
        }
    }

    /// Convenience constructor used by tests and in-memory setups.
    pub fn from_geometry(
        nodes: &[Point<Real>],
        cells: &[[usize; 3]],
        friction: Real,
    ) -> Option<Self> {
        let mut surface = Self::new();
        surface.set_friction(friction);
        surface.initialize(nodes, cells).then(|| surface)
    }
}

impl Default for TriSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscontinuitySurface for TriSurface {
    fn initialize(&mut self, nodes: &[Point<Real>], cells: &[[usize; 3]]) -> bool {
        if cells.is_empty() {
            return false;
        }

        self.facets.clear();
        for cell in cells {
            if cell.iter().any(|i| *i >= nodes.len()) {
                return false;
            }
            self.facets
                .push(Triangle::new(nodes[cell[0]], nodes[cell[1]], nodes[cell[2]]));
        }

        true
    }

    fn set_friction(&mut self, coef: Real) {
        self.friction = coef;
    }

    fn friction(&self) -> Real {
        self.friction
    }

    fn compute_levelset(
        &self,
        points: &[Point<Real>],
        out: &mut Vec<Real>,
    ) -> Result<(), LevelsetError> {
        if self.facets.is_empty() {
            return Err(LevelsetError::EmptySurface);
        }

        out.reserve(points.len());

        for point in points {
            let mut best_dist = Real::MAX;
            let mut best_sign = 1.0;

            for (fid, facet) in self.facets.iter().enumerate() {
                let proj = facet.project_local_point(point, false);
                let delta = point - proj.point;
                let dist = delta.norm();

                if dist < best_dist {
                    best_dist = dist;
                    // Degenerate facets have no normal; keep the previous sign.
                    if let Some(normal) = facet.normal() {
                        best_sign = if delta.dot(&normal.into_inner()) >= 0.0 {
                            1.0
                        } else {
                            -1.0
                        };
                    } else {
                        warn!("Discontinuity facet {} is degenerate.", fid);
                    }
                }
            }

            out.push(best_sign * best_dist);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{DiscontinuitySurface, TriSurface};
    use na::point;

    #[test]
    fn flat_plane_levelset_signs() {
        // Two facets spanning the z = 1 plane, wound so +z is the positive side.
        let nodes = [
            point![0.0, 0.0, 1.0],
            point![2.0, 0.0, 1.0],
            point![2.0, 2.0, 1.0],
            point![0.0, 2.0, 1.0],
        ];
        let cells = [[0, 1, 2], [0, 2, 3]];
        let surface = TriSurface::from_geometry(&nodes, &cells, 0.3).unwrap();

        let mut values = vec![];
        surface
            .compute_levelset(
                &[point![1.0, 1.0, 1.5], point![1.0, 1.0, 0.25]],
                &mut values,
            )
            .unwrap();

        assert!((values[0] - 0.5).abs() < 1.0e-12);
        assert!((values[1] + 0.75).abs() < 1.0e-12);
    }

    #[test]
    fn empty_surface_is_rejected() {
        let mut surface = TriSurface::new();
        assert!(!surface.initialize(&[], &[]));

        let mut out = vec![];
        assert!(surface
            .compute_levelset(&[point![0.0, 0.0, 0.0]], &mut out)
            .is_err());
    }
}
