use crate::math::{Point, Real, Vector};

/// The fixed background computational mesh: a regular grid of hexahedral
/// cells used only for computing spatial derivatives and integrating
/// momentum. Nodal state lives in the partitions, not here; the grid itself
/// is immutable topology shared by every partition.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BackgroundGrid {
    origin: Point<Real>,
    cell_width: Real,
    ncells: [usize; 3],
}

impl BackgroundGrid {
    pub fn new(origin: Point<Real>, cell_width: Real, ncells: [usize; 3]) -> Self {
        assert!(cell_width > 0.0, "cell width must be positive");
        assert!(
            ncells.iter().all(|n| *n > 0),
            "the grid needs at least one cell per axis"
        );
        Self {
            origin,
            cell_width,
            ncells,
        }
    }

    #[inline]
    pub fn cell_width(&self) -> Real {
        self.cell_width
    }

    #[inline]
    pub fn ncells(&self) -> [usize; 3] {
        self.ncells
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        self.ncells[0] * self.ncells[1] * self.ncells[2]
    }

    /// Node counts per axis (one more than cells).
    #[inline]
    pub fn nnodes(&self) -> [usize; 3] {
        [
            self.ncells[0] + 1,
            self.ncells[1] + 1,
            self.ncells[2] + 1,
        ]
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        let n = self.nnodes();
        n[0] * n[1] * n[2]
    }

    #[inline]
    pub fn node_id(&self, i: usize, j: usize, k: usize) -> usize {
        let n = self.nnodes();
        i + j * n[0] + k * n[0] * n[1]
    }

    #[inline]
    pub fn cell_id(&self, i: usize, j: usize, k: usize) -> usize {
        i + j * self.ncells[0] + k * self.ncells[0] * self.ncells[1]
    }

    #[inline]
    pub fn cell_coords(&self, cell: usize) -> [usize; 3] {
        let nx = self.ncells[0];
        let nxy = nx * self.ncells[1];
        [cell % nx, (cell % nxy) / nx, cell / nxy]
    }

    /// The x slab index of a cell, used by the domain decomposition.
    #[inline]
    pub fn cell_x(&self, cell: usize) -> usize {
        cell % self.ncells[0]
    }

    /// Locates the cell containing `point`, or `None` if the point lies
    /// outside the mesh domain.
    pub fn locate(&self, point: &Point<Real>) -> Option<usize> {
        let local = (point - self.origin) / self.cell_width;
        let mut ijk = [0usize; 3];

        for axis in 0..3 {
            if local[axis] < 0.0 {
                return None;
            }
            // Points on the far domain boundary belong to the last cell.
            let i = (local[axis].floor() as usize).min(self.ncells[axis] - 1);
            if local[axis] > self.ncells[axis] as Real {
                return None;
            }
            ijk[axis] = i;
        }

        Some(self.cell_id(ijk[0], ijk[1], ijk[2]))
    }

    /// The 8 node ids of a cell, ordered like [`crate::math::Kernel::CORNERS`].
    pub fn cell_nodes(&self, cell: usize) -> [usize; 8] {
        let [i, j, k] = self.cell_coords(cell);
        let mut out = [0; 8];
        for (idx, c) in crate::math::Kernel::CORNERS.iter().enumerate() {
            out[idx] = self.node_id(i + c[0], j + c[1], k + c[2]);
        }
        out
    }

    pub fn cell_min_corner(&self, cell: usize) -> Point<Real> {
        let [i, j, k] = self.cell_coords(cell);
        self.origin
            + Vector::new(i as Real, j as Real, k as Real) * self.cell_width
    }

    /// Local coordinates of `point` within `cell`, each component in `[0, 1]`
    /// when the point actually lies inside the cell.
    pub fn local_coords(&self, cell: usize, point: &Point<Real>) -> Vector<Real> {
        (point - self.cell_min_corner(cell)) / self.cell_width
    }

    pub fn node_position(&self, node: usize) -> Point<Real> {
        let n = self.nnodes();
        let i = node % n[0];
        let j = (node / n[0]) % n[1];
        let k = node / (n[0] * n[1]);
        self.origin
            + Vector::new(i as Real, j as Real, k as Real) * self.cell_width
    }
}
