use super::{Geometry, Stencil};

/// Ghost layers kept on each side of an active axis
///
/// Two layers cover every TSC stencil centred up to one cell outside the
/// active region.
pub const GHOST_CELLS: usize = 2;

/// Flat indexing of cell-centred arrays with [`GHOST_CELLS`] ghost cells
/// on each side of every active axis
///
/// Cell coordinates are signed and relative to the first active cell, so
/// the ghost layers sit at indices -2 and -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLayout {
    cells: [usize; 3],
    ghost: [usize; 3],
}

impl CellLayout {
    pub fn for_geometry(geometry: &Geometry) -> Self {
        let ghost = [0, 1, 2].map(|a| if geometry.is_active(a) { GHOST_CELLS } else { 0 });
        Self {
            cells: geometry.cells,
            ghost,
        }
    }

    /// Active cells per axis
    pub fn cells(&self) -> [usize; 3] {
        self.cells
    }

    /// Stored cells per axis, ghosts included
    pub fn dims(&self) -> [usize; 3] {
        [0, 1, 2].map(|a| self.cells[a] + 2 * self.ghost[a])
    }

    /// Number of stored cells, ghosts included
    pub fn len(&self) -> usize {
        self.dims().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of a cell, or `None` outside the stored region
    pub fn index(&self, cell: [isize; 3]) -> Option<usize> {
        let dims = self.dims();
        let mut shifted = [0usize; 3];
        for a in 0..3 {
            let s = cell[a] + self.ghost[a] as isize;
            if s < 0 || s >= dims[a] as isize {
                return None;
            }
            shifted[a] = s as usize;
        }
        Some(shifted[0] + dims[0] * (shifted[1] + dims[1] * shifted[2]))
    }

    /// Inverse of [`CellLayout::index`]
    pub fn cell(&self, index: usize) -> [isize; 3] {
        let dims = self.dims();
        let i = index % dims[0];
        let j = (index / dims[0]) % dims[1];
        let k = index / (dims[0] * dims[1]);
        [
            i as isize - self.ghost[0] as isize,
            j as isize - self.ghost[1] as isize,
            k as isize - self.ghost[2] as isize,
        ]
    }

    /// True when every cell the stencil touches is stored
    pub fn covers(&self, stencil: &Stencil) -> bool {
        stencil.cells().all(|(cell, _)| self.index(cell).is_some())
    }
}
