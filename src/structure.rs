use crate::debug::format_idx_vec;
use crate::error::Result;
use crate::topology::Topology;

/// Which part of which component contributes to a Y-bus entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YBusElementType {
    BranchFromFrom,
    BranchFromTo,
    BranchToFrom,
    BranchToTo,
    Shunt,
}

impl YBusElementType {
    /// Branch sub-blocks in `[ff, ft, tf, tt]` order. Entry `j` lies in
    /// row `side(j / 2)` and column `side(j % 2)` of the branch.
    const BRANCH: [YBusElementType; 4] = [
        YBusElementType::BranchFromFrom,
        YBusElementType::BranchFromTo,
        YBusElementType::BranchToFrom,
        YBusElementType::BranchToTo,
    ];
}

/// A single contribution: the branch or shunt `idx` and which of its
/// admittance values is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YBusElement {
    pub element_type: YBusElementType,
    pub idx: usize,
}

#[derive(Debug, Clone, Copy)]
struct MapElement {
    row: usize,
    col: usize,
    element: YBusElement,
}

/// Sparsity pattern of the bus admittance matrix.
///
/// Depends on the topology only, so one structure can be shared by any
/// number of parameter sets (and by both phase models) built on that
/// topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YBusStructure {
    row_indptr: Vec<usize>,
    col_indices: Vec<usize>,
    row_indices: Vec<usize>,
    bus_entry: Vec<usize>,
    transpose_entry: Vec<usize>,
    y_bus_entry_indptr: Vec<usize>,
    y_bus_element: Vec<YBusElement>,
    n_branch: usize,
    n_shunt: usize,
}

impl YBusStructure {
    /// Builds the compressed sparse row structure of the Y-bus.
    ///
    /// Every connected branch registers its `ff`, `ft`, `tf` and `tt` cells
    /// (only the diagonal of the connected side if one end is open) and every
    /// shunt registers the diagonal of its bus. The candidates are put in
    /// row-major order with two stable counting sort passes and equal cells
    /// are merged. Each bus gets a diagonal entry, even when nothing
    /// contributes to it.
    pub fn new(topo: &Topology) -> Result<Self> {
        topo.validate()?;

        let n_bus = topo.n_bus();
        let mut elements = Vec::with_capacity(4 * topo.n_branch() + topo.n_shunt());

        for (branch, br) in topo.branch_bus_idx.iter().enumerate() {
            for (j, &element_type) in YBusElementType::BRANCH.iter().enumerate() {
                if let (Some(row), Some(col)) = (br.side(j / 2), br.side(j % 2)) {
                    elements.push(MapElement {
                        row,
                        col,
                        element: YBusElement {
                            element_type,
                            idx: branch,
                        },
                    });
                }
            }
        }
        for bus in 0..n_bus {
            for shunt in topo.shunts_of(bus) {
                elements.push(MapElement {
                    row: bus,
                    col: bus,
                    element: YBusElement {
                        element_type: YBusElementType::Shunt,
                        idx: shunt,
                    },
                });
            }
        }

        let elements = counting_sort_element(&elements, n_bus);

        let mut structure = Self::with_capacity(n_bus, elements.len());
        structure.n_branch = topo.n_branch();
        structure.n_shunt = topo.n_shunt();
        let mut it = elements.iter().peekable();
        for row in 0..n_bus {
            let mut diag_found = false;
            while let Some(first) = it.next_if(|e| e.row == row) {
                let col = first.col;
                if !diag_found && col > row {
                    structure.push_entry(row, row);
                    diag_found = true;
                }
                diag_found |= col == row;

                structure.y_bus_element.push(first.element);
                while let Some(e) = it.next_if(|e| e.row == row && e.col == col) {
                    structure.y_bus_element.push(e.element);
                }
                structure.push_entry(row, col);
            }
            if !diag_found {
                structure.push_entry(row, row);
            }
            structure.row_indptr.push(structure.col_indices.len());
        }

        structure.transpose_entry = transpose_entry(&structure.row_indptr, &structure.col_indices);

        log::debug!(
            "Y-bus structure: {} buses, {} contributions, {} non-zeros",
            n_bus,
            structure.y_bus_element.len(),
            structure.nnz()
        );
        log::trace!("row_indptr: {}", format_idx_vec(&structure.row_indptr));
        log::trace!("col_indices: {}", format_idx_vec(&structure.col_indices));

        Ok(structure)
    }

    fn with_capacity(n_bus: usize, n_element: usize) -> Self {
        let mut row_indptr = Vec::with_capacity(n_bus + 1);
        row_indptr.push(0);
        let mut y_bus_entry_indptr = Vec::with_capacity(n_element + n_bus + 1);
        y_bus_entry_indptr.push(0);

        Self {
            row_indptr,
            col_indices: Vec::with_capacity(n_element + n_bus),
            row_indices: Vec::with_capacity(n_element + n_bus),
            bus_entry: vec![0; n_bus],
            transpose_entry: Vec::new(),
            y_bus_entry_indptr,
            y_bus_element: Vec::with_capacity(n_element),
            n_branch: 0,
            n_shunt: 0,
        }
    }

    /// Closes the entry `(row, col)` over the contributions pushed since the
    /// previous entry.
    fn push_entry(&mut self, row: usize, col: usize) {
        if row == col {
            self.bus_entry[row] = self.col_indices.len();
        }
        self.row_indices.push(row);
        self.col_indices.push(col);
        self.y_bus_entry_indptr.push(self.y_bus_element.len());
    }

    /// Number of buses (the matrix dimension).
    pub fn size(&self) -> usize {
        self.bus_entry.len()
    }

    /// Number of branches of the topology the structure was built from.
    pub fn n_branch(&self) -> usize {
        self.n_branch
    }

    pub fn n_shunt(&self) -> usize {
        self.n_shunt
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.col_indices.len()
    }

    pub fn row_indptr(&self) -> &[usize] {
        &self.row_indptr
    }

    pub fn col_indices(&self) -> &[usize] {
        &self.col_indices
    }

    pub fn row_indices(&self) -> &[usize] {
        &self.row_indices
    }

    /// Position of the diagonal entry of each bus.
    pub fn bus_entry(&self) -> &[usize] {
        &self.bus_entry
    }

    /// Position of the entry `(c, r)` for each entry `(r, c)`.
    pub fn transpose_entry(&self) -> &[usize] {
        &self.transpose_entry
    }

    /// Contributions `y_bus_entry_indptr[k]..y_bus_entry_indptr[k + 1]` of
    /// [`y_bus_element`](Self::y_bus_element) sum to entry `k`.
    pub fn y_bus_entry_indptr(&self) -> &[usize] {
        &self.y_bus_entry_indptr
    }

    pub fn y_bus_element(&self) -> &[YBusElement] {
        &self.y_bus_element
    }

    /// Contributions summed into entry `k`.
    pub fn entry_elements(&self, k: usize) -> &[YBusElement] {
        &self.y_bus_element[self.y_bus_entry_indptr[k]..self.y_bus_entry_indptr[k + 1]]
    }
}

/// Stable counting sort by column, then by row.
fn counting_sort_element(elements: &[MapElement], n_bus: usize) -> Vec<MapElement> {
    let by_col = counting_sort_by(elements, n_bus, |e| e.col);
    counting_sort_by(&by_col, n_bus, |e| e.row)
}

fn counting_sort_by<F>(src: &[MapElement], n_key: usize, key: F) -> Vec<MapElement>
where
    F: Fn(&MapElement) -> usize,
{
    // offsets[k] is the next free slot for key k
    let mut offsets = vec![0; n_key + 1];
    for e in src {
        offsets[key(e) + 1] += 1;
    }
    for k in 0..n_key {
        offsets[k + 1] += offsets[k];
    }

    let mut order = vec![0; src.len()];
    for (i, e) in src.iter().enumerate() {
        let k = key(e);
        order[offsets[k]] = i;
        offsets[k] += 1;
    }
    order.into_iter().map(|i| src[i]).collect()
}

/// The pattern is symmetric, so walking the entries in row-major order
/// visits column `c` in the same order as row `c` lists its columns.
fn transpose_entry(row_indptr: &[usize], col_indices: &[usize]) -> Vec<usize> {
    let mut cursor = row_indptr[..row_indptr.len() - 1].to_vec();
    col_indices
        .iter()
        .map(|&col| {
            let k = cursor[col];
            cursor[col] += 1;
            k
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::YBusElementType::*;
    use super::*;
    use crate::error::YBusError;
    use crate::tests::{four_bus_topology, init_logging};
    use crate::topology::{BranchIdx, Topology};
    use anyhow::{format_err, Result};
    use std::collections::BTreeSet;

    fn check_invariants(topo: &Topology, structure: &YBusStructure) -> Result<()> {
        let n_bus = structure.size();
        let nnz = structure.nnz();
        let row_indptr = structure.row_indptr();

        assert_eq!(row_indptr.len(), n_bus + 1);
        assert_eq!(row_indptr[0], 0);
        assert_eq!(row_indptr[n_bus], nnz);
        assert!(row_indptr.windows(2).all(|w| w[0] <= w[1]));

        // one entry per distinct cell plus the diagonals
        let mut cells: BTreeSet<(usize, usize)> = (0..n_bus).map(|b| (b, b)).collect();
        for br in &topo.branch_bus_idx {
            if let Some(f) = br.from {
                cells.insert((f, f));
            }
            if let Some(t) = br.to {
                cells.insert((t, t));
            }
            if let (Some(f), Some(t)) = (br.from, br.to) {
                cells.insert((f, t));
                cells.insert((t, f));
            }
        }
        let stored: Vec<(usize, usize)> = structure
            .row_indices()
            .iter()
            .copied()
            .zip(structure.col_indices().iter().copied())
            .collect();
        let expected: Vec<(usize, usize)> = cells.into_iter().collect();
        if stored != expected {
            return Err(format_err!(
                "stored cells must be sorted and unique:\nexpected: {:?}\nactual: {:?}",
                expected,
                stored
            ));
        }

        for (k, &t) in structure.transpose_entry().iter().enumerate() {
            assert_eq!(structure.transpose_entry()[t], k);
            assert_eq!(structure.row_indices()[t], structure.col_indices()[k]);
            assert_eq!(structure.col_indices()[t], structure.row_indices()[k]);
        }
        for (b, &k) in structure.bus_entry().iter().enumerate() {
            assert_eq!((structure.row_indices()[k], structure.col_indices()[k]), (b, b));
            assert_eq!(structure.transpose_entry()[k], k);
        }

        let n_element = structure.y_bus_element().len();
        assert_eq!(structure.y_bus_entry_indptr().len(), nnz + 1);
        assert_eq!(structure.y_bus_entry_indptr()[nnz], n_element);
        Ok(())
    }

    #[test]
    fn test_four_bus_structure() -> Result<()> {
        init_logging();
        let topo = four_bus_topology();
        let structure = YBusStructure::new(&topo)?;

        assert_eq!(structure.size(), 4);
        assert_eq!(structure.nnz(), 10);
        assert_eq!(structure.n_branch(), 6);
        assert_eq!(structure.n_shunt(), 2);
        assert_eq!(structure.row_indptr(), &[0, 2, 5, 8, 10]);
        assert_eq!(structure.col_indices(), &[0, 1, 0, 1, 2, 1, 2, 3, 2, 3]);
        assert_eq!(structure.row_indices(), &[0, 0, 1, 1, 1, 2, 2, 2, 3, 3]);
        assert_eq!(structure.bus_entry(), &[0, 3, 6, 9]);
        assert_eq!(structure.transpose_entry(), &[0, 2, 1, 3, 5, 4, 6, 8, 7, 9]);
        assert_eq!(
            structure.y_bus_entry_indptr(),
            &[0, 3, 5, 7, 10, 11, 12, 16, 18, 20, 23]
        );

        check_invariants(&topo, &structure)
    }

    #[test]
    fn test_contribution_order() -> Result<()> {
        let structure = YBusStructure::new(&four_bus_topology())?;

        // branch order first, shunts last
        let e = |element_type, idx| YBusElement { element_type, idx };
        assert_eq!(
            structure.entry_elements(0),
            &[e(BranchToTo, 0), e(BranchFromFrom, 4), e(Shunt, 0)]
        );
        assert_eq!(structure.entry_elements(1), &[e(BranchToFrom, 0), e(BranchFromTo, 4)]);
        assert_eq!(
            structure.entry_elements(6),
            &[
                e(BranchToTo, 1),
                e(BranchFromFrom, 2),
                e(BranchToTo, 3),
                e(BranchFromFrom, 5)
            ]
        );
        assert_eq!(
            structure.entry_elements(9),
            &[e(BranchToTo, 2), e(BranchFromFrom, 3), e(Shunt, 1)]
        );
        Ok(())
    }

    #[test]
    fn test_one_bus_system() -> Result<()> {
        let topo = Topology {
            phase_shift: vec![0.0],
            branch_bus_idx: vec![],
            shunt_bus_indptr: vec![0, 0],
        };
        let structure = YBusStructure::new(&topo)?;

        assert_eq!(structure.size(), 1);
        assert_eq!(structure.nnz(), 1);
        assert_eq!(structure.row_indptr(), &[0, 1]);
        assert_eq!(structure.col_indices(), &[0]);
        assert_eq!(structure.row_indices(), &[0]);
        assert_eq!(structure.bus_entry(), &[0]);
        assert_eq!(structure.transpose_entry(), &[0]);
        assert_eq!(structure.y_bus_entry_indptr(), &[0, 0]);
        assert!(structure.y_bus_element().is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_network() -> Result<()> {
        let topo = Topology {
            shunt_bus_indptr: vec![0],
            ..Default::default()
        };
        let structure = YBusStructure::new(&topo)?;

        assert_eq!(structure.size(), 0);
        assert_eq!(structure.nnz(), 0);
        assert_eq!(structure.row_indptr(), &[0]);
        assert_eq!(structure.y_bus_entry_indptr(), &[0]);
        Ok(())
    }

    #[test]
    fn test_self_loop_is_diagonal_only() -> Result<()> {
        let topo = Topology {
            phase_shift: vec![0.0; 2],
            branch_bus_idx: vec![BranchIdx::new(1, 1)],
            shunt_bus_indptr: vec![0, 0, 0],
        };
        let structure = YBusStructure::new(&topo)?;

        assert_eq!(structure.nnz(), 2);
        assert_eq!(structure.row_indptr(), &[0, 1, 2]);
        assert_eq!(structure.y_bus_entry_indptr(), &[0, 0, 4]);
        assert_eq!(structure.entry_elements(1).len(), 4);
        check_invariants(&topo, &structure)
    }

    #[test]
    fn test_open_branches_and_isolated_bus() -> Result<()> {
        let topo = Topology {
            phase_shift: vec![0.0; 3],
            branch_bus_idx: vec![
                BranchIdx::new(0, 2),
                BranchIdx::open(),
                BranchIdx::to_only(2),
            ],
            shunt_bus_indptr: vec![0, 0, 0, 0],
        };
        let structure = YBusStructure::new(&topo)?;

        assert_eq!(structure.row_indptr(), &[0, 2, 3, 5]);
        assert_eq!(structure.col_indices(), &[0, 2, 1, 0, 2]);
        assert_eq!(structure.bus_entry(), &[0, 2, 4]);
        assert_eq!(structure.transpose_entry(), &[0, 3, 2, 1, 4]);
        assert_eq!(structure.y_bus_entry_indptr(), &[0, 1, 2, 2, 3, 5]);
        assert_eq!(
            structure.entry_elements(4),
            &[
                YBusElement {
                    element_type: BranchToTo,
                    idx: 0
                },
                YBusElement {
                    element_type: BranchToTo,
                    idx: 2
                }
            ]
        );
        check_invariants(&topo, &structure)
    }

    #[test]
    fn test_meshed_network() -> Result<()> {
        // ring of 12 buses with chords and parallel branches, bus 12 isolated
        let n_bus = 13;
        let mut branch_bus_idx: Vec<BranchIdx> =
            (0..12).map(|b| BranchIdx::new(b, (b + 1) % 12)).collect();
        branch_bus_idx.extend((0..12).step_by(3).map(|b| BranchIdx::new((b + 6) % 12, b)));
        branch_bus_idx.push(BranchIdx::new(4, 5));
        branch_bus_idx.push(BranchIdx::from_only(7));
        let mut shunt_bus_indptr = vec![0];
        for b in 0..n_bus {
            shunt_bus_indptr.push(shunt_bus_indptr[b] + b % 2);
        }
        let topo = Topology {
            phase_shift: vec![0.0; n_bus],
            branch_bus_idx,
            shunt_bus_indptr,
        };

        let structure = YBusStructure::new(&topo)?;

        let n_element = 4 * 17 + 1 + topo.n_shunt();
        assert_eq!(structure.y_bus_element().len(), n_element);
        assert_eq!(structure.entry_elements(structure.bus_entry()[12]).len(), 0);
        check_invariants(&topo, &structure)
    }

    #[test]
    fn test_invalid_topology() {
        let topo = Topology {
            phase_shift: vec![0.0; 2],
            branch_bus_idx: vec![BranchIdx::new(0, 5)],
            shunt_bus_indptr: vec![0, 0, 0],
        };
        assert!(matches!(
            YBusStructure::new(&topo),
            Err(YBusError::InvalidTopology(_))
        ));
    }
}
