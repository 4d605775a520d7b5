use derive_builder::Builder;
use std::ops::Range;

use crate::error::{Result, YBusError};

/// Bus indices of the two ends of a branch. `None` marks an end that is
/// not connected to any bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BranchIdx {
    pub from: Option<usize>,
    pub to: Option<usize>,
}

impl BranchIdx {
    pub fn new(from: usize, to: usize) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Branch with the to-side open.
    pub fn from_only(from: usize) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    /// Branch with the from-side open.
    pub fn to_only(to: usize) -> Self {
        Self {
            from: None,
            to: Some(to),
        }
    }

    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    pub(crate) fn side(&self, side: usize) -> Option<usize> {
        if side == 0 {
            self.from
        } else {
            self.to
        }
    }
}

impl From<(usize, usize)> for BranchIdx {
    fn from((from, to): (usize, usize)) -> Self {
        Self::new(from, to)
    }
}

/// Connectivity of the network in internal (consecutive, zero based)
/// bus numbering.
#[derive(Debug, Clone, Default, PartialEq, Builder)]
#[builder(default, setter(into))]
pub struct Topology {
    /// Reference angle offset of each bus (radians). Determines the
    /// number of buses.
    pub phase_shift: Vec<f64>,

    /// From and to bus of each branch.
    pub branch_bus_idx: Vec<BranchIdx>,

    /// Shunts `shunt_bus_indptr[b]..shunt_bus_indptr[b + 1]` are
    /// attached to bus `b`.
    pub shunt_bus_indptr: Vec<usize>,
}

impl Topology {
    pub fn n_bus(&self) -> usize {
        self.phase_shift.len()
    }

    pub fn n_branch(&self) -> usize {
        self.branch_bus_idx.len()
    }

    pub fn n_shunt(&self) -> usize {
        self.shunt_bus_indptr.last().copied().unwrap_or(0)
    }

    /// Indices of the shunts attached to `bus`.
    pub fn shunts_of(&self, bus: usize) -> Range<usize> {
        self.shunt_bus_indptr[bus]..self.shunt_bus_indptr[bus + 1]
    }

    /// Bus that `shunt` is attached to. `shunt` must be below
    /// [`n_shunt`](Self::n_shunt).
    pub fn shunt_bus(&self, shunt: usize) -> usize {
        debug_assert!(
            shunt < self.n_shunt(),
            "shunt {} out of range ({} shunts)",
            shunt,
            self.n_shunt()
        );
        self.shunt_bus_indptr.partition_point(|&p| p <= shunt) - 1
    }

    /// Checks that all bus references are in range and that the shunt
    /// pointer array is well formed.
    pub fn validate(&self) -> Result<()> {
        let n_bus = self.n_bus();

        for (i, br) in self.branch_bus_idx.iter().enumerate() {
            for bus in [br.from, br.to].into_iter().flatten() {
                if bus >= n_bus {
                    return Err(YBusError::InvalidTopology(format!(
                        "branch {} references bus {} (bus count {})",
                        i, bus, n_bus
                    )));
                }
            }
        }

        let indptr = &self.shunt_bus_indptr;
        if indptr.len() != n_bus + 1 {
            return Err(YBusError::InvalidTopology(format!(
                "shunt_bus_indptr must have {} entries, found {}",
                n_bus + 1,
                indptr.len()
            )));
        }
        if indptr[0] != 0 {
            return Err(YBusError::InvalidTopology(format!(
                "shunt_bus_indptr must start at zero, found {}",
                indptr[0]
            )));
        }
        if let Some(b) = indptr.windows(2).position(|w| w[0] > w[1]) {
            return Err(YBusError::InvalidTopology(format!(
                "shunt_bus_indptr decreases at bus {} ({} > {})",
                b,
                indptr[b],
                indptr[b + 1]
            )));
        }

        Ok(())
    }
}
