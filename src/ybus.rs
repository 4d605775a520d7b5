use num_complex::Complex64;
use num_traits::Zero;
use sparsetools::coo::Coo;
use sparsetools::csr::CSR;
use std::sync::Arc;

use crate::debug::format_admittance;
use crate::error::{check_size, Result, YBusError};
use crate::param::ModelParam;
use crate::structure::{YBusElement, YBusElementType, YBusStructure};
use crate::tensor::{PhaseModel, Symmetric};
use crate::topology::Topology;

/// Bus admittance matrix: the sparsity structure of a topology together
/// with the admittance values assembled from one parameter set.
///
/// Topology, structure and parameters are shared read-only, so several
/// matrices (for example a symmetric and an asymmetric one) can be built on
/// the same topology without copying it or recomputing the structure.
#[derive(Debug, Clone)]
pub struct YBus<P: PhaseModel> {
    topo: Arc<Topology>,
    structure: Arc<YBusStructure>,
    param: Arc<ModelParam<P>>,
    admittance: Vec<P::Tensor>,
}

impl<P: PhaseModel> YBus<P> {
    pub fn new(topo: Arc<Topology>, param: Arc<ModelParam<P>>) -> Result<Self> {
        let structure = Arc::new(YBusStructure::new(&topo)?);
        Self::with_structure(topo, structure, param)
    }

    /// Builds the matrix on a structure previously derived from `topo`.
    ///
    /// A structure whose bus, branch or shunt count differs from `topo` is
    /// rejected with [`YBusError::SizeMismatch`].
    pub fn with_structure(
        topo: Arc<Topology>,
        structure: Arc<YBusStructure>,
        param: Arc<ModelParam<P>>,
    ) -> Result<Self> {
        topo.validate()?;
        let admittance = assemble_admittance(&topo, &structure, &param)?;
        Ok(Self {
            topo,
            structure,
            param,
            admittance,
        })
    }

    /// Reassembles the admittance values for changed parameters, keeping
    /// the sparsity structure.
    pub fn update_admittance(&mut self, param: Arc<ModelParam<P>>) -> Result<()> {
        self.admittance = assemble_admittance(&self.topo, &self.structure, &param)?;
        self.param = param;
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.structure.size()
    }

    pub fn nnz(&self) -> usize {
        self.structure.nnz()
    }

    pub fn row_indptr(&self) -> &[usize] {
        self.structure.row_indptr()
    }

    pub fn col_indices(&self) -> &[usize] {
        self.structure.col_indices()
    }

    pub fn row_indices(&self) -> &[usize] {
        self.structure.row_indices()
    }

    pub fn bus_entry(&self) -> &[usize] {
        self.structure.bus_entry()
    }

    pub fn transpose_entry(&self) -> &[usize] {
        self.structure.transpose_entry()
    }

    pub fn y_bus_entry_indptr(&self) -> &[usize] {
        self.structure.y_bus_entry_indptr()
    }

    pub fn y_bus_element(&self) -> &[YBusElement] {
        self.structure.y_bus_element()
    }

    /// Assembled admittance of each stored entry.
    pub fn admittance(&self) -> &[P::Tensor] {
        &self.admittance
    }

    pub fn topology(&self) -> &Topology {
        &self.topo
    }

    pub fn param(&self) -> &ModelParam<P> {
        &self.param
    }

    pub fn shared_topology(&self) -> Arc<Topology> {
        Arc::clone(&self.topo)
    }

    pub fn shared_structure(&self) -> Arc<YBusStructure> {
        Arc::clone(&self.structure)
    }

    /// Bus current injections `Y * u`.
    pub fn calculate_injection(&self, u: &[P::Value]) -> Result<Vec<P::Value>> {
        check_size("voltage", self.size(), u.len())?;

        let row_indptr = self.row_indptr();
        let col_indices = self.col_indices();
        let i_bus = (0..self.size())
            .map(|row| {
                (row_indptr[row]..row_indptr[row + 1]).fold(P::Value::zero(), |acc, k| {
                    acc + P::dot(&self.admittance[k], &u[col_indices[k]])
                })
            })
            .collect();
        Ok(i_bus)
    }

    /// Bus power injections `u * conj(Y * u)`.
    pub fn calculate_power_injection(&self, u: &[P::Value]) -> Result<Vec<P::Value>> {
        let i_bus = self.calculate_injection(u)?;
        Ok(u.iter()
            .zip(&i_bus)
            .map(|(u, i)| P::power(u, i))
            .collect())
    }
}

impl YBus<Symmetric> {
    /// Copies the matrix into a `sparsetools` CSR matrix for use with
    /// the linear solvers.
    pub fn to_csr(&self) -> Result<CSR<usize, Complex64>> {
        let n = self.size();
        let coo = Coo::new(
            n,
            n,
            self.row_indices().to_vec(),
            self.col_indices().to_vec(),
            self.admittance.clone(),
        )
        .map_err(|err| YBusError::Sparse(err.to_string()))?;
        Ok(coo.to_csr())
    }
}

/// Sums the contributions of every stored entry.
///
/// Summation follows the contribution order of the structure, so equal
/// inputs always give bit-identical output. Non-finite parameters are
/// propagated, not rejected.
pub fn assemble_admittance<P: PhaseModel>(
    topo: &Topology,
    structure: &YBusStructure,
    param: &ModelParam<P>,
) -> Result<Vec<P::Tensor>> {
    check_size("structure", topo.n_bus(), structure.size())?;
    check_size("structure branches", topo.n_branch(), structure.n_branch())?;
    check_size("structure shunts", topo.n_shunt(), structure.n_shunt())?;
    check_size("branch_param", topo.n_branch(), param.branch_param.len())?;
    check_size("shunt_param", topo.n_shunt(), param.shunt_param.len())?;

    let admittance: Vec<P::Tensor> = (0..structure.nnz())
        .map(|k| {
            let mut y = P::Tensor::zero();
            for e in structure.entry_elements(k) {
                y += match e.element_type {
                    YBusElementType::BranchFromFrom => *param.branch_param[e.idx].yff(),
                    YBusElementType::BranchFromTo => *param.branch_param[e.idx].yft(),
                    YBusElementType::BranchToFrom => *param.branch_param[e.idx].ytf(),
                    YBusElementType::BranchToTo => *param.branch_param[e.idx].ytt(),
                    YBusElementType::Shunt => param.shunt_param[e.idx],
                };
            }
            y
        })
        .collect();

    log::debug!(
        "assembled {} admittance entries ({})",
        admittance.len(),
        if P::IS_SYMMETRIC {
            "symmetric"
        } else {
            "asymmetric"
        }
    );
    log::trace!("admittance: {}", format_admittance::<P>(&admittance));

    Ok(admittance)
}
