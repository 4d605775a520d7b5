use num_complex::Complex64;

use crate::tensor::{Asymmetric, ComplexTensor, PhaseModel, Symmetric};

/// Branch admittance block:
///
/// ```txt
///      | If |   | Yff  Yft |   | Vf |
///      |    | = |          | * |    |
///      | It |   | Ytf  Ytt |   | Vt |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchParam<P: PhaseModel> {
    /// `[ff, ft, tf, tt]`
    pub value: [P::Tensor; 4],
}

impl<P: PhaseModel> BranchParam<P> {
    pub fn new(yff: P::Tensor, yft: P::Tensor, ytf: P::Tensor, ytt: P::Tensor) -> Self {
        Self {
            value: [yff, yft, ytf, ytt],
        }
    }

    pub fn yff(&self) -> &P::Tensor {
        &self.value[0]
    }

    pub fn yft(&self) -> &P::Tensor {
        &self.value[1]
    }

    pub fn ytf(&self) -> &P::Tensor {
        &self.value[2]
    }

    pub fn ytt(&self) -> &P::Tensor {
        &self.value[3]
    }
}

/// Electrical parameters of all branches and shunts, aligned with the
/// indices of a [`Topology`](crate::Topology).
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParam<P: PhaseModel> {
    pub branch_param: Vec<BranchParam<P>>,
    pub shunt_param: Vec<P::Tensor>,
}

impl<P: PhaseModel> Default for ModelParam<P> {
    fn default() -> Self {
        Self {
            branch_param: Vec::new(),
            shunt_param: Vec::new(),
        }
    }
}

impl ModelParam<Symmetric> {
    pub fn from_values(branch_param: &[[Complex64; 4]], shunt_param: &[Complex64]) -> Self {
        Self {
            branch_param: branch_param
                .iter()
                .map(|&value| BranchParam { value })
                .collect(),
            shunt_param: shunt_param.to_vec(),
        }
    }
}

impl ModelParam<Asymmetric> {
    /// Lifts symmetric parameters into the three-phase model by placing
    /// each value on the diagonal of a tensor.
    pub fn from_symmetric(param: &ModelParam<Symmetric>) -> Self {
        Self {
            branch_param: param
                .branch_param
                .iter()
                .map(|br| BranchParam {
                    value: br.value.map(ComplexTensor::from_diagonal),
                })
                .collect(),
            shunt_param: param
                .shunt_param
                .iter()
                .map(|&y| ComplexTensor::from_diagonal(y))
                .collect(),
        }
    }
}
