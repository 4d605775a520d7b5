use num_traits::Zero;

use crate::error::{check_size, Result};
use crate::param::BranchParam;
use crate::tensor::PhaseModel;
use crate::topology::BranchIdx;
use crate::ybus::YBus;

/// Currents and powers at both ends of a branch, positive when flowing
/// from the bus into the branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchFlow<P: PhaseModel> {
    pub i_f: P::Value,
    pub i_t: P::Value,
    pub s_f: P::Value,
    pub s_t: P::Value,
}

/// Current and power of a shunt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShuntFlow<P: PhaseModel> {
    pub i: P::Value,
    pub s: P::Value,
}

impl<P: PhaseModel> YBus<P> {
    /// Computes the flow through every branch for the bus voltages `u`.
    ///
    /// Results are produced lazily, one per branch in branch order. An open
    /// end carries no current and no power.
    pub fn calculate_branch_flow<'a>(
        &'a self,
        u: &'a [P::Value],
    ) -> Result<impl ExactSizeIterator<Item = BranchFlow<P>> + 'a> {
        check_size("voltage", self.size(), u.len())?;
        let topo = self.topology();
        let param = self.param();
        Ok(topo
            .branch_bus_idx
            .iter()
            .zip(&param.branch_param)
            .map(move |(br, y)| branch_flow(br, y, u)))
    }

    /// Computes the flow into every shunt for the bus voltages `u`.
    ///
    /// Shunt current is taken as flowing out of the bus: `i = -y * u`.
    pub fn calculate_shunt_flow<'a>(
        &'a self,
        u: &'a [P::Value],
    ) -> Result<impl ExactSizeIterator<Item = ShuntFlow<P>> + 'a> {
        check_size("voltage", self.size(), u.len())?;
        let topo = self.topology();
        let param = self.param();
        Ok(param.shunt_param.iter().enumerate().map(move |(shunt, y)| {
            let u = &u[topo.shunt_bus(shunt)];
            let i = -P::dot(y, u);
            ShuntFlow {
                i,
                s: P::power(u, &i),
            }
        }))
    }
}

fn branch_flow<P: PhaseModel>(br: &BranchIdx, y: &BranchParam<P>, u: &[P::Value]) -> BranchFlow<P> {
    let voltage = |bus: Option<usize>| bus.map_or_else(P::Value::zero, |b| u[b]);
    let (u_f, u_t) = (voltage(br.from), voltage(br.to));

    let (i_f, s_f) = if br.from.is_some() {
        let i_f = P::dot(y.yff(), &u_f) + P::dot(y.yft(), &u_t);
        (i_f, P::power(&u_f, &i_f))
    } else {
        (P::Value::zero(), P::Value::zero())
    };
    let (i_t, s_t) = if br.to.is_some() {
        let i_t = P::dot(y.ytf(), &u_f) + P::dot(y.ytt(), &u_t);
        (i_t, P::power(&u_t, &i_t))
    } else {
        (P::Value::zero(), P::Value::zero())
    };

    BranchFlow { i_f, i_t, s_f, s_t }
}
