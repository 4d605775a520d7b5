//! Shared test networks.

use num_complex::Complex64;

use crate::cmplx;
use crate::param::ModelParam;
use crate::tensor::Symmetric;
use crate::topology::{BranchIdx, Topology};

pub(crate) const NUMERICAL_TOLERANCE: f64 = 1e-8;

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Four bus network with parallel, reversed and open branches.
///
/// ```txt
///   --- 4 ---               ----- 3 -----
///  |         |             |             |
///  |         v             v             |
/// [0]       [1] --- 1 --> [2] --- 2 --> [3]
///  ^         |             |
///  |         |             5
///   --- 0 ---              |
///                          X
/// ```
///
/// Shunt 0 is attached to bus 0, shunt 1 to bus 3.
pub(crate) fn four_bus_topology() -> Topology {
    Topology {
        phase_shift: vec![0.0; 4],
        branch_bus_idx: vec![
            BranchIdx::new(1, 0),
            BranchIdx::new(1, 2),
            BranchIdx::new(2, 3),
            BranchIdx::new(3, 2),
            BranchIdx::new(0, 1),
            BranchIdx::from_only(2),
        ],
        shunt_bus_indptr: vec![0, 1, 1, 1, 2],
    }
}

/// Branch values `[ff, ft, tf, tt]` and shunt values for
/// [`four_bus_topology`].
pub(crate) fn four_bus_param() -> ModelParam<Symmetric> {
    let j = |im: f64| cmplx!(0.0, im);
    let r = |re: f64| cmplx!(re);
    ModelParam::from_values(
        &[
            [j(1.0), j(2.0), j(3.0), j(4.0)],
            [r(5.0), r(6.0), r(7.0), r(8.0)],
            [j(9.0), j(10.0), j(11.0), j(12.0)],
            [r(13.0), r(14.0), r(15.0), r(16.0)],
            [r(17.0), r(18.0), r(19.0), r(20.0)],
            [j(1000.0), r(0.0), r(0.0), r(0.0)],
        ],
        &[j(100.0), j(200.0)],
    )
}

/// Expected admittance of [`four_bus_topology`] with [`four_bus_param`],
/// in row-major entry order.
pub(crate) fn four_bus_admittance() -> Vec<Complex64> {
    vec![
        cmplx!(17.0, 104.0),  // (0, 0): 0.tt + 4.ff + shunt 0
        cmplx!(18.0, 3.0),    // (0, 1): 0.tf + 4.ft
        cmplx!(19.0, 2.0),    // (1, 0): 0.ft + 4.tf
        cmplx!(25.0, 1.0),    // (1, 1): 0.ff + 1.ff + 4.tt
        cmplx!(6.0),          // (1, 2): 1.ft
        cmplx!(7.0),          // (2, 1): 1.tf
        cmplx!(24.0, 1009.0), // (2, 2): 1.tt + 2.ff + 3.tt + 5.ff
        cmplx!(15.0, 10.0),   // (2, 3): 2.ft + 3.tf
        cmplx!(14.0, 11.0),   // (3, 2): 2.tf + 3.ft
        cmplx!(13.0, 212.0),  // (3, 3): 2.tt + 3.ff + shunt 1
    ]
}
