use num_complex::Complex64;
use pretty_dtoa::{dtoa, FmtFloatConfig};

use crate::tensor::{ComplexTensor, PhaseModel};

const FLOAT_CONFIG: FmtFloatConfig = FmtFloatConfig::default()
    .add_point_zero(false)
    .max_significant_digits(9);

pub fn format_complex(z: &Complex64) -> String {
    format!(
        "{}{}j{}",
        dtoa(z.re, FLOAT_CONFIG),
        if z.im.is_sign_negative() { "-" } else { "+" },
        dtoa(z.im.abs(), FLOAT_CONFIG)
    )
}

/// Formats a 3x3 tensor row by row: `[[a, b, c], [d, e, f], [g, h, i]]`.
pub fn format_tensor(t: &ComplexTensor) -> String {
    let rows: Vec<String> = t
        .0
        .iter()
        .map(|row| format_rect_vec(row))
        .collect();
    format!("[{}]", rows.join(", "))
}

pub fn format_rect_vec(v: &[Complex64]) -> String {
    let a: Vec<String> = v.iter().map(format_complex).collect();
    format!("[{}]", a.join(", "))
}

/// Formats admittance values of either representation.
pub fn format_admittance<P: PhaseModel>(v: &[P::Tensor]) -> String {
    let a: Vec<String> = v.iter().map(P::format).collect();
    format!("[{}]", a.join(", "))
}

pub fn format_idx_vec(v: &[usize]) -> String {
    let a: Vec<String> = v.iter().map(|i| i.to_string()).collect();
    format!("[{}]", a.join(", "))
}
