// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use num_complex::Complex64;
use num_traits::Zero;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub};

use crate::debug::{format_complex, format_tensor};

pub const J: Complex64 = Complex64 { re: 0.0, im: 1.0 };

/// Phase rotation operator `a = e^(j*2*pi/3)`.
pub const A: Complex64 = Complex64 {
    re: -0.5,
    im: 0.866_025_403_784_438_6,
};

#[macro_export]
macro_rules! cmplx {
    () => {
        num_complex::Complex64::new(0.0, 0.0)
    };
    ($arg1:expr) => {
        num_complex::Complex64::new($arg1, 0.0)
    };
    ($arg1:expr, $arg2:expr) => {
        num_complex::Complex64::new($arg1, $arg2)
    };
}

/// Algebra of the values stored in the admittance matrix and of the
/// per-bus quantities it acts upon.
///
/// The sparsity, assembly and flow algorithms are written once against
/// this trait. [`Symmetric`] works on positive-sequence scalars, while
/// [`Asymmetric`] works on full three-phase quantities.
pub trait PhaseModel: Copy + Debug + Send + Sync + 'static {
    /// Admittance of a single matrix cell.
    type Tensor: Copy + Debug + PartialEq + Zero + AddAssign + Send + Sync;

    /// Voltage, current or power at a single bus.
    type Value: Copy + Debug + PartialEq + Zero + Neg<Output = Self::Value> + Send + Sync;

    const IS_SYMMETRIC: bool;

    /// Matrix-vector product `y * u`.
    fn dot(y: &Self::Tensor, u: &Self::Value) -> Self::Value;

    /// Complex power `u * conj(i)`, evaluated per phase.
    fn power(u: &Self::Value, i: &Self::Value) -> Self::Value;

    fn format(y: &Self::Tensor) -> String;
}

/// Balanced, single-phase equivalent representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symmetric;

/// Full three-phase representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Asymmetric;

impl PhaseModel for Symmetric {
    type Tensor = Complex64;
    type Value = Complex64;

    const IS_SYMMETRIC: bool = true;

    fn dot(y: &Complex64, u: &Complex64) -> Complex64 {
        y * u
    }

    fn power(u: &Complex64, i: &Complex64) -> Complex64 {
        u * i.conj()
    }

    fn format(y: &Complex64) -> String {
        format_complex(y)
    }
}

impl PhaseModel for Asymmetric {
    type Tensor = ComplexTensor;
    type Value = ComplexValue;

    const IS_SYMMETRIC: bool = false;

    fn dot(y: &ComplexTensor, u: &ComplexValue) -> ComplexValue {
        *y * *u
    }

    fn power(u: &ComplexValue, i: &ComplexValue) -> ComplexValue {
        ComplexValue([0usize, 1, 2].map(|p| u[p] * i[p].conj()))
    }

    fn format(y: &ComplexTensor) -> String {
        format_tensor(y)
    }
}

/// Three-phase complex vector (one entry per phase).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComplexValue(pub [Complex64; 3]);

impl ComplexValue {
    pub fn new(a: Complex64, b: Complex64, c: Complex64) -> Self {
        Self([a, b, c])
    }

    /// Same value on all three phases.
    pub fn from_uniform(u: Complex64) -> Self {
        Self([u; 3])
    }

    /// Balanced positive-sequence set `(u, u*a^2, u*a)`.
    pub fn positive_sequence(u: Complex64) -> Self {
        Self([u, u * A * A, u * A])
    }

    pub fn conj(&self) -> Self {
        Self(self.0.map(|x| x.conj()))
    }

    /// Largest absolute value over the three phases.
    pub fn norm_inf(&self) -> f64 {
        self.0.iter().map(|x| x.norm()).fold(0.0, f64::max)
    }
}

impl Index<usize> for ComplexValue {
    type Output = Complex64;

    fn index(&self, phase: usize) -> &Complex64 {
        &self.0[phase]
    }
}

impl IndexMut<usize> for ComplexValue {
    fn index_mut(&mut self, phase: usize) -> &mut Complex64 {
        &mut self.0[phase]
    }
}

impl Add for ComplexValue {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self([0usize, 1, 2].map(|p| self[p] + rhs[p]))
    }
}

impl AddAssign for ComplexValue {
    fn add_assign(&mut self, rhs: Self) {
        for p in 0..3 {
            self[p] += rhs[p];
        }
    }
}

impl Sub for ComplexValue {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self([0usize, 1, 2].map(|p| self[p] - rhs[p]))
    }
}

impl Neg for ComplexValue {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.map(|x| -x))
    }
}

impl Zero for ComplexValue {
    fn zero() -> Self {
        Self::default()
    }

    fn is_zero(&self) -> bool {
        self.0.iter().all(|x| x.is_zero())
    }
}

/// 3x3 complex matrix coupling the phases of two buses.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComplexTensor(pub [[Complex64; 3]; 3]);

impl ComplexTensor {
    /// `x` on the diagonal, zero elsewhere.
    ///
    /// Lifts a symmetric admittance into the three-phase model.
    pub fn from_diagonal(x: Complex64) -> Self {
        Self::from_self_mutual(x, Complex64::zero())
    }

    /// Self admittance `s` on the diagonal, mutual admittance `m` elsewhere.
    pub fn from_self_mutual(s: Complex64, m: Complex64) -> Self {
        let mut t = Self([[m; 3]; 3]);
        for p in 0..3 {
            t.0[p][p] = s;
        }
        t
    }

    pub fn diagonal(&self) -> ComplexValue {
        ComplexValue([0usize, 1, 2].map(|p| self.0[p][p]))
    }

    /// Largest absolute value over all entries.
    pub fn norm_inf(&self) -> f64 {
        self.0
            .iter()
            .flatten()
            .map(|x| x.norm())
            .fold(0.0, f64::max)
    }
}

impl Index<(usize, usize)> for ComplexTensor {
    type Output = Complex64;

    fn index(&self, (r, c): (usize, usize)) -> &Complex64 {
        &self.0[r][c]
    }
}

impl IndexMut<(usize, usize)> for ComplexTensor {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut Complex64 {
        &mut self.0[r][c]
    }
}

impl Add for ComplexTensor {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for ComplexTensor {
    fn add_assign(&mut self, rhs: Self) {
        for r in 0..3 {
            for c in 0..3 {
                self.0[r][c] += rhs.0[r][c];
            }
        }
    }
}

impl Sub for ComplexTensor {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        for r in 0..3 {
            for c in 0..3 {
                self.0[r][c] -= rhs.0[r][c];
            }
        }
        self
    }
}

impl Neg for ComplexTensor {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.map(|row| row.map(|x| -x)))
    }
}

impl Mul<ComplexValue> for ComplexTensor {
    type Output = ComplexValue;

    fn mul(self, u: ComplexValue) -> ComplexValue {
        ComplexValue(self.0.map(|row| row[0] * u[0] + row[1] * u[1] + row[2] * u[2]))
    }
}

impl Zero for ComplexTensor {
    fn zero() -> Self {
        Self::default()
    }

    fn is_zero(&self) -> bool {
        self.0.iter().flatten().all(|x| x.is_zero())
    }
}
