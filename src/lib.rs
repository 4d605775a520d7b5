//! Sparse bus admittance matrix (Y-bus) assembly and post-solve branch and
//! shunt flow calculation.
//!
//! A [`YBusStructure`] is derived from a [`Topology`] only and can be
//! reused for any [`ModelParam`] on that topology. [`YBus`] combines it
//! with assembled admittance values for either the [`Symmetric`] or the
//! [`Asymmetric`] phase model.

mod error;
mod flow;
mod param;
mod structure;
mod tensor;
mod topology;
mod ybus;

pub mod debug;

#[cfg(test)]
mod tests;

pub use error::*;
pub use flow::*;
pub use param::*;
pub use structure::*;
pub use tensor::*;
pub use topology::*;
pub use ybus::*;
