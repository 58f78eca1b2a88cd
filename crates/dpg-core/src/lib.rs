//! `dpg-core` — Container core of the DPG solver.
//!
//! Provides dense vectors, matrices and multi-arrays, CSR operator storage,
//! nested arrays of containers, and the real/complex scalar duality that the
//! complex-step Jacobian protocol relies on.
//!
//! # Design
//!
//! - Every container is generic over its element type and over its
//!   [`Storage`](container::Storage): `Vec<T>` for owning containers,
//!   `&[T]` for const views. Ownership and constness are therefore checked
//!   by the compiler.
//! - Matrices and multi-arrays carry a runtime [`Layout`](container::Layout)
//!   tag; operations that read by logical index give the same result for
//!   every layout combination.
//! - Kernels are written once against [`Scalar`] and instantiated for `f64`
//!   and [`Complex64`]; see [`dual`].

pub mod config;
pub mod container;
pub mod dtype;
pub mod dual;
pub mod error;
pub mod linalg;
pub mod math;
pub mod nested;

// Re-export key types at crate root for convenience.
pub use config::Config;
pub use dtype::{Element, Real, Scalar, real_part};
pub use error::{CoreError, OrFatal, Result};
pub use num_complex::{Complex, Complex32, Complex64};

/// Items intended for glob-import: `use dpg_core::prelude::*;`
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::container::{
        Layout, Matrix, MatrixView, Multiarray, MultiarrayView, NormType, Vector, VectorArray,
        VectorView,
    };
    pub use crate::dtype::{Element, Real, Scalar};
    pub use crate::dual::complex_step::{ComplexStep, Linearization};
    pub use crate::dual::{ComplexSet, DualKernel, RealSet};
    pub use crate::error::{CoreError, OrFatal, Result};
    pub use crate::linalg::{CsrOperator, CsrView, Transpose};
    pub use crate::nested::{Level, free_nested};
    pub use num_complex::Complex64;
}
