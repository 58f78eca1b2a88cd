//! Linear algebra on the dense containers and CSR operator storage.
//!
//! All routines are implemented from scratch, without external BLAS/LAPACK
//! bindings:
//!
//! | Level | Operations | Complexity |
//! |-------|-----------|------------|
//! | L1 | `dot`, `axpy`, `nrm2`, `asum`, `scal`, `iamax` | O(n) |
//! | L2 | `mv`, `mv_real`, `scale_by_diagonal` | O(n^2) |
//! | L3 | `mm`, `mm_real`, `mm_multiarray` | O(n^3) |
//!
//! Sparse storage: [`CsrOperator`] / [`CsrView`].

pub mod blas;
pub mod sparse;

pub use blas::{
    Side, Transpose, asum, axpy, dot, iamax, mm, mm_multiarray, mm_new, mm_real, mv, mv_new,
    mv_real, nrm2, scal, scale_by_diagonal,
};
pub use sparse::{CsrBase, CsrOperator, CsrView};
