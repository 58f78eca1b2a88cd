//! # DPG
//!
//! Container core of a discontinuous Petrov-Galerkin solver.
//!
//! One `use dpg::prelude::*;` gives you the dense containers, CSR operators,
//! nested arrays and the complex-step Jacobian protocol.
//!
//! ## Feature Flags
//!
//! | Feature | Enables |
//! |---------|---------|
//! | `core` *(default)* | Containers, linear algebra, nested arrays, complex step |
//! | `parallel` | Column-parallel complex-step Jacobians (rayon) |

#[cfg(feature = "core")]
pub use dpg_core as core;

/// Glob-import convenience: `use dpg::prelude::*;`
pub mod prelude {
    #[cfg(feature = "core")]
    pub use dpg_core::prelude::*;
}
