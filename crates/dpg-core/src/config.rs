//! Solver-wide sizing and numerical settings.
//!
//! A [`Config`] is built once (from TOML or with the `with_*` setters) and
//! passed by reference to the sized constructors and to
//! [`ComplexStep::from_config`](crate::dual::complex_step::ComplexStep::from_config).
//!
//! ```toml
//! dim = 2
//! n_eq = 4
//! n_var = 4
//! p_max = 3
//! layout = "C"
//! complex_step = 1e-30
//! check_duality = true
//! print_tol = 1e-15
//! ```

use serde::{Deserialize, Serialize};

use crate::container::Layout;
use crate::error::{CoreError, Result};

/// Default imaginary step for complex-step differentiation.
pub const DEFAULT_COMPLEX_STEP: f64 = 1e-30;

/// Default print tolerance.
pub const DEFAULT_PRINT_TOL: f64 = 1e-15;

/// Solver settings that size containers and control differentiation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Spatial dimension (1, 2 or 3).
    pub dim: usize,
    /// Number of conservation equations.
    pub n_eq: usize,
    /// Number of solution variables.
    pub n_var: usize,
    /// Maximum polynomial order.
    pub p_max: usize,
    /// Layout used by the config-sized constructors.
    pub layout: Layout,
    /// Imaginary step `h` of the complex-step protocol.
    pub complex_step: f64,
    /// Compare the real part of every perturbed evaluation with the real
    /// evaluation.
    pub check_duality: bool,
    /// Entries with modulus below this print as zero.
    pub print_tol: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dim: 2,
            n_eq: 1,
            n_var: 1,
            p_max: 2,
            layout: Layout::Col,
            complex_step: DEFAULT_COMPLEX_STEP,
            check_duality: cfg!(debug_assertions),
            print_tol: DEFAULT_PRINT_TOL,
        }
    }
}

impl Config {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).map_err(|e| CoreError::Config(e.to_string()))?;
        cfg.validate()?;
        tracing::debug!(
            dim = cfg.dim,
            n_eq = cfg.n_eq,
            n_var = cfg.n_var,
            p_max = cfg.p_max,
            layout = %cfg.layout,
            "loaded configuration"
        );
        Ok(cfg)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Check the settings for consistency.
    pub fn validate(&self) -> Result<()> {
        if !(1..=3).contains(&self.dim) {
            return Err(CoreError::Config(format!(
                "dim must be 1, 2 or 3, got {}",
                self.dim
            )));
        }
        if self.n_eq == 0 || self.n_var == 0 {
            return Err(CoreError::Config(
                "n_eq and n_var must be positive".to_string(),
            ));
        }
        if !(self.complex_step.is_finite() && self.complex_step > 0.0) {
            return Err(CoreError::Config(format!(
                "complex_step must be finite and positive, got {}",
                self.complex_step
            )));
        }
        if !(self.print_tol.is_finite() && self.print_tol >= 0.0) {
            return Err(CoreError::Config(format!(
                "print_tol must be finite and non-negative, got {}",
                self.print_tol
            )));
        }
        Ok(())
    }

    /// Number of tensor-product basis functions of order `p` in `dim`
    /// dimensions, `(p + 1)^dim`. Orders above `p_max` are rejected.
    pub fn n_basis(&self, p: usize) -> Result<usize> {
        if p > self.p_max {
            return Err(CoreError::Config(format!(
                "order {p} exceeds p_max = {}",
                self.p_max
            )));
        }
        u32::try_from(self.dim)
            .ok()
            .and_then(|d| (p + 1).checked_pow(d))
            .ok_or_else(|| CoreError::Config(format!("basis size overflows for p = {p}")))
    }

    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }

    pub fn with_n_eq(mut self, n_eq: usize) -> Self {
        self.n_eq = n_eq;
        self
    }

    pub fn with_n_var(mut self, n_var: usize) -> Self {
        self.n_var = n_var;
        self
    }

    pub fn with_p_max(mut self, p_max: usize) -> Self {
        self.p_max = p_max;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_complex_step(mut self, h: f64) -> Self {
        self.complex_step = h;
        self
    }

    pub fn with_check_duality(mut self, on: bool) -> Self {
        self.check_duality = on;
        self
    }

    pub fn with_print_tol(mut self, tol: f64) -> Self {
        self.print_tol = tol;
        self
    }
}
