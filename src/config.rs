//! Solver configuration and its validation.

use serde::{Deserialize, Serialize};

/// Which axis, if any, stays fixed while the search expands the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedDimensionMode {
    None,
    Width,
    Height,
}

/// Which constraint model an attempt builds.
///
/// `Cells` is the authoritative model with routed belts; `Rectangles` is
/// the degenerate packing-only fallback and reports no segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    Cells,
    Rectangles,
}

/// Tunables for one solving session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolverConfig {
    /// Override for the initial width; the area estimate is used otherwise.
    pub initial_width: Option<u32>,
    /// Override for the initial height.
    pub initial_height: Option<u32>,
    pub fixed_dimension_mode: FixedDimensionMode,
    pub expansion_step: u32,
    pub max_iterations: u32,
    pub timeout_ms_per_attempt: u64,
    pub encoding: EncodingMode,
    /// Minimum clearance between footprints in the rectangles encoding.
    pub packing_gap: u32,
}

fn default_expansion_step() -> u32 { 1 }
fn default_max_iterations() -> u32 { 50 }
fn default_timeout_ms() -> u64 { 30_000 }

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            initial_width: None,
            initial_height: None,
            fixed_dimension_mode: FixedDimensionMode::None,
            expansion_step: default_expansion_step(),
            max_iterations: default_max_iterations(),
            timeout_ms_per_attempt: default_timeout_ms(),
            encoding: EncodingMode::Cells,
            packing_gap: 1,
        }
    }
}

impl SolverConfig {
    /// Reject configurations the schedule or encoder cannot honor.
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_width == Some(0) {
            return Err("initialWidth must be positive".into());
        }
        if self.initial_height == Some(0) {
            return Err("initialHeight must be positive".into());
        }
        if self.expansion_step == 0 {
            return Err("expansionStep must be positive".into());
        }
        if self.max_iterations == 0 {
            return Err("maxIterations must be positive".into());
        }
        if self.timeout_ms_per_attempt == 0 {
            return Err("timeoutMsPerAttempt must be positive".into());
        }
        if self.packing_gap > 1 {
            return Err("packingGap must be 0 or 1".into());
        }
        Ok(())
    }
}
