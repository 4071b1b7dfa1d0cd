//! # Decimation
//!
//! Maps a domain's bounding box to the stride between rendered sample points,
//! so station-style value labels stay readable whether the map shows a county
//! or the whole CONUS.
//!
//! The stride comes from a calibration table per [`DomainKind`]. Each table is
//! a list of `(max_area, stride)` breakpoints in square degrees plus a stride
//! for anything larger. Tables are plain data and can be replaced through
//! [`crate::input::EngineConfig`].

use crate::error::{AlignmentError, AlignmentResult};
use crate::region::BoundingBox;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Whether a domain came from a named-region table or an explicit box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    Named,
    Custom,
}

/// Spacing between rendered sample points, always at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DecimationStride(NonZeroU32);

impl DecimationStride {
    pub fn new(stride: u32) -> Option<Self> {
        NonZeroU32::new(stride).map(Self)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }

    /// Stride as a slice step for grid indexing
    pub fn as_step(&self) -> usize {
        self.0.get() as usize
    }
}

impl fmt::Display for DecimationStride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One calibration breakpoint: boxes up to `max_area` square degrees use `stride`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub max_area: f64,
    pub stride: u32,
}

/// Area-to-stride calibration table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecimationTable {
    pub breakpoints: Vec<Breakpoint>,
    /// Stride for areas beyond the last breakpoint
    pub above_stride: u32,
}

impl DecimationTable {
    pub fn new(breakpoints: Vec<(f64, u32)>, above_stride: u32) -> AlignmentResult<Self> {
        let table = Self {
            breakpoints: breakpoints
                .into_iter()
                .map(|(max_area, stride)| Breakpoint { max_area, stride })
                .collect(),
            above_stride,
        };
        table.validate()?;
        Ok(table)
    }

    /// Default table for named states, GACC regions and CONUS
    pub fn named_default() -> Self {
        Self::from_static(
            &[(10.0, 5), (50.0, 10), (150.0, 20), (400.0, 35), (1000.0, 60)],
            80,
        )
    }

    /// Default table for explicit decimal-degree boxes
    pub fn custom_default() -> Self {
        Self::from_static(
            &[(5.0, 3), (25.0, 10), (100.0, 20), (200.0, 30), (500.0, 50)],
            75,
        )
    }

    fn from_static(breakpoints: &[(f64, u32)], above_stride: u32) -> Self {
        Self {
            breakpoints: breakpoints
                .iter()
                .map(|&(max_area, stride)| Breakpoint { max_area, stride })
                .collect(),
            above_stride,
        }
    }

    /// Check the invariants that make [`DecimationTable::stride_for_area`]
    /// monotonic and at least 1.
    pub fn validate(&self) -> AlignmentResult<()> {
        let invalid = |reason: String| Err(AlignmentError::InvalidDecimationTable(reason));

        let mut previous: Option<&Breakpoint> = None;
        for bp in &self.breakpoints {
            if !bp.max_area.is_finite() || bp.max_area <= 0.0 {
                return invalid(format!("breakpoint area {} must be positive", bp.max_area));
            }
            if bp.stride == 0 {
                return invalid(format!("stride for area {} must be at least 1", bp.max_area));
            }
            if let Some(prev) = previous {
                if bp.max_area <= prev.max_area {
                    return invalid(format!(
                        "breakpoint areas must be strictly ascending ({} after {})",
                        bp.max_area, prev.max_area
                    ));
                }
                if bp.stride < prev.stride {
                    return invalid(format!(
                        "strides must not decrease ({} after {})",
                        bp.stride, prev.stride
                    ));
                }
            }
            previous = Some(bp);
        }

        if self.above_stride == 0 {
            return invalid("stride above the last breakpoint must be at least 1".to_string());
        }
        if let Some(last) = previous
            && self.above_stride < last.stride
        {
            return invalid(format!(
                "stride above the last breakpoint ({}) is below {}",
                self.above_stride, last.stride
            ));
        }
        Ok(())
    }

    pub fn stride_for_area(&self, area: f64) -> DecimationStride {
        let raw = self
            .breakpoints
            .iter()
            .find(|bp| area <= bp.max_area)
            .map(|bp| bp.stride)
            .unwrap_or(self.above_stride);
        DecimationStride::new(raw.max(1)).unwrap_or(DecimationStride(NonZeroU32::MIN))
    }
}

/// Chooses a stride per domain kind from its calibration table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimationCalculator {
    pub named: DecimationTable,
    pub custom: DecimationTable,
}

impl Default for DecimationCalculator {
    fn default() -> Self {
        Self {
            named: DecimationTable::named_default(),
            custom: DecimationTable::custom_default(),
        }
    }
}

impl DecimationCalculator {
    pub fn new(named: DecimationTable, custom: DecimationTable) -> AlignmentResult<Self> {
        let calculator = Self { named, custom };
        calculator.validate()?;
        Ok(calculator)
    }

    pub fn validate(&self) -> AlignmentResult<()> {
        self.named.validate()?;
        self.custom.validate()
    }

    pub fn table(&self, kind: DomainKind) -> &DecimationTable {
        match kind {
            DomainKind::Named => &self.named,
            DomainKind::Custom => &self.custom,
        }
    }

    pub fn stride(&self, bbox: &BoundingBox, kind: DomainKind) -> DecimationStride {
        self.table(kind).stride_for_area(bbox.area())
    }
}
