//! # Forecast Datasets
//!
//! The upstream seam of the alignment core. Data acquisition hands the core two
//! datasets, a short-term one and an extended-term one, each exposing a sequence
//! of discrete forecast periods with validity windows and named 2-D grids.
//!
//! [`ForecastDataset`] is the trait the sequencer and stitcher consume.
//! [`GriddedDataset`] is an in-memory implementation built from already-decoded
//! arrays.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use firewx::dataset::{ForecastDataset, GriddedDataset};
//! use ndarray::Array2;
//!
//! let start = Utc.with_ymd_and_hms(2026, 7, 1, 6, 0, 0).unwrap();
//! let dataset = GriddedDataset::builder(6)
//!     .twelve_hour_periods(start, 2)
//!     .variable("maxrh", vec![Array2::zeros((3, 3)), Array2::ones((3, 3))])
//!     .build();
//!
//! assert_eq!(dataset.period_count(), 2);
//! assert!(dataset.grid("maxrh", 1).is_some());
//! assert!(dataset.grid("maxrh", 2).is_none());
//! ```

use chrono::{DateTime, Duration, Utc};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Which of the two input datasets a period comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetSource {
    ShortTerm,
    ExtendedTerm,
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::ShortTerm => write!(f, "short-term"),
            DatasetSource::ExtendedTerm => write!(f, "extended-term"),
        }
    }
}

/// Read-only view of one gridded forecast dataset.
///
/// Lookups return `None` instead of panicking when an index or variable is
/// unavailable, so callers can drop the affected element and keep going.
pub trait ForecastDataset: Sync {
    /// Number of discrete forecast periods in the dataset
    fn period_count(&self) -> usize;

    /// Start of the validity window of period `index` (UTC)
    fn period_start(&self, index: usize) -> Option<DateTime<Utc>>;

    /// End of the validity window of period `index` (UTC)
    fn period_end(&self, index: usize) -> Option<DateTime<Utc>>;

    /// Nominal start hour of the model cycle, 0..24 UTC
    fn init_hour(&self) -> u32;

    /// 2-D grid of `variable` for period `index`
    fn grid(&self, variable: &str, index: usize) -> Option<ArrayView2<'_, f32>>;

    fn is_empty(&self) -> bool {
        self.period_count() == 0
    }
}

/// Validity window of a single forecast period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ValidityWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// In-memory forecast dataset holding decoded grids per variable.
///
/// A variable may carry fewer grids than there are periods; the missing tail
/// is reported as absent by [`ForecastDataset::grid`].
#[derive(Debug, Clone, Default)]
pub struct GriddedDataset {
    init_hour: u32,
    periods: Vec<ValidityWindow>,
    grids: HashMap<String, Vec<Array2<f32>>>,
}

impl GriddedDataset {
    pub fn new(init_hour: u32, periods: Vec<ValidityWindow>) -> Self {
        Self {
            init_hour,
            periods,
            grids: HashMap::new(),
        }
    }

    pub fn builder(init_hour: u32) -> GriddedDatasetBuilder {
        GriddedDatasetBuilder {
            dataset: GriddedDataset::new(init_hour, Vec::new()),
        }
    }

    /// Attach (or replace) the grids of a variable, one per period.
    pub fn insert_variable(&mut self, variable: &str, grids: Vec<Array2<f32>>) {
        self.grids.insert(variable.to_string(), grids);
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.grids.keys().map(String::as_str)
    }

    pub fn periods(&self) -> &[ValidityWindow] {
        &self.periods
    }
}

impl ForecastDataset for GriddedDataset {
    fn period_count(&self) -> usize {
        self.periods.len()
    }

    fn period_start(&self, index: usize) -> Option<DateTime<Utc>> {
        self.periods.get(index).map(|p| p.start)
    }

    fn period_end(&self, index: usize) -> Option<DateTime<Utc>> {
        self.periods.get(index).map(|p| p.end)
    }

    fn init_hour(&self) -> u32 {
        self.init_hour
    }

    fn grid(&self, variable: &str, index: usize) -> Option<ArrayView2<'_, f32>> {
        self.grids
            .get(variable)
            .and_then(|grids| grids.get(index))
            .map(|grid| grid.view())
    }
}

/// Builder for [`GriddedDataset`]
#[derive(Debug, Clone)]
pub struct GriddedDatasetBuilder {
    dataset: GriddedDataset,
}

impl GriddedDatasetBuilder {
    pub fn period(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.dataset.periods.push(ValidityWindow::new(start, end));
        self
    }

    /// Append `count` back-to-back 12-hour day/night periods beginning at `start`.
    pub fn twelve_hour_periods(mut self, start: DateTime<Utc>, count: usize) -> Self {
        let step = Duration::hours(12);
        let mut period_start = start;
        for _ in 0..count {
            let period_end = period_start + step;
            self.dataset
                .periods
                .push(ValidityWindow::new(period_start, period_end));
            period_start = period_end;
        }
        self
    }

    pub fn variable(mut self, variable: &str, grids: Vec<Array2<f32>>) -> Self {
        self.dataset.insert_variable(variable, grids);
        self
    }

    pub fn build(self) -> GriddedDataset {
        self.dataset
    }
}
