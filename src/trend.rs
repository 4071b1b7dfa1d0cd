//! # Trend Stitching
//!
//! Produces the period-to-period change grids behind the RH and temperature
//! trend maps.
//!
//! The deltas are computed in three runs:
//! 1. consecutive short-term periods,
//! 2. one seam delta, the first extended-term period minus the last short-term one,
//! 3. consecutive extended-term periods.
//!
//! The seam is always differenced exactly at the dataset boundary. Skip
//! decisions change which periods are displayed, never which grids form the
//! seam. A delta whose operand grid is missing or mis-shaped is dropped with an
//! [`AlignmentWarning`]; the rest of the sequence is still produced.

use crate::dataset::{DatasetSource, ForecastDataset};
use crate::error::AlignmentWarning;
use crate::sequence::PeriodKey;
use log::{debug, warn};
use ndarray::{Array2, ArrayView2};
use serde::Serialize;

/// Element-wise change between two periods (`to - from`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaGrid {
    pub from: PeriodKey,
    pub to: PeriodKey,
    /// Operand positions on the unskipped short-then-extended timeline, 1-based
    pub display_index_pair: (usize, usize),
    #[serde(skip)]
    pub grid: Array2<f32>,
}

impl DeltaGrid {
    pub fn is_seam(&self) -> bool {
        self.from.source == DatasetSource::ShortTerm
            && self.to.source == DatasetSource::ExtendedTerm
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.dim()
    }
}

/// Ordered delta grids for one trend product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSequence {
    pub variable: String,
    pub deltas: Vec<DeltaGrid>,
    pub warnings: Vec<AlignmentWarning>,
}

impl TrendSequence {
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeltaGrid> {
        self.deltas.iter()
    }

    /// Deltas dropped for a missing or mis-shaped operand grid
    pub fn dropped_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| {
                matches!(
                    w,
                    AlignmentWarning::MissingGrid { .. } | AlignmentWarning::ShapeMismatch { .. }
                )
            })
            .count()
    }

    /// The short/extended boundary delta, if it could be computed
    pub fn seam(&self) -> Option<&DeltaGrid> {
        self.deltas.iter().find(|d| d.is_seam())
    }
}

impl<'a> IntoIterator for &'a TrendSequence {
    type Item = &'a DeltaGrid;
    type IntoIter = std::slice::Iter<'a, DeltaGrid>;

    fn into_iter(self) -> Self::IntoIter {
        self.deltas.iter()
    }
}

/// Computes [`TrendSequence`]s from a short-term and an extended-term dataset
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendStitcher;

impl TrendStitcher {
    pub fn new() -> Self {
        Self
    }

    pub fn deltas<S, E>(&self, short: &S, extended: &E, variable: &str) -> TrendSequence
    where
        S: ForecastDataset + ?Sized,
        E: ForecastDataset + ?Sized,
    {
        let short_count = short.period_count();
        let extended_count = extended.period_count();
        let timeline = |key: PeriodKey| match key.source {
            DatasetSource::ShortTerm => key.index + 1,
            DatasetSource::ExtendedTerm => short_count + key.index + 1,
        };

        let mut deltas = Vec::with_capacity((short_count + extended_count).saturating_sub(1));
        let mut warnings = Vec::new();
        let mut push = |from: PeriodKey, to: PeriodKey| {
            let from_grid = match source_grid(short, extended, variable, from) {
                Ok(grid) => grid,
                Err(warning) => return record(&mut warnings, warning),
            };
            let to_grid = match source_grid(short, extended, variable, to) {
                Ok(grid) => grid,
                Err(warning) => return record(&mut warnings, warning),
            };
            if from_grid.dim() != to_grid.dim() {
                return record(
                    &mut warnings,
                    AlignmentWarning::ShapeMismatch {
                        variable: variable.to_string(),
                        from_dataset: from.source,
                        from_index: from.index,
                        from_shape: from_grid.dim(),
                        to_dataset: to.source,
                        to_index: to.index,
                        to_shape: to_grid.dim(),
                    },
                );
            }
            deltas.push(DeltaGrid {
                from,
                to,
                display_index_pair: (timeline(from), timeline(to)),
                grid: &to_grid - &from_grid,
            });
        };

        for i in 1..short_count {
            push(PeriodKey::short_term(i - 1), PeriodKey::short_term(i));
        }

        if short_count > 0 && extended_count > 0 {
            push(
                PeriodKey::short_term(short_count - 1),
                PeriodKey::extended_term(0),
            );
        } else {
            debug!("No seam delta for '{}': one of the datasets is empty", variable);
        }

        for i in 1..extended_count {
            push(PeriodKey::extended_term(i - 1), PeriodKey::extended_term(i));
        }

        debug!(
            "Stitched {} deltas for '{}' ({} dropped)",
            deltas.len(),
            variable,
            warnings.len()
        );

        TrendSequence {
            variable: variable.to_string(),
            deltas,
            warnings,
        }
    }
}

fn source_grid<'a, S, E>(
    short: &'a S,
    extended: &'a E,
    variable: &str,
    key: PeriodKey,
) -> Result<ArrayView2<'a, f32>, AlignmentWarning>
where
    S: ForecastDataset + ?Sized,
    E: ForecastDataset + ?Sized,
{
    let missing = || AlignmentWarning::MissingGrid {
        dataset: key.source,
        index: key.index,
        variable: variable.to_string(),
    };

    let grid = match key.source {
        DatasetSource::ShortTerm if key.index < short.period_count() => {
            short.grid(variable, key.index)
        }
        DatasetSource::ExtendedTerm if key.index < extended.period_count() => {
            extended.grid(variable, key.index)
        }
        _ => None,
    };
    grid.ok_or_else(missing)
}

fn record(warnings: &mut Vec<AlignmentWarning>, warning: AlignmentWarning) {
    warn!("{}", warning);
    warnings.push(warning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::GriddedDataset;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 20, 6, 0, 0).unwrap()
    }

    /// Dataset whose period `i` grid is filled with `base + i`.
    fn filled(count: usize, base: f32, offset_periods: usize) -> GriddedDataset {
        let grids = (0..count)
            .map(|i| Array2::from_elem((2, 3), base + i as f32))
            .collect();
        GriddedDataset::builder(6)
            .twelve_hour_periods(start() + Duration::hours(12 * offset_periods as i64), count)
            .variable("maxrh", grids)
            .build()
    }

    #[test]
    fn test_deltas_include_one_seam() {
        let short = filled(7, 10.0, 0);
        let extended = filled(7, 50.0, 7);
        let trends = TrendStitcher::new().deltas(&short, &extended, "maxrh");

        assert_eq!(trends.len(), 13);
        assert!(trends.warnings.is_empty());
        assert_eq!(trends.deltas.iter().filter(|d| d.is_seam()).count(), 1);

        let seam = trends.seam().unwrap();
        assert_eq!(seam.from, PeriodKey::short_term(6));
        assert_eq!(seam.to, PeriodKey::extended_term(0));
        assert_eq!(seam.display_index_pair, (7, 8));
        // 50 - 16
        assert!(seam.grid.iter().all(|v| *v == 34.0));
    }

    #[test]
    fn test_intra_dataset_deltas() {
        let short = filled(3, 0.0, 0);
        let extended = filled(3, 100.0, 3);
        let trends = TrendStitcher::new().deltas(&short, &extended, "maxrh");

        let pairs: Vec<_> = trends.iter().map(|d| d.display_index_pair).collect();
        assert_eq!(pairs, vec![(1, 2), (2, 3), (3, 4), (4, 5), (5, 6)]);
        for delta in trends.iter().filter(|d| !d.is_seam()) {
            assert!(delta.grid.iter().all(|v| *v == 1.0));
            assert_eq!(delta.shape(), (2, 3));
        }
    }

    #[test]
    fn test_empty_extended_has_no_seam() {
        let short = filled(5, 0.0, 0);
        let extended = GriddedDataset::new(6, Vec::new());
        let trends = TrendStitcher::new().deltas(&short, &extended, "maxrh");

        assert_eq!(trends.len(), 4);
        assert!(trends.seam().is_none());
        assert!(trends.warnings.is_empty());
    }

    #[test]
    fn test_missing_grid_drops_single_delta() {
        let short = filled(4, 0.0, 0);
        // Extended dataset announces 3 periods but only carries 2 grids.
        let extended = GriddedDataset::builder(6)
            .twelve_hour_periods(start() + Duration::hours(48), 3)
            .variable(
                "maxrh",
                vec![Array2::from_elem((2, 3), 9.0), Array2::from_elem((2, 3), 8.0)],
            )
            .build();

        let trends = TrendStitcher::new().deltas(&short, &extended, "maxrh");
        assert_eq!(trends.len(), 5);
        assert_eq!(trends.dropped_count(), 1);
        assert_eq!(
            trends.warnings,
            vec![AlignmentWarning::MissingGrid {
                dataset: DatasetSource::ExtendedTerm,
                index: 2,
                variable: "maxrh".to_string(),
            }]
        );
        assert!(trends.seam().is_some());
    }

    #[test]
    fn test_unknown_variable_drops_everything_without_error() {
        let short = filled(3, 0.0, 0);
        let extended = filled(2, 0.0, 3);
        let trends = TrendStitcher::new().deltas(&short, &extended, "mint");

        assert!(trends.is_empty());
        assert_eq!(trends.warnings.len(), 4);
    }

    #[test]
    fn test_shape_mismatch_drops_delta() {
        let short = filled(2, 0.0, 0);
        let extended = GriddedDataset::builder(6)
            .twelve_hour_periods(start() + Duration::hours(24), 1)
            .variable("maxrh", vec![Array2::zeros((4, 4))])
            .build();

        let trends = TrendStitcher::new().deltas(&short, &extended, "maxrh");
        assert_eq!(trends.len(), 1);
        assert!(trends.seam().is_none());
        assert!(matches!(
            trends.warnings.as_slice(),
            [AlignmentWarning::ShapeMismatch { from_shape: (2, 3), to_shape: (4, 4), .. }]
        ));
    }

    #[test]
    fn test_input_grids_are_untouched() {
        let short = filled(2, 1.0, 0);
        let extended = filled(1, 5.0, 2);
        let _ = TrendStitcher::new().deltas(&short, &extended, "maxrh");
        assert!(short.grid("maxrh", 0).unwrap().iter().all(|v| *v == 1.0));
        assert!(extended.grid("maxrh", 0).unwrap().iter().all(|v| *v == 5.0));
    }
}
