//! # Period Sequencing
//!
//! Stitches the short-term and extended-term datasets into one ordered run of
//! [`PeriodDescriptor`]s with continuous 1-based display numbering.
//!
//! ## Numbering
//!
//! - Short-term periods start at source index 1 when the first period is
//!   skipped, 0 otherwise. The first displayed period is always numbered 1.
//! - Every extended-term period follows the short-term run, numbered in
//!   emission order.
//! - Periods with no validity window are dropped; numbering stays gap-free.
//!
//! [`PeriodSequence::extended_start_display`] is the nominal number of the
//! first extended-term period, `short_count - skip + 1`. Products with the seam
//! adjustment report it one lower under a skip (never below 1). It only feeds
//! labels and never removes a period.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use firewx::clock::SkipDecision;
//! use firewx::dataset::GriddedDataset;
//! use firewx::sequence::PeriodSequencer;
//!
//! let start = Utc.with_ymd_and_hms(2026, 7, 1, 6, 0, 0).unwrap();
//! let short = GriddedDataset::builder(6).twelve_hour_periods(start, 7).build();
//! let extended = GriddedDataset::builder(6)
//!     .twelve_hour_periods(start + chrono::Duration::hours(84), 7)
//!     .build();
//!
//! let periods = PeriodSequencer::default().sequence(&short, &extended, SkipDecision::fresh());
//! assert_eq!(periods.display_indices(), (1..=14).collect::<Vec<_>>());
//! assert_eq!(periods.extended_start_display, Some(8));
//! ```

use crate::clock::SkipDecision;
use crate::dataset::{DatasetSource, ForecastDataset};
use crate::error::AlignmentWarning;
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use log::{debug, warn};
use serde::Serialize;
use std::fmt;

/// Reference to one period of one of the two datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PeriodKey {
    pub source: DatasetSource,
    pub index: usize,
}

impl PeriodKey {
    pub fn short_term(index: usize) -> Self {
        Self {
            source: DatasetSource::ShortTerm,
            index,
        }
    }

    pub fn extended_term(index: usize) -> Self {
        Self {
            source: DatasetSource::ExtendedTerm,
            index,
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.source, self.index)
    }
}

/// Day or night half of a 12-hour forecast period pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PeriodPhase {
    Day,
    Night,
}

impl PeriodPhase {
    /// Periods starting between 06 and 18 local time are day periods.
    pub fn from_start(valid_start: DateTime<Utc>, offset: FixedOffset) -> Self {
        let hour = valid_start.with_timezone(&offset).hour();
        if (6..18).contains(&hour) {
            PeriodPhase::Day
        } else {
            PeriodPhase::Night
        }
    }
}

impl fmt::Display for PeriodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodPhase::Day => write!(f, "Day"),
            PeriodPhase::Night => write!(f, "Night"),
        }
    }
}

/// One displayable forecast period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodDescriptor {
    /// 1-based, continuous across the short/extended seam
    pub display_index: usize,
    pub source: DatasetSource,
    pub source_index: usize,
    pub valid_start: DateTime<Utc>,
    pub valid_end: DateTime<Utc>,
}

impl PeriodDescriptor {
    pub fn key(&self) -> PeriodKey {
        PeriodKey {
            source: self.source,
            index: self.source_index,
        }
    }

    pub fn phase(&self, offset: FixedOffset) -> PeriodPhase {
        PeriodPhase::from_start(self.valid_start, offset)
    }

    /// Human-facing title such as "Night 3" or "Day 5"
    pub fn label(&self, offset: FixedOffset) -> String {
        format!("{} {}", self.phase(offset), self.display_index)
    }
}

/// Ordered period descriptors for one render pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSequence {
    pub periods: Vec<PeriodDescriptor>,
    /// Nominal display number of extended-term period 0, `None` when the
    /// extended dataset is empty.
    ///
    /// Derived from the period counts, not from the emitted descriptors: after
    /// a `MissingValidity` drop it can differ from the `display_index` actually
    /// given to extended-term period 0.
    pub extended_start_display: Option<usize>,
    pub skip: SkipDecision,
    pub warnings: Vec<AlignmentWarning>,
}

impl PeriodSequence {
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PeriodDescriptor> {
        self.periods.iter()
    }

    pub fn display_indices(&self) -> Vec<usize> {
        self.periods.iter().map(|p| p.display_index).collect()
    }

    pub fn from_source(&self, source: DatasetSource) -> impl Iterator<Item = &PeriodDescriptor> {
        self.periods.iter().filter(move |p| p.source == source)
    }

    /// Periods dropped for a missing validity window
    pub fn dropped_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, AlignmentWarning::MissingValidity { .. }))
            .count()
    }

    pub fn display_index_of(&self, key: PeriodKey) -> Option<usize> {
        self.periods
            .iter()
            .find(|p| p.key() == key)
            .map(|p| p.display_index)
    }
}

impl<'a> IntoIterator for &'a PeriodSequence {
    type Item = &'a PeriodDescriptor;
    type IntoIter = std::slice::Iter<'a, PeriodDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.periods.iter()
    }
}

/// Builds a [`PeriodSequence`] from the two datasets and a skip decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodSequencer {
    seam_adjustment: bool,
}

impl PeriodSequencer {
    pub fn new(seam_adjustment: bool) -> Self {
        Self { seam_adjustment }
    }

    pub fn sequence<S, E>(&self, short: &S, extended: &E, skip: SkipDecision) -> PeriodSequence
    where
        S: ForecastDataset + ?Sized,
        E: ForecastDataset + ?Sized,
    {
        let mut warnings = Vec::new();
        for (dataset, count) in [
            (DatasetSource::ShortTerm, short.period_count()),
            (DatasetSource::ExtendedTerm, extended.period_count()),
        ] {
            if count == 0 {
                record(&mut warnings, AlignmentWarning::EmptyDataset { dataset });
            }
        }

        let short_count = short.period_count();
        let start = skip.first_source_index();
        let mut periods = Vec::with_capacity(short_count + extended.period_count());

        for index in start..short_count {
            push_period(
                &mut periods,
                &mut warnings,
                short,
                DatasetSource::ShortTerm,
                index,
            );
        }

        for index in 0..extended.period_count() {
            push_period(
                &mut periods,
                &mut warnings,
                extended,
                DatasetSource::ExtendedTerm,
                index,
            );
        }

        let extended_start_display = self.extended_start_display(short_count, extended, skip);

        debug!(
            "Sequenced {} periods (skip_first={}, extended_start_display={:?})",
            periods.len(),
            skip.skip_first,
            extended_start_display
        );

        PeriodSequence {
            periods,
            extended_start_display,
            skip,
            warnings,
        }
    }

    fn extended_start_display<E>(
        &self,
        short_count: usize,
        extended: &E,
        skip: SkipDecision,
    ) -> Option<usize>
    where
        E: ForecastDataset + ?Sized,
    {
        if extended.is_empty() {
            return None;
        }
        if short_count == 0 {
            return Some(1);
        }
        let first = short_count - skip.first_source_index() + 1;
        if self.seam_adjustment && skip.skip_first {
            Some(first.saturating_sub(1).max(1))
        } else {
            Some(first)
        }
    }
}

fn push_period<D>(
    periods: &mut Vec<PeriodDescriptor>,
    warnings: &mut Vec<AlignmentWarning>,
    dataset: &D,
    source: DatasetSource,
    index: usize,
) where
    D: ForecastDataset + ?Sized,
{
    match (dataset.period_start(index), dataset.period_end(index)) {
        (Some(valid_start), Some(valid_end)) => periods.push(PeriodDescriptor {
            display_index: periods.len() + 1,
            source,
            source_index: index,
            valid_start,
            valid_end,
        }),
        _ => record(
            warnings,
            AlignmentWarning::MissingValidity {
                dataset: source,
                index,
            },
        ),
    }
}

fn record(warnings: &mut Vec<AlignmentWarning>, warning: AlignmentWarning) {
    warn!("{}", warning);
    warnings.push(warning);
}
