//! # Period Clock
//!
//! Decides whether the first forecast period of a dataset is stale relative to
//! the wall clock and must be skipped.
//!
//! A dataset is "fresh" when its first period starts at the model cycle's
//! initialization hour. When it does not, the first period belongs to an older
//! cycle: it is still shown while the wall clock sits inside the product's
//! [`TransitionWindow`] (with an hour offset for valid-time labels), and
//! skipped otherwise.
//!
//! The wall clock is an explicit [`Clock`] value so callers and tests decide
//! what "now" is.

use crate::dataset::ForecastDataset;
use crate::error::{AlignmentError, AlignmentResult};
use chrono::{DateTime, Duration, FixedOffset, Local, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A wall-clock reading as a UTC instant plus the local offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    utc: DateTime<Utc>,
    offset: FixedOffset,
}

impl Clock {
    /// Read the system clock with the machine's local offset.
    pub fn now() -> Self {
        let local = Local::now();
        Self {
            utc: local.with_timezone(&Utc),
            offset: *local.offset(),
        }
    }

    pub fn at(utc: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { utc, offset }
    }

    /// A clock whose local time is UTC
    pub fn utc(utc: DateTime<Utc>) -> Self {
        Self::at(utc, Utc.fix())
    }

    pub fn utc_time(&self) -> DateTime<Utc> {
        self.utc
    }

    pub fn local_time(&self) -> DateTime<FixedOffset> {
        self.utc.with_timezone(&self.offset)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn hour(&self, reference: HourReference) -> u32 {
        match reference {
            HourReference::Local => self.local_time().hour(),
            HourReference::Utc => self.utc.hour(),
        }
    }
}

/// Which wall-clock hour a transition window is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HourReference {
    #[default]
    Local,
    Utc,
}

/// Half-open hour range `[start_hour, end_hour)` that may wrap past midnight.
///
/// `start_hour == end_hour` is an empty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionWindow {
    pub start_hour: u32,
    pub end_hour: u32,
    #[serde(default)]
    pub reference: HourReference,
}

impl TransitionWindow {
    pub fn new(start_hour: u32, end_hour: u32, reference: HourReference) -> AlignmentResult<Self> {
        let window = Self {
            start_hour,
            end_hour,
            reference,
        };
        window.validate()?;
        Ok(window)
    }

    pub(crate) const fn local(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
            reference: HourReference::Local,
        }
    }

    pub fn validate(&self) -> AlignmentResult<()> {
        if self.start_hour >= 24 || self.end_hour >= 24 {
            return Err(AlignmentError::InvalidTransitionWindow {
                start_hour: self.start_hour,
                end_hour: self.end_hour,
            });
        }
        Ok(())
    }

    pub fn contains(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

impl fmt::Display for TransitionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reference = match self.reference {
            HourReference::Local => "local",
            HourReference::Utc => "UTC",
        };
        write!(
            f,
            "[{:02}:00, {:02}:00) {}",
            self.start_hour, self.end_hour, reference
        )
    }
}

/// Outcome of [`PeriodClock::decide`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SkipDecision {
    /// Drop the first short-term period from display
    pub skip_first: bool,
    /// Hours between the first period start and the init hour; label correction only
    pub hour_offset: i32,
}

impl SkipDecision {
    pub fn fresh() -> Self {
        Self::default()
    }

    /// First short-term source index to display
    pub fn first_source_index(&self) -> usize {
        usize::from(self.skip_first)
    }

    /// Shift a valid-time label by the stale-cycle hour offset.
    pub fn label_time(&self, valid_time: DateTime<Utc>) -> DateTime<Utc> {
        valid_time + Duration::hours(i64::from(self.hour_offset))
    }
}

/// Stale-cycle detector for one product family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodClock {
    window: TransitionWindow,
}

impl PeriodClock {
    pub fn new(window: TransitionWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &TransitionWindow {
        &self.window
    }

    /// Decide whether the first period is skipped.
    ///
    /// When the first period starts exactly on `init_hour` the transition
    /// window is never consulted.
    pub fn decide(
        &self,
        now: &Clock,
        init_hour: u32,
        first_period_start: DateTime<Utc>,
    ) -> SkipDecision {
        let first_hour = first_period_start.hour();
        if first_hour == init_hour {
            return SkipDecision::fresh();
        }

        if self.window.contains(now.hour(self.window.reference)) {
            SkipDecision {
                skip_first: false,
                hour_offset: first_hour as i32 - init_hour as i32,
            }
        } else {
            SkipDecision {
                skip_first: true,
                hour_offset: 0,
            }
        }
    }

    /// [`PeriodClock::decide`] using the dataset's own init hour and first
    /// period. A dataset without periods has nothing to skip.
    pub fn decide_for<D>(&self, now: &Clock, dataset: &D) -> SkipDecision
    where
        D: ForecastDataset + ?Sized,
    {
        match dataset.period_start(0) {
            Some(first_period_start) => {
                self.decide(now, dataset.init_hour(), first_period_start)
            }
            None => SkipDecision::fresh(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::GriddedDataset;
    use chrono::TimeZone;

    fn overnight() -> PeriodClock {
        PeriodClock::new(TransitionWindow::local(18, 6))
    }

    fn utc(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 14, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_fresh_cycle_never_skips() {
        let decision = overnight().decide(&Clock::utc(utc(11)), 6, utc(6));
        assert_eq!(decision, SkipDecision::fresh());
        assert_eq!(decision.first_source_index(), 0);
    }

    #[test]
    fn test_exact_alignment_short_circuits_window() {
        // The clock sits inside the window, but alignment wins.
        let decision = overnight().decide(&Clock::utc(utc(20)), 18, utc(18));
        assert!(!decision.skip_first);
        assert_eq!(decision.hour_offset, 0);
    }

    #[test]
    fn test_stale_cycle_inside_window_keeps_first_period() {
        let decision = overnight().decide(&Clock::utc(utc(20)), 6, utc(18));
        assert!(!decision.skip_first);
        assert_eq!(decision.hour_offset, 12);
        assert_eq!(decision.label_time(utc(18)), utc(18) + Duration::hours(12));
    }

    #[test]
    fn test_stale_cycle_outside_window_skips() {
        let decision = overnight().decide(&Clock::utc(utc(13)), 6, utc(18));
        assert!(decision.skip_first);
        assert_eq!(decision.hour_offset, 0);
        assert_eq!(decision.first_source_index(), 1);
    }

    #[test]
    fn test_negative_offset() {
        let clock = PeriodClock::new(TransitionWindow::local(0, 12));
        let decision = clock.decide(&Clock::utc(utc(3)), 12, utc(0));
        assert_eq!(decision.hour_offset, -12);
    }

    #[test]
    fn test_decide_is_idempotent() {
        let now = Clock::utc(utc(22));
        let first = overnight().decide(&now, 0, utc(12));
        let second = overnight().decide(&now, 0, utc(12));
        assert_eq!(first, second);
    }

    #[test]
    fn test_window_uses_local_hour() {
        // 02 UTC is 19 local at UTC-7, inside the overnight window.
        let offset = FixedOffset::west_opt(7 * 3600).unwrap();
        let now = Clock::at(utc(2), offset);
        assert_eq!(now.hour(HourReference::Local), 19);
        assert_eq!(now.hour(HourReference::Utc), 2);

        let local_window = PeriodClock::new(TransitionWindow::local(18, 23));
        assert!(!local_window.decide(&now, 6, utc(18)).skip_first);

        let utc_window =
            PeriodClock::new(TransitionWindow::new(18, 23, HourReference::Utc).unwrap());
        assert!(utc_window.decide(&now, 6, utc(18)).skip_first);
    }

    #[test]
    fn test_window_contains() {
        let wrapping = TransitionWindow::local(18, 6);
        assert!(wrapping.contains(18));
        assert!(wrapping.contains(23));
        assert!(wrapping.contains(0));
        assert!(wrapping.contains(5));
        assert!(!wrapping.contains(6));
        assert!(!wrapping.contains(12));

        let midday = TransitionWindow::local(10, 16);
        assert!(midday.contains(10));
        assert!(!midday.contains(16));

        let empty = TransitionWindow::local(9, 9);
        assert!((0..24).all(|h| !empty.contains(h)));
    }

    #[test]
    fn test_window_validation() {
        assert!(TransitionWindow::new(24, 6, HourReference::Local).is_err());
        assert!(TransitionWindow::new(18, 30, HourReference::Utc).is_err());
        assert!(TransitionWindow::new(23, 0, HourReference::Utc).is_ok());
    }

    #[test]
    fn test_decide_for_dataset() {
        let stale = GriddedDataset::builder(6)
            .twelve_hour_periods(utc(18), 4)
            .build();
        let decision = overnight().decide_for(&Clock::utc(utc(12)), &stale);
        assert!(decision.skip_first);

        let empty = GriddedDataset::new(6, Vec::new());
        assert_eq!(
            overnight().decide_for(&Clock::utc(utc(12)), &empty),
            SkipDecision::fresh()
        );
    }

    #[test]
    fn test_window_display() {
        assert_eq!(TransitionWindow::local(18, 6).to_string(), "[18:00, 06:00) local");
    }
}
