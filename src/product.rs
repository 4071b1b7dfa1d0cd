//! # Product Families
//!
//! Per-product calibration data for the period clock and sequencer.
//!
//! Each forecast graphic family carries two constants that cannot be derived
//! from generic rules:
//! - the wall-clock transition window during which a stale cycle's first
//!   period is still displayed, and
//! - whether extended-term display numbering starts one lower when the first
//!   short-term period is skipped (the seam adjustment).
//!
//! Defaults live in [`ProductFamily::default_profile`] and can be overridden
//! per family through [`crate::input::EngineConfig`].

use crate::clock::{PeriodClock, TransitionWindow};
use crate::error::AlignmentResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// NDFD fire-weather graphic families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFamily {
    /// Overnight RH recovery
    MaximumRelativeHumidity,
    MinimumRelativeHumidity,
    MaximumTemperature,
    MinimumTemperature,
    MaximumRelativeHumidityTrend,
    MinimumRelativeHumidityTrend,
    MaximumTemperatureTrend,
    MinimumTemperatureTrend,
}

impl ProductFamily {
    pub const ALL: [ProductFamily; 8] = [
        ProductFamily::MaximumRelativeHumidity,
        ProductFamily::MinimumRelativeHumidity,
        ProductFamily::MaximumTemperature,
        ProductFamily::MinimumTemperature,
        ProductFamily::MaximumRelativeHumidityTrend,
        ProductFamily::MinimumRelativeHumidityTrend,
        ProductFamily::MaximumTemperatureTrend,
        ProductFamily::MinimumTemperatureTrend,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProductFamily::MaximumRelativeHumidity => "maximum_relative_humidity",
            ProductFamily::MinimumRelativeHumidity => "minimum_relative_humidity",
            ProductFamily::MaximumTemperature => "maximum_temperature",
            ProductFamily::MinimumTemperature => "minimum_temperature",
            ProductFamily::MaximumRelativeHumidityTrend => "maximum_relative_humidity_trend",
            ProductFamily::MinimumRelativeHumidityTrend => "minimum_relative_humidity_trend",
            ProductFamily::MaximumTemperatureTrend => "maximum_temperature_trend",
            ProductFamily::MinimumTemperatureTrend => "minimum_temperature_trend",
        }
    }

    pub fn is_trend(&self) -> bool {
        matches!(
            self,
            ProductFamily::MaximumRelativeHumidityTrend
                | ProductFamily::MinimumRelativeHumidityTrend
                | ProductFamily::MaximumTemperatureTrend
                | ProductFamily::MinimumTemperatureTrend
        )
    }

    /// NDFD element differenced by the trend variant of this family
    pub fn default_variable(&self) -> &'static str {
        match self {
            ProductFamily::MaximumRelativeHumidity | ProductFamily::MaximumRelativeHumidityTrend => {
                "maxrh"
            }
            ProductFamily::MinimumRelativeHumidity | ProductFamily::MinimumRelativeHumidityTrend => {
                "minrh"
            }
            ProductFamily::MaximumTemperature | ProductFamily::MaximumTemperatureTrend => "maxt",
            ProductFamily::MinimumTemperature | ProductFamily::MinimumTemperatureTrend => "mint",
        }
    }

    pub fn default_profile(&self) -> ProductProfile {
        let (window, seam_adjustment) = match self {
            // Overnight products stay on the stale cycle from evening into early morning.
            ProductFamily::MaximumRelativeHumidity => (TransitionWindow::local(18, 6), false),
            ProductFamily::MinimumTemperature => (TransitionWindow::local(18, 6), false),
            ProductFamily::MaximumRelativeHumidityTrend => (TransitionWindow::local(18, 6), true),
            ProductFamily::MinimumTemperatureTrend => (TransitionWindow::local(18, 6), true),
            // Daytime products only around the afternoon peak.
            ProductFamily::MinimumRelativeHumidity => (TransitionWindow::local(10, 16), false),
            ProductFamily::MaximumTemperature => (TransitionWindow::local(10, 16), false),
            ProductFamily::MinimumRelativeHumidityTrend => (TransitionWindow::local(10, 16), true),
            ProductFamily::MaximumTemperatureTrend => (TransitionWindow::local(10, 16), true),
        };
        ProductProfile {
            transition_window: window,
            seam_adjustment,
        }
    }
}

impl fmt::Display for ProductFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Calibration constants of one product family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductProfile {
    pub transition_window: TransitionWindow,
    /// Start extended-term display numbering one lower under `skip_first`
    #[serde(default)]
    pub seam_adjustment: bool,
}

impl ProductProfile {
    pub fn validate(&self) -> AlignmentResult<()> {
        self.transition_window.validate()
    }

    pub fn period_clock(&self) -> PeriodClock {
        PeriodClock::new(self.transition_window)
    }
}
