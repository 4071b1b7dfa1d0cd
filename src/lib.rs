//! # firewx
//!
//! Forecast-period alignment core for NDFD fire-weather graphics: maximum and
//! minimum relative humidity, maximum and minimum temperature, and their
//! period-to-period trends.
//!
//! ## Features
//!
//! - **Region resolution**: state, GACC, Alaska CWA, CONUS or explicit decimal-degree boxes
//! - **Decimation**: area-driven sample stride, calibrated separately for named and custom domains
//! - **Period clock**: wall-clock aware detection of stale model cycles
//! - **Period sequencing**: one gap-free display numbering across the short-term and extended-term datasets
//! - **Trend stitching**: per-period deltas including the short/extended seam
//! - **Partial output**: missing grids and validity windows are dropped with warnings, never fatal
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use firewx::clock::Clock;
//! use firewx::dataset::GriddedDataset;
//! use firewx::input::{EngineConfig, RenderRequest};
//! use firewx::plan_render_pass;
//! use firewx::product::ProductFamily;
//! use firewx::region::RegionSelector;
//! use ndarray::Array2;
//!
//! let start = Utc.with_ymd_and_hms(2026, 7, 1, 6, 0, 0).unwrap();
//! let grids = |n: usize| -> Vec<Array2<f32>> {
//!     (0..n).map(|i| Array2::from_elem((4, 4), i as f32)).collect()
//! };
//! let short = GriddedDataset::builder(6)
//!     .twelve_hour_periods(start, 7)
//!     .variable("maxrh", grids(7))
//!     .build();
//! let extended = GriddedDataset::builder(6)
//!     .twelve_hour_periods(start + Duration::hours(84), 7)
//!     .variable("maxrh", grids(7))
//!     .build();
//!
//! let request = RenderRequest::new(
//!     RegionSelector::state("CA"),
//!     ProductFamily::MaximumRelativeHumidityTrend,
//! );
//! let clock = Clock::utc(start + Duration::hours(3));
//! let plan = plan_render_pass(&request, &EngineConfig::default(), &clock, &short, &extended)?;
//!
//! assert_eq!(plan.periods.len(), 14);
//! assert_eq!(plan.trends.map(|t| t.len()), Some(13));
//! # Ok::<(), firewx::error::AlignmentError>(())
//! ```
//!
//! ## Configuration Example
//!
//! ```json
//! {
//!   "products": {
//!     "minimum_temperature": {
//!       "transition_window": { "start_hour": 18, "end_hour": 6, "reference": "local" },
//!       "seam_adjustment": false
//!     }
//!   },
//!   "decimation": {
//!     "custom": {
//!       "breakpoints": [ { "max_area": 5.0, "stride": 3 } ],
//!       "above_stride": 40
//!     }
//!   }
//! }
//! ```

pub mod clock;
pub mod dataset;
pub mod decimation;
pub mod error;
pub mod input;
pub mod log;
pub mod product;
pub mod region;
pub mod sequence;
pub mod trend;


use crate::clock::Clock;
use crate::dataset::ForecastDataset;
use crate::decimation::DecimationStride;
use crate::error::AlignmentResult;
use crate::input::{EngineConfig, RenderRequest};
use crate::region::BoundingBox;
use crate::sequence::{PeriodSequence, PeriodSequencer};
use crate::trend::{TrendSequence, TrendStitcher};
use serde::Serialize;

/// Everything the rendering layer needs for one product on one domain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub bounding_box: BoundingBox,
    pub stride: DecimationStride,
    pub periods: PeriodSequence,
    /// Present when the request asked for trend deltas
    pub trends: Option<TrendSequence>,
}

/// Plans a render pass for one request.
///
/// This function wires the alignment core together:
/// 1. Resolves the requested region to its bounding box
/// 2. Chooses the decimation stride for the box and domain kind
/// 3. Asks the product's period clock whether the first short-term period is stale
/// 4. Sequences the displayable periods of both datasets
/// 5. Stitches trend deltas when the product (or the request) calls for them
///
/// The datasets are only read; several passes may share them across threads.
///
/// # Errors
///
/// Fails only on an unresolvable region. Missing periods, grids or mismatched
/// shapes are reported as warnings inside the returned plan.
pub fn plan_render_pass<S, E>(
    request: &RenderRequest,
    config: &EngineConfig,
    clock: &Clock,
    short: &S,
    extended: &E,
) -> AlignmentResult<RenderPlan>
where
    S: ForecastDataset + ?Sized,
    E: ForecastDataset + ?Sized,
{
    let bounding_box = region::resolve(&request.region)?;
    let stride = config
        .decimation
        .stride(&bounding_box, request.region.domain_kind());

    let profile = config.profile(request.product);
    let skip = profile.period_clock().decide_for(clock, short);
    ::log::debug!(
        "{} on {}: window {}, skip_first={}, hour_offset={}",
        request.product,
        request.region,
        profile.transition_window,
        skip.skip_first,
        skip.hour_offset
    );

    let periods = PeriodSequencer::new(profile.seam_adjustment).sequence(short, extended, skip);
    let trends = request
        .trend_variable()
        .map(|variable| TrendStitcher::new().deltas(short, extended, variable));

    Ok(RenderPlan {
        bounding_box,
        stride,
        periods,
        trends,
    })
}
