//! # Region Resolution
//!
//! Resolves a target geographic domain to a canonical [`BoundingBox`].
//!
//! A domain is selected by a [`RegionSelector`]:
//! - a U.S. state or territory code (`"CA"`),
//! - a GACC region code (`"gacc:OSCC"`, or the bare code),
//! - an Alaska CWA code (`"ak:AFG"`), narrowing the Alaska state box,
//! - the contiguous U.S. (`"conus"`),
//! - or an explicit decimal-degree box (`"-125,-114,32,42"` as west,east,south,north).
//!
//! ```rust
//! use firewx::region::{resolve, RegionSelector};
//!
//! let selector: RegionSelector = "ca".parse()?;
//! let bbox = resolve(&selector)?;
//! assert!(bbox.contains(-118.24, 34.05)); // Los Angeles
//! # Ok::<(), firewx::error::AlignmentError>(())
//! ```

use crate::decimation::DomainKind;
use crate::error::{AlignmentError, AlignmentResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geographic box in decimal degrees.
///
/// Always satisfies `west < east` and `south < north`; the only way to build
/// one is through [`BoundingBox::new`] or the resolver tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    west: f64,
    east: f64,
    south: f64,
    north: f64,
}

impl BoundingBox {
    pub fn new(west: f64, east: f64, south: f64, north: f64) -> AlignmentResult<Self> {
        let invalid = |reason: &str| AlignmentError::InvalidBoundingBox {
            west,
            east,
            south,
            north,
            reason: reason.to_string(),
        };

        if ![west, east, south, north].iter().all(|v| v.is_finite()) {
            return Err(invalid("bounds must be finite"));
        }
        if !(-180.0..=180.0).contains(&west) || !(-180.0..=180.0).contains(&east) {
            return Err(invalid("longitudes must be within [-180, 180]"));
        }
        if !(-90.0..=90.0).contains(&south) || !(-90.0..=90.0).contains(&north) {
            return Err(invalid("latitudes must be within [-90, 90]"));
        }
        if west >= east {
            return Err(invalid("west must be less than east"));
        }
        if south >= north {
            return Err(invalid("south must be less than north"));
        }

        Ok(Self::from_table(west, east, south, north))
    }

    // Table entries are checked by the `test_tables_hold_valid_boxes` unit test.
    const fn from_table(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self {
            west,
            east,
            south,
            north,
        }
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    /// Longitudinal extent in degrees
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitudinal extent in degrees
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Approximate area in square degrees
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    /// Intersection with `other`, or `None` when the boxes do not overlap.
    pub fn narrow_to(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let west = self.west.max(other.west);
        let east = self.east.min(other.east);
        let south = self.south.max(other.south);
        let north = self.north.min(other.north);
        if west < east && south < north {
            Some(Self::from_table(west, east, south, north))
        } else {
            None
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[W {:.2}, E {:.2}, S {:.2}, N {:.2}]",
            self.west, self.east, self.south, self.north
        )
    }
}

/// How a render request names its geographic domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionSelector {
    /// U.S. state or territory postal code
    State { code: String },
    /// Geographic Area Coordination Center code
    Gacc { code: String },
    /// Alaska County Warning Area code
    AlaskaCwa { code: String },
    /// Contiguous United States
    Conus,
    /// Explicit decimal-degree box
    Custom {
        west: f64,
        east: f64,
        south: f64,
        north: f64,
    },
}

impl RegionSelector {
    pub fn state(code: &str) -> Self {
        RegionSelector::State {
            code: code.to_string(),
        }
    }

    pub fn gacc(code: &str) -> Self {
        RegionSelector::Gacc {
            code: code.to_string(),
        }
    }

    pub fn alaska_cwa(code: &str) -> Self {
        RegionSelector::AlaskaCwa {
            code: code.to_string(),
        }
    }

    pub fn custom(west: f64, east: f64, south: f64, north: f64) -> Self {
        RegionSelector::Custom {
            west,
            east,
            south,
            north,
        }
    }

    pub fn domain_kind(&self) -> DomainKind {
        match self {
            RegionSelector::Custom { .. } => DomainKind::Custom,
            _ => DomainKind::Named,
        }
    }
}

impl fmt::Display for RegionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionSelector::State { code } => write!(f, "{}", code.to_ascii_uppercase()),
            RegionSelector::Gacc { code } => write!(f, "gacc:{}", code.to_ascii_uppercase()),
            RegionSelector::AlaskaCwa { code } => write!(f, "ak:{}", code.to_ascii_uppercase()),
            RegionSelector::Conus => write!(f, "conus"),
            RegionSelector::Custom {
                west,
                east,
                south,
                north,
            } => write!(f, "{},{},{},{}", west, east, south, north),
        }
    }
}

impl FromStr for RegionSelector {
    type Err = AlignmentError;

    /// Parse `conus`, `gacc:CODE`, `ak:CODE`/`cwa:CODE`, `west,east,south,north`,
    /// a bare GACC code, or a state code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AlignmentError::InvalidSelector(
                "region selector cannot be empty".to_string(),
            ));
        }

        if s.contains(',') {
            let parts: Vec<&str> = s.split(',').map(str::trim).collect();
            if parts.len() != 4 {
                return Err(AlignmentError::InvalidSelector(format!(
                    "custom box must be 'west,east,south,north', got '{}'",
                    s
                )));
            }
            let mut bounds = [0.0; 4];
            for (slot, part) in bounds.iter_mut().zip(&parts) {
                *slot = part.parse::<f64>().map_err(|_| {
                    AlignmentError::InvalidSelector(format!("invalid coordinate '{}'", part))
                })?;
            }
            return Ok(RegionSelector::custom(
                bounds[0], bounds[1], bounds[2], bounds[3],
            ));
        }

        if let Some((prefix, code)) = s.split_once(':') {
            let code = code.trim();
            if code.is_empty() {
                return Err(AlignmentError::InvalidSelector(format!(
                    "missing code after '{}:'",
                    prefix
                )));
            }
            return match prefix.trim().to_ascii_lowercase().as_str() {
                "gacc" => Ok(RegionSelector::gacc(code)),
                "ak" | "cwa" => Ok(RegionSelector::alaska_cwa(code)),
                "state" => Ok(RegionSelector::state(code)),
                other => Err(AlignmentError::InvalidSelector(format!(
                    "unknown selector prefix '{}'",
                    other
                ))),
            };
        }

        if s.eq_ignore_ascii_case("conus") || s.eq_ignore_ascii_case("us") {
            return Ok(RegionSelector::Conus);
        }

        if lookup(GACC_BOUNDS, s).is_some() {
            Ok(RegionSelector::gacc(s))
        } else {
            Ok(RegionSelector::state(s))
        }
    }
}

/// Resolve a selector to its canonical bounding box.
///
/// # Errors
///
/// - [`AlignmentError::UnknownRegion`] for a state or GACC code missing from the tables
/// - [`AlignmentError::InvalidBoundingBox`] for a malformed explicit box
///
/// An unrecognized Alaska CWA code is not an error: the Alaska state box is
/// returned unnarrowed.
pub fn resolve(selector: &RegionSelector) -> AlignmentResult<BoundingBox> {
    match selector {
        RegionSelector::State { code } => {
            lookup(STATE_BOUNDS, code).ok_or_else(|| AlignmentError::UnknownRegion(code.clone()))
        }
        RegionSelector::Gacc { code } => {
            lookup(GACC_BOUNDS, code).ok_or_else(|| AlignmentError::UnknownRegion(code.clone()))
        }
        RegionSelector::AlaskaCwa { code } => {
            let alaska = lookup(STATE_BOUNDS, "AK")
                .ok_or_else(|| AlignmentError::UnknownRegion("AK".to_string()))?;
            match lookup(ALASKA_CWA_BOUNDS, code) {
                Some(cwa) => Ok(alaska.narrow_to(&cwa).unwrap_or(alaska)),
                None => {
                    debug!(
                        "Unrecognized Alaska CWA '{}', using the Alaska state box",
                        code
                    );
                    Ok(alaska)
                }
            }
        }
        RegionSelector::Conus => Ok(CONUS_BOUNDS),
        RegionSelector::Custom {
            west,
            east,
            south,
            north,
        } => BoundingBox::new(*west, *east, *south, *north),
    }
}

fn lookup(table: &[(&str, BoundingBox)], code: &str) -> Option<BoundingBox> {
    let code = code.trim();
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(code))
        .map(|(_, bbox)| *bbox)
}

const fn b(west: f64, east: f64, south: f64, north: f64) -> BoundingBox {
    BoundingBox::from_table(west, east, south, north)
}

const CONUS_BOUNDS: BoundingBox = b(-126.0, -66.0, 24.0, 50.5);

static STATE_BOUNDS: &[(&str, BoundingBox)] = &[
    ("AL", b(-88.6, -84.8, 30.1, 35.1)),
    ("AK", b(-170.0, -130.0, 51.0, 72.0)),
    ("AZ", b(-115.0, -108.9, 31.2, 37.1)),
    ("AR", b(-94.7, -89.6, 33.0, 36.6)),
    ("CA", b(-124.5, -114.0, 32.4, 42.1)),
    ("CO", b(-109.1, -102.0, 36.9, 41.1)),
    ("CT", b(-73.8, -71.7, 40.9, 42.1)),
    ("DE", b(-75.8, -75.0, 38.4, 39.9)),
    ("DC", b(-77.2, -76.9, 38.8, 39.0)),
    ("FL", b(-87.7, -79.9, 24.4, 31.1)),
    ("GA", b(-85.7, -80.8, 30.3, 35.1)),
    ("HI", b(-160.3, -154.8, 18.9, 22.3)),
    ("ID", b(-117.3, -111.0, 41.9, 49.1)),
    ("IL", b(-91.6, -87.4, 36.9, 42.6)),
    ("IN", b(-88.1, -84.7, 37.7, 41.8)),
    ("IA", b(-96.7, -90.1, 40.3, 43.6)),
    ("KS", b(-102.1, -94.5, 36.9, 40.1)),
    ("KY", b(-89.6, -81.9, 36.4, 39.2)),
    ("LA", b(-94.1, -88.8, 28.9, 33.1)),
    ("ME", b(-71.1, -66.9, 42.9, 47.5)),
    ("MD", b(-79.5, -75.0, 37.9, 39.8)),
    ("MA", b(-73.6, -69.9, 41.2, 42.9)),
    ("MI", b(-90.5, -82.1, 41.6, 48.3)),
    ("MN", b(-97.3, -89.4, 43.4, 49.4)),
    ("MS", b(-91.7, -88.0, 30.1, 35.1)),
    ("MO", b(-95.8, -89.1, 35.9, 40.7)),
    ("MT", b(-116.1, -104.0, 44.3, 49.1)),
    ("NE", b(-104.1, -95.3, 39.9, 43.1)),
    ("NV", b(-120.1, -114.0, 35.0, 42.1)),
    ("NH", b(-72.6, -70.6, 42.6, 45.4)),
    ("NJ", b(-75.6, -73.9, 38.9, 41.4)),
    ("NM", b(-109.1, -103.0, 31.3, 37.1)),
    ("NY", b(-79.8, -71.8, 40.4, 45.1)),
    ("NC", b(-84.4, -75.4, 33.8, 36.6)),
    ("ND", b(-104.1, -96.5, 45.9, 49.1)),
    ("OH", b(-84.9, -80.5, 38.4, 42.0)),
    ("OK", b(-103.1, -94.4, 33.6, 37.1)),
    ("OR", b(-124.7, -116.4, 41.9, 46.3)),
    ("PA", b(-80.6, -74.6, 39.7, 42.3)),
    ("RI", b(-71.9, -71.1, 41.1, 42.1)),
    ("SC", b(-83.4, -78.5, 32.0, 35.3)),
    ("SD", b(-104.1, -96.4, 42.4, 46.0)),
    ("TN", b(-90.4, -81.6, 34.9, 36.7)),
    ("TX", b(-106.7, -93.5, 25.8, 36.6)),
    ("UT", b(-114.1, -109.0, 36.9, 42.1)),
    ("VT", b(-73.5, -71.4, 42.7, 45.1)),
    ("VA", b(-83.7, -75.2, 36.5, 39.5)),
    ("WA", b(-124.9, -116.9, 45.5, 49.1)),
    ("WV", b(-82.7, -77.7, 37.2, 40.7)),
    ("WI", b(-92.9, -86.8, 42.4, 47.1)),
    ("WY", b(-111.1, -104.0, 40.9, 45.1)),
    ("PR", b(-67.3, -65.2, 17.9, 18.6)),
];

static GACC_BOUNDS: &[(&str, BoundingBox)] = &[
    ("OSCC", b(-122.1, -114.0, 32.4, 39.1)),
    ("ONCC", b(-124.8, -119.5, 36.3, 42.1)),
    ("GBCC", b(-120.1, -107.1, 35.0, 46.1)),
    ("NWCC", b(-125.0, -116.4, 41.9, 49.1)),
    ("NRCC", b(-117.3, -96.5, 43.2, 49.1)),
    ("RMCC", b(-111.1, -94.5, 36.9, 46.0)),
    ("SWCC", b(-115.0, -100.8, 31.2, 37.5)),
    ("SACC", b(-106.7, -75.4, 24.4, 39.5)),
    ("EACC", b(-97.3, -66.9, 36.4, 49.4)),
    ("AICC", b(-170.0, -130.0, 51.0, 72.0)),
];

static ALASKA_CWA_BOUNDS: &[(&str, BoundingBox)] = &[
    ("AFG", b(-169.0, -140.9, 63.0, 71.5)),
    ("AJK", b(-145.5, -129.9, 54.6, 60.5)),
    ("AER", b(-155.0, -140.0, 58.5, 63.5)),
    ("ALU", b(-170.0, -150.0, 51.5, 62.0)),
];
