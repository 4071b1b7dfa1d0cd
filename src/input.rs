//! # Input Configuration Module
//!
//! Parsing of render requests and engine calibration data.
//!
//! ## Render requests
//!
//! A [`RenderRequest`] names the geographic domain, the product family and,
//! for trend products, the gridded variable to difference:
//!
//! ```json
//! {
//!   "region": { "kind": "state", "code": "CA" },
//!   "product": "minimum_relative_humidity_trend",
//!   "trend_variable": "minrh"
//! }
//! ```
//!
//! ## Engine configuration
//!
//! [`EngineConfig`] holds the calibration tables: per-product transition
//! windows and seam adjustment flags, and the decimation tables. Every field
//! falls back to built-in defaults, so a config file only lists overrides:
//!
//! ```yaml
//! products:
//!   maximum_relative_humidity:
//!     transition_window: { start_hour: 17, end_hour: 7 }
//!     seam_adjustment: false
//! decimation:
//!   custom:
//!     breakpoints:
//!       - { max_area: 20.0, stride: 8 }
//!     above_stride: 40
//! ```
//!
//! Files ending in `.yaml`/`.yml` are read as YAML, anything else as JSON.
//! [`EngineConfig::from_env`] loads the file named by `FIREWX_CONFIG`.
//!
//! ```rust
//! use firewx::input::RenderRequest;
//! use firewx::product::ProductFamily;
//!
//! let json = r#"{ "region": { "kind": "conus" }, "product": "maximum_temperature" }"#;
//! let request = RenderRequest::from_json(json)?;
//! assert_eq!(request.product, ProductFamily::MaximumTemperature);
//! assert_eq!(request.trend_variable(), None);
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::decimation::DecimationCalculator;
use crate::error::AlignmentResult;
use crate::product::{ProductFamily, ProductProfile};
use crate::region::RegionSelector;
use anyhow::{Context, Result};
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable naming the engine configuration file
pub const CONFIG_ENV_VAR: &str = "FIREWX_CONFIG";

/// Serialization format of a configuration document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

fn parse_document<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> Result<T> {
    match format {
        ConfigFormat::Json => serde_json::from_str(content).context("Failed to parse JSON document"),
        ConfigFormat::Yaml => serde_yaml::from_str(content).context("Failed to parse YAML document"),
    }
}

fn read_document<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    debug!("Reading configuration from {}", path.display());
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    parse_document(&content, ConfigFormat::from_path(path))
        .with_context(|| format!("Invalid configuration file: {}", path.display()))
}

/// One render pass: where, which product, and what to difference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub region: RegionSelector,
    pub product: ProductFamily,
    /// Gridded variable for trend products; defaults to the family's element
    #[serde(default)]
    pub trend_variable: Option<String>,
}

impl RenderRequest {
    pub fn new(region: RegionSelector, product: ProductFamily) -> Self {
        Self {
            region,
            product,
            trend_variable: None,
        }
    }

    pub fn with_trend_variable(mut self, variable: &str) -> Self {
        self.trend_variable = Some(variable.to_string());
        self
    }

    /// Variable to difference, if this request produces trend frames.
    ///
    /// Trend families always difference something; other families only when
    /// a variable was requested explicitly.
    pub fn trend_variable(&self) -> Option<&str> {
        match self.trend_variable.as_deref() {
            Some(variable) => Some(variable),
            None if self.product.is_trend() => Some(self.product.default_variable()),
            None => None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_document(path)
    }

    pub fn from_json(json_str: &str) -> Result<Self> {
        parse_document(json_str, ConfigFormat::Json)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        parse_document(yaml_str, ConfigFormat::Yaml)
    }
}

/// Calibration data for the alignment engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-family overrides of [`ProductFamily::default_profile`]
    pub products: BTreeMap<ProductFamily, ProductProfile>,
    pub decimation: DecimationCalculator,
}

impl EngineConfig {
    /// Effective profile of a product family
    pub fn profile(&self, family: ProductFamily) -> ProductProfile {
        self.products
            .get(&family)
            .copied()
            .unwrap_or_else(|| family.default_profile())
    }

    pub fn validate(&self) -> AlignmentResult<()> {
        for profile in self.products.values() {
            profile.validate()?;
        }
        self.decimation.validate()
    }

    /// Load and validate a JSON or YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config: EngineConfig = read_document(path)?;
        config
            .validate()
            .with_context(|| format!("Invalid calibration data in {}", path.display()))?;
        Ok(config)
    }

    pub fn from_json(json_str: &str) -> Result<Self> {
        let config: EngineConfig = parse_document(json_str, ConfigFormat::Json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let config: EngineConfig = parse_document(yaml_str, ConfigFormat::Yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file named by `FIREWX_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self> {
        match env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => {
                Self::from_file(path.trim()).with_context(|| format!("{} is invalid", CONFIG_ENV_VAR))
            }
            _ => {
                debug!("{} not set, using built-in calibration", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{HourReference, TransitionWindow};
    use crate::decimation::DomainKind;
    use std::io::Write;
    use std::sync::Mutex;

    // Environment variable tests must not interleave.
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_render_request_from_json() {
        let json = r#"
        {
            "region": { "kind": "state", "code": "CA" },
            "product": "minimum_relative_humidity_trend"
        }"#;

        let request = RenderRequest::from_json(json).unwrap();
        assert_eq!(request.region, RegionSelector::state("CA"));
        assert_eq!(request.product, ProductFamily::MinimumRelativeHumidityTrend);
        assert_eq!(request.trend_variable(), Some("minrh"));
    }

    #[test]
    fn test_render_request_from_yaml() {
        let yaml = r#"
region:
  kind: custom
  west: -125.0
  east: -114.0
  south: 32.0
  north: 42.0
product: maximum_temperature
trend_variable: maxt
"#;
        let request = RenderRequest::from_yaml(yaml).unwrap();
        assert_eq!(request.region.domain_kind(), DomainKind::Custom);
        assert_eq!(request.trend_variable(), Some("maxt"));
    }

    #[test]
    fn test_render_request_rejects_unknown_product() {
        let json = r#"{ "region": { "kind": "conus" }, "product": "haines_index" }"#;
        assert!(RenderRequest::from_json(json).is_err());
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(
            config.profile(ProductFamily::MaximumTemperatureTrend),
            ProductFamily::MaximumTemperatureTrend.default_profile()
        );
    }

    #[test]
    fn test_engine_config_overrides_from_yaml() {
        let yaml = r#"
products:
  maximum_relative_humidity:
    transition_window: { start_hour: 17, end_hour: 7, reference: utc }
    seam_adjustment: true
decimation:
  custom:
    breakpoints:
      - { max_area: 20.0, stride: 8 }
    above_stride: 40
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        let profile = config.profile(ProductFamily::MaximumRelativeHumidity);
        assert_eq!(
            profile.transition_window,
            TransitionWindow::new(17, 7, HourReference::Utc).unwrap()
        );
        assert!(profile.seam_adjustment);
        assert_eq!(config.decimation.custom.above_stride, 40);
        // The named table was not listed and keeps its defaults.
        assert_eq!(config.decimation.named, crate::decimation::DecimationTable::named_default());
    }

    #[test]
    fn test_engine_config_rejects_invalid_calibration() {
        let json = r#"{ "decimation": { "named": { "breakpoints": [ { "max_area": 10.0, "stride": 0 } ], "above_stride": 5 } } }"#;
        assert!(EngineConfig::from_json(json).is_err());

        let json = r#"{ "products": { "maximum_temperature": { "transition_window": { "start_hour": 25, "end_hour": 3 } } } }"#;
        assert!(EngineConfig::from_json(json).is_err());
    }

    #[test]
    fn test_engine_config_json_round_trip() {
        let mut config = EngineConfig::default();
        config.products.insert(
            ProductFamily::MinimumTemperature,
            ProductProfile {
                transition_window: TransitionWindow::new(20, 4, HourReference::Local).unwrap(),
                seam_adjustment: true,
            },
        );
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_file_detects_format() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("engine.yml");
        let mut file = fs::File::create(&yaml_path).unwrap();
        writeln!(file, "decimation:\n  custom:\n    breakpoints: []\n    above_stride: 9").unwrap();
        let config = EngineConfig::from_file(&yaml_path).unwrap();
        assert_eq!(config.decimation.custom.above_stride, 9);

        let json_path = dir.path().join("request.json");
        fs::write(
            &json_path,
            r#"{ "region": { "kind": "gacc", "code": "OSCC" }, "product": "maximum_temperature" }"#,
        )
        .unwrap();
        let request = RenderRequest::from_file(&json_path).unwrap();
        assert_eq!(request.region, RegionSelector::gacc("OSCC"));

        let missing = dir.path().join("missing.json");
        let err = EngineConfig::from_file(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read configuration file"));
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(ConfigFormat::from_path("a/b.YAML"), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("b.yml"), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("b.json"), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path("noext"), ConfigFormat::Json);
    }

    #[test]
    fn test_engine_config_from_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        let original = env::var(CONFIG_ENV_VAR).ok();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(
            &path,
            r#"{ "decimation": { "named": { "breakpoints": [], "above_stride": 12 } } }"#,
        )
        .unwrap();

        unsafe {
            env::set_var(CONFIG_ENV_VAR, &path);
        }
        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.decimation.named.above_stride, 12);

        unsafe {
            env::remove_var(CONFIG_ENV_VAR);
        }
        assert_eq!(EngineConfig::from_env().unwrap(), EngineConfig::default());

        unsafe {
            env::set_var(CONFIG_ENV_VAR, dir.path().join("absent.json"));
        }
        assert!(EngineConfig::from_env().is_err());

        unsafe {
            env::remove_var(CONFIG_ENV_VAR);
            if let Some(ref val) = original {
                env::set_var(CONFIG_ENV_VAR, val);
            }
        }
    }
}
