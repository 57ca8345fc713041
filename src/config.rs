//! Configuration types for framescale

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::negotiate::{DimConstraint, OutputCaps, ParConstraint};
use crate::processing::ScaleMethod;
use crate::types::{Fraction, Resolution};

/// Scaling configuration
///
/// Unset dimensions are derived from the input by aspect ratio negotiation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    /// Resampling algorithm
    pub method: ScaleMethod,
    /// Output width (None = negotiated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Output height (None = negotiated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Output pixel-aspect-ratio (None = same as input)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_aspect_ratio: Option<Fraction>,
}

impl ScaleConfig {
    pub fn with_method(mut self, method: ScaleMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_pixel_aspect_ratio(mut self, par: Fraction) -> Self {
        self.pixel_aspect_ratio = Some(par);
        self
    }

    /// Fixed output resolution, if both dimensions are set
    pub fn resolution(&self) -> Option<Resolution> {
        Some(Resolution::new(self.width?, self.height?))
    }

    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded scale config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Serialize as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Output constraints this config puts on the scaler
    pub fn output_caps(&self) -> OutputCaps {
        let dim = |v: Option<u32>| v.map(DimConstraint::Fixed).unwrap_or_default();
        OutputCaps {
            width: dim(self.width),
            height: dim(self.height),
            par: self
                .pixel_aspect_ratio
                .map(ParConstraint::Fixed)
                .unwrap_or_default(),
        }
    }

    /// Apply a preset configuration
    pub fn from_preset(preset: ScalePreset) -> Self {
        preset.into()
    }
}

/// Common output sizes
///
/// Presets pin the height only; the width follows the input's display
/// aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalePreset {
    /// 480 lines
    Sd480,
    /// 720 lines
    Hd720,
    /// 1080 lines
    Fhd1080,
    /// 2160 lines
    Uhd4k,
    /// 120-line preview, filtered for downscaling
    Thumbnail,
}

impl ScalePreset {
    pub const ALL: [ScalePreset; 5] = [
        ScalePreset::Sd480,
        ScalePreset::Hd720,
        ScalePreset::Fhd1080,
        ScalePreset::Uhd4k,
        ScalePreset::Thumbnail,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScalePreset::Sd480 => "sd480",
            ScalePreset::Hd720 => "hd720",
            ScalePreset::Fhd1080 => "fhd1080",
            ScalePreset::Uhd4k => "uhd4k",
            ScalePreset::Thumbnail => "thumbnail",
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            ScalePreset::Sd480 => Resolution::SD_480P.height,
            ScalePreset::Hd720 => Resolution::HD_720P.height,
            ScalePreset::Fhd1080 => Resolution::FHD_1080P.height,
            ScalePreset::Uhd4k => Resolution::UHD_4K.height,
            ScalePreset::Thumbnail => 120,
        }
    }
}

impl fmt::Display for ScalePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ScalePreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == lower)
            .ok_or_else(|| Error::Config(format!("unknown preset '{}'", s)))
    }
}

impl From<ScalePreset> for ScaleConfig {
    fn from(preset: ScalePreset) -> Self {
        match preset {
            ScalePreset::Thumbnail => ScaleConfig {
                method: ScaleMethod::FourTap,
                height: Some(preset.height()),
                ..Default::default()
            },
            _ => ScaleConfig {
                method: ScaleMethod::Bilinear,
                height: Some(preset.height()),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_toml() {
        let config = ScaleConfig::from_toml_str(
            r#"
            method = "4-tap"
            width = 1280
            pixel_aspect_ratio = "16/15"
            "#,
        )
        .unwrap();
        assert_eq!(config.method, ScaleMethod::FourTap);
        assert_eq!(config.width, Some(1280));
        assert_eq!(config.height, None);
        assert_eq!(config.pixel_aspect_ratio, Some(Fraction::new(16, 15)));
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = ScaleConfig::from_toml_str("").unwrap();
        assert_eq!(config, ScaleConfig::default());
        assert_eq!(config.method, ScaleMethod::Bilinear);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            ScaleConfig::from_toml_str("method = \"bicubic\""),
            Err(Error::Config(_))
        ));
        assert!(ScaleConfig::from_toml_str("width = ").is_err());
        assert!(ScaleConfig::from_toml_str("pixel_aspect_ratio = \"1/0\"").is_err());
    }

    #[test]
    fn test_load_and_save() {
        let config = ScaleConfig::default()
            .with_method(ScaleMethod::Nearest)
            .with_resolution(640, 360);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        let toml = config.to_toml_string().unwrap();
        file.write_all(toml.as_bytes()).unwrap();
        let loaded = ScaleConfig::load(file.path()).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.resolution(), Some(Resolution::new(640, 360)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScaleConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_output_caps() {
        let caps = ScaleConfig::default().with_width(320).output_caps();
        assert_eq!(caps.width, DimConstraint::Fixed(320));
        assert_eq!(caps.height, DimConstraint::Any);
        assert_eq!(caps.par, ParConstraint::Any);

        let caps = ScaleConfig::default()
            .with_pixel_aspect_ratio(Fraction::ONE)
            .output_caps();
        assert_eq!(caps.par, ParConstraint::Fixed(Fraction::ONE));
    }

    #[test]
    fn test_presets() {
        for preset in ScalePreset::ALL {
            assert_eq!(preset.name().parse::<ScalePreset>().unwrap(), preset);
            let config = ScaleConfig::from_preset(preset);
            assert_eq!(config.height, Some(preset.height()));
            assert_eq!(config.width, None);
        }
        assert_eq!(ScaleConfig::from(ScalePreset::Hd720).height, Some(720));
        let thumbnail = ScaleConfig::from(ScalePreset::Thumbnail);
        assert_eq!(thumbnail.method, ScaleMethod::FourTap);
        assert!("8k".parse::<ScalePreset>().is_err());
    }
}
