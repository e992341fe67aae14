use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Largest image the ICO container can describe (width and height are stored
/// as a single byte, 0 meaning 256).
pub const MAX_FAVICON_SIZE: u32 = 256;

/// Tuning parameters for one generation run.
///
/// The defaults reproduce the project's reference assets; all randomness is
/// keyed off `size_seed` and `position_seed`, so identical configs yield
/// byte-identical images.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoConfig {
    /// Number of mosaic seeds tessellating the domain.
    pub n_seeds: usize,
    /// RNG seed for drawing seed radii.
    pub size_seed: u64,
    /// RNG seed for placing seeds inside the domain.
    pub position_seed: u64,
    /// Stroke width scale factor (`k_lw`).
    pub line_width_scale: f64,
    /// Upper bound for seed radii, as a fraction of the domain radius.
    pub seed_radius_max: f64,
    /// Square canvas resolution rendered before downsampling.
    pub canvas_size: u32,
    /// Square logo resolution.
    pub logo_size: u32,
    /// Square favicon resolution.
    pub favicon_size: u32,
    /// Raster density used to convert stroke widths from points to pixels.
    pub dpi: u32,
    /// Gradient color at score 0 (top-right of the canvas).
    pub gradient_start: [u8; 3],
    /// Gradient color at score 1 (bottom-left of the canvas).
    pub gradient_end: [u8; 3],
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            n_seeds: 14,
            size_seed: 4,
            position_seed: 7,
            line_width_scale: 1.1,
            seed_radius_max: 0.3,
            canvas_size: 2000,
            logo_size: 1500,
            favicon_size: 48,
            dpi: 300,
            gradient_start: [67, 206, 162],
            gradient_end: [24, 90, 157],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NoSeeds,
    InvalidRadiusRange { max: f64 },
    NonPositiveLineWidth { scale: f64 },
    ZeroDpi,
    ZeroCanvasSize,
    InvalidLogoSize { logo: u32, canvas: u32 },
    InvalidFaviconSize { favicon: u32, logo: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoSeeds => write!(f, "n_seeds must be a positive integer"),
            ConfigError::InvalidRadiusRange { max } => write!(
                f,
                "seed_radius_max ({max}) must lie in (0, 1), as a fraction of the domain radius"
            ),
            ConfigError::NonPositiveLineWidth { scale } => {
                write!(f, "line_width_scale ({scale}) must be positive and finite")
            }
            ConfigError::ZeroDpi => write!(f, "dpi must be positive"),
            ConfigError::ZeroCanvasSize => write!(f, "canvas_size must be positive"),
            ConfigError::InvalidLogoSize { logo, canvas } => write!(
                f,
                "logo_size ({logo}) must be positive and no larger than canvas_size ({canvas})"
            ),
            ConfigError::InvalidFaviconSize { favicon, logo } => write!(
                f,
                "favicon_size ({favicon}) must be in 1..={MAX_FAVICON_SIZE} and no larger than logo_size ({logo})"
            ),
        }
    }
}

impl Error for ConfigError {}

impl LogoConfig {
    /// Reject invalid configurations before any rendering happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_seeds == 0 {
            return Err(ConfigError::NoSeeds);
        }
        if !(self.seed_radius_max > 0.0 && self.seed_radius_max < 1.0) {
            return Err(ConfigError::InvalidRadiusRange {
                max: self.seed_radius_max,
            });
        }
        if !(self.line_width_scale > 0.0 && self.line_width_scale.is_finite()) {
            return Err(ConfigError::NonPositiveLineWidth {
                scale: self.line_width_scale,
            });
        }
        if self.dpi == 0 {
            return Err(ConfigError::ZeroDpi);
        }
        if self.canvas_size == 0 {
            return Err(ConfigError::ZeroCanvasSize);
        }
        if self.logo_size == 0 || self.logo_size > self.canvas_size {
            return Err(ConfigError::InvalidLogoSize {
                logo: self.logo_size,
                canvas: self.canvas_size,
            });
        }
        if self.favicon_size == 0
            || self.favicon_size > MAX_FAVICON_SIZE
            || self.favicon_size > self.logo_size
        {
            return Err(ConfigError::InvalidFaviconSize {
                favicon: self.favicon_size,
                logo: self.logo_size,
            });
        }
        Ok(())
    }
}
