//! Contact-matrix values, pixel cells and query vocabulary.

use serde::{Deserialize, Serialize};

/// One sparse matrix entry: contact value between two bin positions.
///
/// `x` and `y` are base-pair bin starts, or fragment ids for fragment
/// queries. `value` is `NaN` for unobservable cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixTriple {
    pub x: u64,
    pub y: u64,
    pub value: f64,
}

impl MatrixTriple {
    pub fn new(x: u64, y: u64, value: f64) -> Self {
        Self { x, y, value }
    }

    /// The same entry with its coordinates swapped.
    pub fn transposed(&self) -> Self {
        Self {
            x: self.y,
            y: self.x,
            value: self.value,
        }
    }
}

impl From<(u64, u64, f64)> for MatrixTriple {
    fn from((x, y, value): (u64, u64, f64)) -> Self {
        Self { x, y, value }
    }
}

/// A renderable matrix cell in device-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelCell {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub value: f64,
}

impl PixelCell {
    pub fn new(x: f64, y: f64, width: f64, height: f64, value: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            value,
        }
    }

    /// The cell mirrored across the diagonal.
    pub fn transposed(&self) -> Self {
        Self {
            x: self.y,
            y: self.x,
            width: self.height,
            height: self.width,
            value: self.value,
        }
    }

    /// `(x, y, value)` for compact comparisons.
    pub fn xyv(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.value)
    }
}

/// Value range used to calibrate the external colour scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorDomain {
    pub min: f64,
    pub max: f64,
}

impl ColorDomain {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Widen the domain to include `value`. `NaN` is ignored.
    pub fn include(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn merge(&self, other: &ColorDomain) -> ColorDomain {
        ColorDomain {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Map a value to `[0, 1]`, saturating at `cutoff` when one is given.
    ///
    /// `NaN` values and degenerate domains map to 0.
    pub fn intensity(&self, value: f64, cutoff: Option<f64>) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        let upper = match cutoff {
            Some(c) if c > self.min => c.min(self.max),
            _ => self.max,
        };
        let width = upper - self.min;
        if width <= 0.0 {
            return if value >= upper { 1.0 } else { 0.0 };
        }
        ((value - self.min) / width).clamp(0.0, 1.0)
    }
}

/// Which matrix the server should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatrixType {
    #[default]
    #[serde(rename = "observed")]
    Observed,
    #[serde(rename = "expected")]
    Expected,
    #[serde(rename = "oe")]
    ObservedOverExpected,
}

impl MatrixType {
    /// Parse from string (case-insensitive), defaulting to observed.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "expected" => Self::Expected,
            "oe" | "observed/expected" | "observed_over_expected" => Self::ObservedOverExpected,
            _ => Self::Observed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Observed => "observed",
            Self::Expected => "expected",
            Self::ObservedOverExpected => "oe",
        }
    }
}

impl std::fmt::Display for MatrixType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Matrix balancing method. Unknown names from the file are passed through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NormalizationMethod {
    #[default]
    None,
    Vc,
    VcSqrt,
    Kr,
    Other(String),
}

impl NormalizationMethod {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "NONE" | "" => Self::None,
            "VC" => Self::Vc,
            "VC_SQRT" => Self::VcSqrt,
            "KR" => Self::Kr,
            _ => Self::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "NONE",
            Self::Vc => "VC",
            Self::VcSqrt => "VC_SQRT",
            Self::Kr => "KR",
            Self::Other(name) => name,
        }
    }

    /// The methods every `.hic` file is assumed to carry until its file-stat says otherwise.
    pub fn defaults() -> Vec<NormalizationMethod> {
        vec![Self::None, Self::Vc, Self::VcSqrt, Self::Kr]
    }
}

impl From<String> for NormalizationMethod {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}

impl From<NormalizationMethod> for String {
    fn from(method: NormalizationMethod) -> Self {
        method.as_str().to_string()
    }
}

impl std::fmt::Display for NormalizationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unit of a resolution: base pairs per bin, or fragments per bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BinUnit {
    #[default]
    #[serde(rename = "BP")]
    BasePair,
    #[serde(rename = "FRAG")]
    Fragment,
}

impl BinUnit {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "FRAG" | "FRAGMENT" => Self::Fragment,
            _ => Self::BasePair,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BasePair => "BP",
            Self::Fragment => "FRAG",
        }
    }
}

impl std::fmt::Display for BinUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_domain_include_ignores_nan() {
        let mut domain = ColorDomain::new(5.0, 5.0);
        domain.include(f64::NAN);
        domain.include(2.0);
        domain.include(9.0);
        assert_eq!(domain, ColorDomain::new(2.0, 9.0));
        assert_eq!(domain.span(), 7.0);
    }

    #[test]
    fn test_intensity_with_cutoff() {
        let domain = ColorDomain::new(0.0, 100.0);
        assert_eq!(domain.intensity(50.0, None), 0.5);
        assert_eq!(domain.intensity(50.0, Some(25.0)), 1.0);
        assert_eq!(domain.intensity(10.0, Some(20.0)), 0.5);
        assert_eq!(domain.intensity(f64::NAN, None), 0.0);
        assert_eq!(domain.intensity(-5.0, None), 0.0);

        let flat = ColorDomain::new(3.0, 3.0);
        assert_eq!(flat.intensity(3.0, None), 1.0);
        assert_eq!(flat.intensity(2.0, None), 0.0);
    }

    #[test]
    fn test_normalization_round_trip_names() {
        assert_eq!(NormalizationMethod::from_str("vc_sqrt"), NormalizationMethod::VcSqrt);
        assert_eq!(NormalizationMethod::from_str("KR").as_str(), "KR");
        assert_eq!(
            NormalizationMethod::from_str("SCALE"),
            NormalizationMethod::Other("SCALE".to_string())
        );

        let json = serde_json::to_value(NormalizationMethod::VcSqrt).unwrap();
        assert_eq!(json, "VC_SQRT");
        let parsed: NormalizationMethod = serde_json::from_value(serde_json::json!("kr")).unwrap();
        assert_eq!(parsed, NormalizationMethod::Kr);
    }

    #[test]
    fn test_matrix_type_names() {
        assert_eq!(MatrixType::from_str("OE"), MatrixType::ObservedOverExpected);
        assert_eq!(MatrixType::from_str("bogus"), MatrixType::Observed);
        assert_eq!(serde_json::to_value(MatrixType::Expected).unwrap(), "expected");
    }

    #[test]
    fn test_transposes() {
        let t = MatrixTriple::new(1, 2, 3.0).transposed();
        assert_eq!((t.x, t.y), (2, 1));

        let c = PixelCell::new(1.0, 2.0, 3.0, 4.0, 5.0).transposed();
        assert_eq!(c, PixelCell::new(2.0, 1.0, 4.0, 3.0, 5.0));
    }
}
