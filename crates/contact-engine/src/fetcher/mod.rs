//! Matrix data fetching.
//!
//! Every view mode asks for data through one [`MatrixQuery`] enum and one
//! [`MatrixSource::fetch`] call. Each variant lowers to the same wire shape,
//! so sources never branch on view mode.
//!
//! ```text
//! MatrixQuery::Genome ─────────┐
//! MatrixQuery::ChromosomePair ─┤
//! MatrixQuery::Detail ─────────┼─► WireRequest ─► MatrixSource ─► MatrixResponse
//! MatrixQuery::Fragment ───────┘                                    { items: [x, y, v] }
//! ```

mod http;
mod memory;

pub use http::HttpMatrixSource;
pub use memory::InMemoryMatrixSource;

use async_trait::async_trait;
use hic_common::{
    BinUnit, GenomicRange, HicError, MatrixTriple, MatrixType, NormalizationMethod, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fragment::FragmentWindow;

/// Source of sparse contact-matrix data.
///
/// Implementations issue exactly one request per call and never retry.
/// Transport failures and timeouts surface as [`HicError::Transport`],
/// undecodable payloads as [`HicError::MalformedResponse`].
#[async_trait]
pub trait MatrixSource: Send + Sync {
    /// Fetch the triples for one query.
    async fn fetch(&self, query: &MatrixQuery) -> Result<MatrixResponse>;

    /// Restriction cut-site positions for one chromosome and enzyme.
    async fn restriction_sites(&self, chromosome: &str, enzyme: &str) -> Result<Vec<u64>>;
}

/// A request for matrix data, tagged by view mode.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixQuery {
    /// One block of the whole-genome view. Observed, unnormalized.
    Genome {
        chromosome_x: String,
        chromosome_y: String,
        resolution: u32,
    },
    /// Whole chromosome against whole chromosome.
    ChromosomePair {
        chromosome_x: String,
        chromosome_y: String,
        resolution: u32,
        normalization: NormalizationMethod,
        matrix_type: MatrixType,
    },
    /// Base-pair detail window.
    Detail {
        x: GenomicRange,
        y: GenomicRange,
        resolution: u32,
        normalization: NormalizationMethod,
        matrix_type: MatrixType,
    },
    /// Fragment detail window. `resolution` counts fragments per bin.
    Fragment {
        chromosome_x: String,
        chromosome_y: String,
        x: FragmentWindow,
        y: FragmentWindow,
        resolution: u32,
        normalization: NormalizationMethod,
        matrix_type: MatrixType,
    },
}

impl MatrixQuery {
    pub fn resolution(&self) -> u32 {
        match self {
            Self::Genome { resolution, .. }
            | Self::ChromosomePair { resolution, .. }
            | Self::Detail { resolution, .. }
            | Self::Fragment { resolution, .. } => *resolution,
        }
    }

    pub fn unit(&self) -> BinUnit {
        match self {
            Self::Fragment { .. } => BinUnit::Fragment,
            _ => BinUnit::BasePair,
        }
    }

    /// `(chromosome_x, chromosome_y)` as queried.
    pub fn chromosomes(&self) -> (&str, &str) {
        match self {
            Self::Genome {
                chromosome_x,
                chromosome_y,
                ..
            }
            | Self::ChromosomePair {
                chromosome_x,
                chromosome_y,
                ..
            }
            | Self::Fragment {
                chromosome_x,
                chromosome_y,
                ..
            } => (chromosome_x.as_str(), chromosome_y.as_str()),
            Self::Detail { x, y, .. } => (x.chr.as_str(), y.chr.as_str()),
        }
    }

    pub fn is_intra_chromosomal(&self) -> bool {
        let (x, y) = self.chromosomes();
        x.eq_ignore_ascii_case(y)
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Genome { .. } => "genome",
            Self::ChromosomePair { .. } => "chromosome_pair",
            Self::Detail { .. } => "detail",
            Self::Fragment { .. } => "fragment",
        }
    }

    /// Lower to the transport shape.
    pub fn to_wire(&self) -> WireRequest {
        let (chromosome_x, chromosome_y) = self.chromosomes();
        let mut wire = WireRequest {
            matrix_type: MatrixType::Observed,
            normalization_method: NormalizationMethod::None,
            resolution: self.resolution(),
            unit: self.unit(),
            chromosome_x: chromosome_x.to_string(),
            chromosome_y: chromosome_y.to_string(),
            range_x: None,
            range_y: None,
            fragment_range_x: None,
            fragment_range_y: None,
        };

        match self {
            Self::Genome { .. } => {}
            Self::ChromosomePair {
                normalization,
                matrix_type,
                ..
            } => {
                wire.normalization_method = normalization.clone();
                wire.matrix_type = *matrix_type;
            }
            Self::Detail {
                x,
                y,
                normalization,
                matrix_type,
                ..
            } => {
                wire.normalization_method = normalization.clone();
                wire.matrix_type = *matrix_type;
                wire.range_x = Some(WireRange::from(x));
                wire.range_y = Some(WireRange::from(y));
            }
            Self::Fragment {
                x,
                y,
                normalization,
                matrix_type,
                ..
            } => {
                wire.normalization_method = normalization.clone();
                wire.matrix_type = *matrix_type;
                wire.fragment_range_x = Some(*x);
                wire.fragment_range_y = Some(*y);
            }
        }
        wire
    }
}

/// Transport body for every query variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRequest {
    pub matrix_type: MatrixType,
    pub normalization_method: NormalizationMethod,
    pub resolution: u32,
    pub unit: BinUnit,
    pub chromosome_x: String,
    pub chromosome_y: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_x: Option<WireRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_y: Option<WireRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment_range_x: Option<FragmentWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment_range_y: Option<FragmentWindow>,
}

/// `{start, stop}` on the wire; the chromosome travels separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRange {
    pub start: u64,
    pub stop: u64,
}

impl From<&GenomicRange> for WireRange {
    fn from(range: &GenomicRange) -> Self {
        Self {
            start: range.start,
            stop: range.stop,
        }
    }
}

/// Decoded response: sparse triples in query coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatrixResponse {
    pub items: Vec<MatrixTriple>,
}

impl MatrixResponse {
    pub fn new(items: Vec<MatrixTriple>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Validate and decode `{ "items": [[x, y, value], ...] }`.
    ///
    /// `x` and `y` must be non-negative integers; `value` a number or `null`
    /// (decoded as `NaN`).
    pub fn from_value(value: &Value) -> Result<Self> {
        let items = value
            .get("items")
            .ok_or_else(|| HicError::malformed("missing 'items'"))?
            .as_array()
            .ok_or_else(|| HicError::malformed("'items' should be array"))?;

        let items = items
            .iter()
            .enumerate()
            .map(|(i, item)| decode_item(i, item))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { items })
    }
}

fn decode_item(index: usize, item: &Value) -> Result<MatrixTriple> {
    let fields = match item.as_array() {
        Some(fields) if fields.len() == 3 => fields,
        _ => {
            return Err(HicError::malformed(format!(
                "item {} should be a [x, y, value] triple",
                index
            )))
        }
    };

    let x = decode_coordinate(index, "x", &fields[0])?;
    let y = decode_coordinate(index, "y", &fields[1])?;
    let value = match &fields[2] {
        Value::Null => f64::NAN,
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| HicError::malformed(format!("item {} value out of range", index)))?,
        other => {
            return Err(HicError::malformed(format!(
                "item {} value should be a number, got {}",
                index, other
            )))
        }
    };
    Ok(MatrixTriple::new(x, y, value))
}

fn decode_coordinate(index: usize, name: &str, value: &Value) -> Result<u64> {
    if let Some(v) = value.as_u64() {
        return Ok(v);
    }
    match value.as_f64() {
        Some(v) if v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(v as u64),
        _ => Err(HicError::malformed(format!(
            "item {} {} should be a non-negative integer, got {}",
            index, name, value
        ))),
    }
}
