use serde::{Deserialize, Serialize};
use std::fmt;

pub type GenomicPos = u64;

/// Giemsa stain class of a cytogenetic band.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum BandType {
    Gneg,
    /// Positive stain with its intensity (25, 50, 75 or 100).
    Gpos(u8),
    Acen,
    Gvar,
    Stalk,
    Other(String),
}

impl BandType {
    /// Parse a DAS type id such as `band:gpos50`. The `band:` prefix is optional.
    pub fn from_das_id(id: &str) -> Self {
        let stain = id.strip_prefix("band:").unwrap_or(id);
        match stain {
            "gneg" => BandType::Gneg,
            "acen" => BandType::Acen,
            "gvar" => BandType::Gvar,
            "stalk" => BandType::Stalk,
            s => match s.strip_prefix("gpos").map(str::parse::<u8>) {
                Some(Ok(level)) => BandType::Gpos(level),
                // bare "gpos" is how some sources spell gpos100
                Some(Err(_)) if s == "gpos" => BandType::Gpos(100),
                _ => BandType::Other(s.to_string()),
            },
        }
    }

    pub fn stain(&self) -> String {
        match self {
            BandType::Gneg => "gneg".to_string(),
            BandType::Gpos(level) => format!("gpos{}", level),
            BandType::Acen => "acen".to_string(),
            BandType::Gvar => "gvar".to_string(),
            BandType::Stalk => "stalk".to_string(),
            BandType::Other(s) => s.clone(),
        }
    }

    pub fn das_id(&self) -> String {
        format!("band:{}", self.stain())
    }

    /// Class attribute for the band element: the type id with `:` replaced by a space.
    pub fn css_class(&self) -> String {
        format!("band {}", self.stain())
    }

    pub fn is_stalk(&self) -> bool {
        matches!(self, BandType::Stalk)
    }
}

impl fmt::Display for BandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.das_id())
    }
}

impl From<String> for BandType {
    fn from(id: String) -> Self {
        BandType::from_das_id(&id)
    }
}

impl From<BandType> for String {
    fn from(band_type: BandType) -> Self {
        band_type.das_id()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub id: String,
    #[serde(rename = "type")]
    pub band_type: BandType,
    pub start_pos: GenomicPos,
    pub end_pos: GenomicPos,
}

impl Band {
    pub fn new(id: impl Into<String>, band_type: BandType, start_pos: GenomicPos, end_pos: GenomicPos) -> Self {
        Self {
            id: id.into(),
            band_type,
            start_pos,
            end_pos,
        }
    }

    pub fn length(&self) -> GenomicPos {
        self.end_pos.saturating_sub(self.start_pos)
    }

    pub fn contains(&self, pos: f64) -> bool {
        pos >= self.start_pos as f64 && pos <= self.end_pos as f64
    }
}

/// Band layout of one segment (chromosome) as delivered by a model loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandModel {
    pub id: String,
    pub start: GenomicPos,
    pub stop: GenomicPos,
    #[serde(default)]
    pub bands: Vec<Band>,
}

impl BandModel {
    pub fn new(id: impl Into<String>, start: GenomicPos, stop: GenomicPos) -> Self {
        Self {
            id: id.into(),
            start,
            stop,
            bands: Vec::new(),
        }
    }

    pub fn with_band(mut self, band: Band) -> Self {
        self.bands.push(band);
        self
    }

    pub fn length(&self) -> GenomicPos {
        self.stop.saturating_sub(self.start)
    }

    pub fn band(&self, id: &str) -> Option<&Band> {
        self.bands.iter().find(|b| b.id == id)
    }

    /// Keep bands in coordinate order, ties broken by end position.
    pub fn sort_bands(&mut self) {
        self.bands
            .sort_by(|a, b| a.start_pos.cmp(&b.start_pos).then(a.end_pos.cmp(&b.end_pos)));
    }
}

/// A selected coordinate range in base pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub start: f64,
    pub end: f64,
}

impl Selection {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}
