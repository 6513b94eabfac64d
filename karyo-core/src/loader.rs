//! Band model loaders.
//!
//! A loader produces the [`BandModel`] for one segment, or a [`LoadError`]
//! that the widget reports instead of rendering. Sources supported here:
//! DAS feature documents (plain or gzip-compressed files, or over HTTP with
//! the `http` feature) and JSON-serialized models.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::Deserialize;
use thiserror::Error;

use crate::options::WidgetOptions;
use crate::types::{Band, BandModel, BandType, GenomicPos};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed DAS XML: {0}")]
    Xml(#[from] quick_xml::de::DeError),
    #[error("Malformed JSON model: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown segment: {0}")]
    UnknownSegment(String),
    #[error("Invalid model {id}: stop ({stop}) before start ({start})")]
    InvalidModel { id: String, start: GenomicPos, stop: GenomicPos },
    #[error("Invalid band {id}: end ({end}) before start ({start})")]
    InvalidBand { id: String, start: GenomicPos, end: GenomicPos },
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Unsupported source: {0}")]
    Unsupported(String),
    #[error("Source reported an error: {0}")]
    Reported(String),
}

pub trait ModelLoader {
    /// Fetch and parse the model. Called once per draw; no retries.
    fn load_model(&self) -> Result<BandModel, LoadError>;

    /// Human readable description of the source, for logs.
    fn source(&self) -> String;
}

// ----- DAS XML -----

#[derive(Debug, Deserialize)]
struct DasGffXml {
    #[serde(rename = "GFF")]
    gff: GffXml,
}

#[derive(Debug, Deserialize)]
struct GffXml {
    #[serde(rename = "SEGMENT", default)]
    segments: Vec<SegmentXml>,
    #[serde(rename = "UNKNOWNSEGMENT", default)]
    unknown: Vec<SegmentRefXml>,
    #[serde(rename = "ERRORSEGMENT", default)]
    errors: Vec<SegmentRefXml>,
}

#[derive(Debug, Deserialize)]
struct SegmentRefXml {
    #[serde(rename = "@id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct SegmentXml {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@start")]
    start: GenomicPos,
    #[serde(rename = "@stop")]
    stop: GenomicPos,
    #[serde(rename = "FEATURE", default)]
    features: Vec<FeatureXml>,
}

#[derive(Debug, Deserialize)]
struct FeatureXml {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "TYPE")]
    feature_type: TypeXml,
    #[serde(rename = "START")]
    start: GenomicPos,
    #[serde(rename = "END")]
    end: GenomicPos,
}

#[derive(Debug, Deserialize)]
struct TypeXml {
    #[serde(rename = "@id")]
    id: String,
}

/// Parse a DAS `features` document and return the model for `segment`.
///
/// When the document holds a single segment it is used even if its id
/// differs from `segment` (servers normalise ids such as `chr1` to `1`).
pub fn parse_das_xml(xml: &str, segment: &str) -> Result<BandModel, LoadError> {
    let doc: DasGffXml = quick_xml::de::from_str(xml)?;
    let gff = doc.gff;

    if let Some(missing) = gff.unknown.iter().chain(gff.errors.iter()).find(|s| s.id == segment) {
        return Err(LoadError::UnknownSegment(missing.id.clone()));
    }

    let single = gff.segments.len() == 1;
    let seg = gff
        .segments
        .into_iter()
        .find(|s| single || s.id == segment)
        .ok_or_else(|| LoadError::UnknownSegment(segment.to_string()))?;

    let mut model = BandModel::new(seg.id, seg.start, seg.stop);
    for feature in seg.features {
        model.bands.push(Band::new(
            feature.id,
            BandType::from_das_id(&feature.feature_type.id),
            feature.start,
            feature.end,
        ));
    }
    model.sort_bands();
    validate_model(&model)?;
    log::debug!("parsed DAS segment {} with {} bands", model.id, model.bands.len());
    Ok(model)
}

pub fn validate_model(model: &BandModel) -> Result<(), LoadError> {
    if model.stop < model.start {
        return Err(LoadError::InvalidModel {
            id: model.id.clone(),
            start: model.start,
            stop: model.stop,
        });
    }
    if let Some(band) = model.bands.iter().find(|b| b.end_pos < b.start_pos) {
        return Err(LoadError::InvalidBand {
            id: band.id.clone(),
            start: band.start_pos,
            end: band.end_pos,
        });
    }
    Ok(())
}

/// Read a text file, transparently decompressing `.gz` files.
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String, LoadError> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let mut text = String::new();
    if path.to_string_lossy().to_lowercase().ends_with(".gz") {
        GzDecoder::new(file).read_to_string(&mut text)?;
    } else {
        file.read_to_string(&mut text)?;
    }
    Ok(text)
}

/// URL of the DAS `features` command for one segment.
pub fn das_features_url(source: &str, segment: &str) -> String {
    format!(
        "{}/features?segment={}",
        source.trim_end_matches('/'),
        urlencoding::encode(segment)
    )
}

#[derive(Debug, Clone)]
enum XmlInput {
    Path(PathBuf),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct DasXmlLoader {
    input: XmlInput,
    segment: String,
}

impl DasXmlLoader {
    pub fn from_path(path: impl Into<PathBuf>, segment: impl Into<String>) -> Self {
        Self {
            input: XmlInput::Path(path.into()),
            segment: segment.into(),
        }
    }

    pub fn from_text(xml: impl Into<String>, segment: impl Into<String>) -> Self {
        Self {
            input: XmlInput::Text(xml.into()),
            segment: segment.into(),
        }
    }
}

impl ModelLoader for DasXmlLoader {
    fn load_model(&self) -> Result<BandModel, LoadError> {
        match &self.input {
            XmlInput::Path(path) => parse_das_xml(&read_text(path)?, &self.segment),
            XmlInput::Text(xml) => parse_das_xml(xml, &self.segment),
        }
    }

    fn source(&self) -> String {
        match &self.input {
            XmlInput::Path(path) => format!("DAS XML {} (segment {})", path.display(), self.segment),
            XmlInput::Text(_) => format!("DAS XML text (segment {})", self.segment),
        }
    }
}

// ----- JSON -----

#[derive(Debug, Clone)]
pub struct JsonModelLoader {
    path: PathBuf,
}

impl JsonModelLoader {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelLoader for JsonModelLoader {
    fn load_model(&self) -> Result<BandModel, LoadError> {
        let mut model: BandModel = serde_json::from_str(&read_text(&self.path)?)?;
        model.sort_bands();
        validate_model(&model)?;
        Ok(model)
    }

    fn source(&self) -> String {
        format!("JSON {}", self.path.display())
    }
}

// ----- HTTP -----

#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct DasHttpLoader {
    source: String,
    segment: String,
}

#[cfg(feature = "http")]
impl DasHttpLoader {
    pub fn new(source: impl Into<String>, segment: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            segment: segment.into(),
        }
    }
}

#[cfg(feature = "http")]
impl ModelLoader for DasHttpLoader {
    fn load_model(&self) -> Result<BandModel, LoadError> {
        let url = das_features_url(&self.source, &self.segment);
        log::info!("Fetching {}", url);
        let body = reqwest::blocking::get(&url)
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| LoadError::Http(e.to_string()))?;
        parse_das_xml(&body, &self.segment)
    }

    fn source(&self) -> String {
        das_features_url(&self.source, &self.segment)
    }
}

// ----- Static -----

/// Loader returning a fixed outcome. Useful when the model is already in
/// memory, and in tests.
#[derive(Debug, Clone)]
pub struct StaticLoader {
    outcome: Result<BandModel, String>,
}

impl StaticLoader {
    pub fn new(model: BandModel) -> Self {
        Self { outcome: Ok(model) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self { outcome: Err(message.into()) }
    }
}

impl ModelLoader for StaticLoader {
    fn load_model(&self) -> Result<BandModel, LoadError> {
        self.outcome.clone().map_err(LoadError::Reported)
    }

    fn source(&self) -> String {
        "static model".to_string()
    }
}

/// Pick a loader for `options.das_source`: `http(s)://` URLs use the DAS
/// HTTP loader, `.json` files the JSON loader, anything else is read as a
/// DAS XML file.
pub fn loader_for(options: &WidgetOptions) -> Result<Box<dyn ModelLoader>, LoadError> {
    let source = options.das_source.as_str();
    let lower = source.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        #[cfg(feature = "http")]
        {
            return Ok(Box::new(DasHttpLoader::new(source, options.segment.clone())));
        }
        #[cfg(not(feature = "http"))]
        {
            return Err(LoadError::Unsupported(format!(
                "{} (compile with the 'http' feature)",
                source
            )));
        }
    }
    if lower.ends_with(".json") || lower.ends_with(".json.gz") {
        return Ok(Box::new(JsonModelLoader::from_path(source)));
    }
    Ok(Box::new(DasXmlLoader::from_path(source, options.segment.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DAS_DOC: &str = r#"<?xml version="1.0" standalone="no"?>
<DASGFF>
  <GFF version="1.0" href="http://example.org/das/karyotype/features">
    <SEGMENT id="1" start="1" stop="248956422" version="GRCh38" label="1">
      <FEATURE id="p36.32" label="p36.32">
        <TYPE id="band:gpos25" category="structural">band:gpos25</TYPE>
        <METHOD id="ensembl">ensembl</METHOD>
        <START>5300001</START>
        <END>7100000</END>
        <ORIENTATION>0</ORIENTATION>
      </FEATURE>
      <FEATURE id="p36.33" label="p36.33">
        <TYPE id="band:gneg" category="structural">band:gneg</TYPE>
        <START>1</START>
        <END>2300000</END>
      </FEATURE>
      <FEATURE id="p11.2" label="p11.2">
        <TYPE id="band:stalk" category="structural">band:stalk</TYPE>
        <START>2300001</START>
        <END>5300000</END>
      </FEATURE>
    </SEGMENT>
  </GFF>
</DASGFF>"#;

    #[test]
    fn test_parse_das_xml() {
        let model = parse_das_xml(DAS_DOC, "1").unwrap();
        assert_eq!(model.id, "1");
        assert_eq!(model.start, 1);
        assert_eq!(model.stop, 248_956_422);
        assert_eq!(model.bands.len(), 3);
        // sorted by start position
        assert_eq!(model.bands[0].id, "p36.33");
        assert_eq!(model.bands[1].band_type, BandType::Stalk);
        assert_eq!(model.bands[2].band_type, BandType::Gpos(25));
        assert_eq!(model.bands[2].end_pos, 7_100_000);
    }

    #[test]
    fn test_unknown_segment() {
        let doc = r#"<DASGFF><GFF version="1.0" href="x"><UNKNOWNSEGMENT id="99"/></GFF></DASGFF>"#;
        assert!(matches!(parse_das_xml(doc, "99"), Err(LoadError::UnknownSegment(id)) if id == "99"));

        let two = r#"<DASGFF><GFF><SEGMENT id="1" start="1" stop="10"/><SEGMENT id="2" start="1" stop="20"/></GFF></DASGFF>"#;
        assert_eq!(parse_das_xml(two, "2").unwrap().stop, 20);
        assert!(matches!(parse_das_xml(two, "3"), Err(LoadError::UnknownSegment(_))));
    }

    #[test]
    fn test_interleaved_segment_kinds() {
        let doc = r#"<DASGFF><GFF version="1.0" href="x">
  <SEGMENT id="1" start="1" stop="10"/>
  <UNKNOWNSEGMENT id="9"/>
  <SEGMENT id="2" start="1" stop="20">
    <FEATURE id="p1"><TYPE id="band:gneg">band:gneg</TYPE><START>1</START><END>20</END></FEATURE>
  </SEGMENT>
  <ERRORSEGMENT id="8"/>
</GFF></DASGFF>"#;
        let model = parse_das_xml(doc, "2").unwrap();
        assert_eq!((model.id.as_str(), model.stop, model.bands.len()), ("2", 20, 1));
        assert!(matches!(parse_das_xml(doc, "9"), Err(LoadError::UnknownSegment(id)) if id == "9"));
        assert!(matches!(parse_das_xml(doc, "8"), Err(LoadError::UnknownSegment(id)) if id == "8"));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(parse_das_xml("<DASGFF><GFF>", "1"), Err(LoadError::Xml(_))));
    }

    #[test]
    fn test_inverted_band_rejected() {
        let model = BandModel::new("1", 1, 100).with_band(Band::new("bad", BandType::Gneg, 50, 10));
        assert!(matches!(validate_model(&model), Err(LoadError::InvalidBand { .. })));
    }

    #[test]
    fn test_das_xml_loader_reads_gzip() {
        let mut file = tempfile::Builder::new().suffix(".xml.gz").tempfile().unwrap();
        {
            let mut encoder = flate2::write::GzEncoder::new(&mut file, flate2::Compression::default());
            encoder.write_all(DAS_DOC.as_bytes()).unwrap();
            encoder.finish().unwrap();
        }
        let loader = DasXmlLoader::from_path(file.path(), "1");
        assert_eq!(loader.load_model().unwrap().bands.len(), 3);
    }

    #[test]
    fn test_json_loader() {
        let model = BandModel::new("X", 1, 156_040_895)
            .with_band(Band::new("p22.33", BandType::Gneg, 1, 4_400_000));
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{}", serde_json::to_string(&model).unwrap()).unwrap();

        let options = WidgetOptions::new("#x", "X").with_das_source(file.path().to_string_lossy());
        let loader = loader_for(&options).unwrap();
        assert_eq!(loader.load_model().unwrap(), model);
    }

    #[test]
    fn test_loader_for_xml_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", DAS_DOC).unwrap();
        let options = WidgetOptions::new("#x", "1").with_das_source(file.path().to_string_lossy());
        let loader = loader_for(&options).unwrap();
        assert!(loader.source().contains("segment 1"));
        assert_eq!(loader.load_model().unwrap().id, "1");
    }

    #[cfg(not(feature = "http"))]
    #[test]
    fn test_loader_for_url_without_http_feature() {
        let options = WidgetOptions::new("#x", "1");
        assert!(matches!(loader_for(&options), Err(LoadError::Unsupported(_))));
    }

    #[test]
    fn test_features_url() {
        assert_eq!(
            das_features_url("http://www.ensembl.org/das/Homo_sapiens.GRCh38.karyotype/", "1:1,1000"),
            "http://www.ensembl.org/das/Homo_sapiens.GRCh38.karyotype/features?segment=1%3A1%2C1000"
        );
    }

    #[test]
    fn test_static_loader_failure() {
        let err = StaticLoader::failing("no such segment").load_model().unwrap_err();
        assert_eq!(err.to_string(), "Source reported an error: no such segment");
    }
}
