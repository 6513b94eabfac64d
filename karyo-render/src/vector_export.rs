/*!
# SVG Export

Turns a [`KaryotypeScene`] into an SVG document. [`SvgRenderTarget`] keeps one
document per registered target selector, the way a page keeps one element per
id, and can write any of them to disk.
*/

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use svg::node::element::{Group, Line, Rectangle, Text};
use svg::node::Comment;
use svg::Document;

use karyo_core::layout::{AxisGlyph, BandGlyph, SelectorGlyph};
use karyo_core::{BandType, KaryotypeScene, RenderError, RenderTarget};

const AXIS_TICK_SIZE: f64 = 6.0;

/// Fill colours per Giemsa stain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandPalette {
    pub gneg: String,
    pub acen: String,
    pub gvar: String,
    pub stalk: String,
    pub other: String,
}

impl Default for BandPalette {
    fn default() -> Self {
        Self {
            gneg: "#ffffff".to_string(),
            acen: "#d92f27".to_string(),
            gvar: "#dcdcdc".to_string(),
            stalk: "#647fa4".to_string(),
            other: "#cccccc".to_string(),
        }
    }
}

impl BandPalette {
    /// `gposN` bands are shaded grey by their staining intensity; the rest use
    /// the palette entry for their stain.
    pub fn fill(&self, band_type: &BandType) -> String {
        match band_type {
            BandType::Gneg => self.gneg.clone(),
            BandType::Gpos(level) => {
                let level = (*level).min(100) as f64;
                let shade = (255.0 * (1.0 - level / 100.0)).round() as u8;
                format!("#{:02x}{:02x}{:02x}", shade, shade, shade)
            }
            BandType::Acen => self.acen.clone(),
            BandType::Gvar => self.gvar.clone(),
            BandType::Stalk => self.stalk.clone(),
            BandType::Other(_) => self.other.clone(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub show_background: bool,
    pub show_footer: bool,
    pub background_color: String,
    pub label_color: String,
    pub axis_color: String,
    pub selector_color: String,
    pub font_family: String,
    pub font_size: u32,
    pub provenance_comment: Option<String>,
    pub palette: BandPalette,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            show_background: true,
            show_footer: true,
            background_color: "#ffffff".to_string(),
            label_color: "#000000".to_string(),
            axis_color: "#333333".to_string(),
            selector_color: "#4682b4".to_string(),
            font_family: "Arial, sans-serif".to_string(),
            font_size: 12,
            provenance_comment: None,
            palette: BandPalette::default(),
        }
    }
}

impl ExportConfig {
    fn footer_height(&self) -> f64 {
        if self.show_footer {
            (self.font_size + 6) as f64
        } else {
            0.0
        }
    }
}

/// Build the SVG document for one scene.
pub fn render_scene(scene: &KaryotypeScene, config: &ExportConfig) -> Document {
    let height = scene.height + config.footer_height();
    let mut doc = Document::new()
        .set("viewBox", (0.0, 0.0, scene.width, height))
        .set("width", scene.width)
        .set("height", height)
        .set("class", "karyo");

    if let Some(comment) = &config.provenance_comment {
        for line in comment.lines() {
            doc = doc.add(Comment::new(format!(" {} ", line)));
        }
    }

    if config.show_background {
        doc = doc.add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", scene.width)
                .set("height", height)
                .set("fill", config.background_color.as_str()),
        );
    }

    let mut bands = Group::new().set("class", "bands");
    for glyph in &scene.bands {
        bands = bands.add(band_rect(glyph, config));
    }
    doc = doc.add(bands);

    doc = doc.add(
        Text::new(scene.label.text.clone().unwrap_or_default())
            .set("class", "band-lbl")
            .set("x", scene.label.x)
            .set("y", scene.label.y)
            .set("font-family", config.font_family.as_str())
            .set("font-size", config.font_size as f64)
            .set("fill", config.label_color.as_str()),
    );

    if let Some(axis) = &scene.axis {
        doc = doc.add(axis_group(axis, config));
    }

    if let Some(selector) = &scene.selector {
        doc = doc.add(selector_group(selector, config));
    }

    if config.show_footer {
        let footer = format!(
            "karyo v{} | Segment: {} | Generated: {}",
            karyo_core::VERSION,
            scene.segment,
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        doc = doc.add(
            Text::new(footer)
                .set("class", "footer")
                .set("x", 10)
                .set("y", height - 6.0)
                .set("font-family", config.font_family.as_str())
                .set("font-size", config.font_size.saturating_sub(2) as f64)
                .set("fill", "gray"),
        );
    }

    doc
}

fn band_rect(glyph: &BandGlyph, config: &ExportConfig) -> Rectangle {
    Rectangle::new()
        .set("class", glyph.class.as_str())
        .set("data-band-id", glyph.id.as_str())
        .set("x", glyph.x)
        .set("y", glyph.y)
        .set("width", glyph.width)
        .set("height", glyph.height)
        .set("fill", config.palette.fill(&glyph.band_type))
}

fn axis_group(axis: &AxisGlyph, config: &ExportConfig) -> Group {
    let mut group = Group::new()
        .set("class", "axis")
        .set("transform", format!("translate(0,{})", axis.y))
        .add(
            Line::new()
                .set("class", "domain")
                .set("x1", axis.x_start)
                .set("y1", 0)
                .set("x2", axis.x_end)
                .set("y2", 0)
                .set("stroke", config.axis_color.as_str()),
        );

    for tick in &axis.ticks {
        group = group
            .add(
                Line::new()
                    .set("class", "tick")
                    .set("x1", tick.x)
                    .set("y1", 0)
                    .set("x2", tick.x)
                    .set("y2", AXIS_TICK_SIZE)
                    .set("stroke", config.axis_color.as_str()),
            )
            .add(
                Text::new(tick.label.clone())
                    .set("x", tick.x)
                    .set("y", AXIS_TICK_SIZE + config.font_size as f64)
                    .set("text-anchor", "middle")
                    .set("font-family", config.font_family.as_str())
                    .set("font-size", config.font_size.saturating_sub(2) as f64)
                    .set("fill", config.axis_color.as_str()),
            );
    }
    group
}

fn selector_group(selector: &SelectorGlyph, config: &ExportConfig) -> Group {
    let mut group = Group::new()
        .set("class", "selector")
        .set("transform", format!("translate(0,{})", selector.y));

    // no extent yet: empty brush
    let Some((x0, x1)) = selector.extent else {
        return group;
    };

    group = group.add(
        Rectangle::new()
            .set("class", "extent")
            .set("x", x0)
            .set("y", 0)
            .set("width", x1 - x0)
            .set("height", selector.height)
            .set("fill", config.selector_color.as_str())
            .set("fill-opacity", 0.3)
            .set("stroke", config.selector_color.as_str()),
    );
    for (class, x) in [("resize w", x0), ("resize e", x1)] {
        group = group.add(
            Rectangle::new()
                .set("class", class)
                .set("x", x - selector.handle_width / 2.0)
                .set("y", 0)
                .set("width", selector.handle_width)
                .set("height", selector.height)
                .set("fill", config.selector_color.as_str()),
        );
    }
    group
}

/// Render target backed by SVG documents, one per registered selector.
pub struct SvgRenderTarget {
    config: ExportConfig,
    documents: BTreeMap<String, Option<Document>>,
}

impl SvgRenderTarget {
    pub fn new(config: ExportConfig) -> Self {
        Self { config, documents: BTreeMap::new() }
    }

    pub fn with_targets<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for selector in selectors {
            self.register(selector);
        }
        self
    }

    pub fn register(&mut self, selector: impl Into<String>) {
        self.documents.entry(selector.into()).or_insert(None);
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ExportConfig {
        &mut self.config
    }

    /// The last document presented to `selector`.
    pub fn document(&self, selector: &str) -> Option<&Document> {
        self.documents.get(selector)?.as_ref()
    }

    pub fn to_svg_string(&self, selector: &str) -> Option<String> {
        self.document(selector).map(|doc| doc.to_string())
    }

    /// Write the document presented to `selector` to `path`.
    pub fn save<P: AsRef<Path>>(&self, selector: &str, path: P) -> Result<()> {
        let path = path.as_ref();
        let doc = self
            .document(selector)
            .with_context(|| format!("Nothing has been rendered to {}", selector))?;
        svg::save(path, doc).with_context(|| format!("Failed to write SVG to {}", path.display()))?;
        Ok(())
    }
}

impl RenderTarget for SvgRenderTarget {
    fn has_target(&self, selector: &str) -> bool {
        self.documents.contains_key(selector)
    }

    fn present(&mut self, selector: &str, scene: &KaryotypeScene) -> Result<(), RenderError> {
        let slot = self
            .documents
            .get_mut(selector)
            .ok_or_else(|| RenderError::TargetNotFound(selector.to_string()))?;
        debug!("presenting {} bands of segment {} to {}", scene.bands.len(), scene.segment, selector);
        *slot = Some(render_scene(scene, &self.config));
        Ok(())
    }
}

impl std::fmt::Debug for SvgRenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgRenderTarget")
            .field("config", &self.config)
            .field("targets", &self.documents.keys().collect::<Vec<_>>())
            .finish()
    }
}
