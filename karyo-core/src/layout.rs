//! Scene geometry for a karyotype: band rectangles, hover label, axis and
//! selector, all in pixels. Nothing here touches a render target.

use serde::{Deserialize, Serialize};

use crate::options::WidgetOptions;
use crate::scale::{format_si, LinearScale, ScaleError};
use crate::selection::{Selector, HANDLE_WIDTH};
use crate::types::{Band, BandModel, BandType};

pub const PADDING: f64 = 30.0;
pub const LABEL_PADDING: f64 = 24.0;
pub const AXIS_SPACING: f64 = 4.0;
pub const STALK_SPACING: f64 = 3.0;
pub const STALK_MAG_PC: f64 = 0.8;
/// Length of GRCh38 chromosome 1, the reference for relative sizing.
pub const CHR1_BP_END: u64 = 248_956_422;
pub const AXIS_TICKS: usize = 10;

/// Right end of the pixel range the model's domain is mapped onto.
pub fn range_end(options: &WidgetOptions, model: &BandModel) -> f64 {
    let width = options.width as f64;
    if options.relative_size {
        (model.stop as f64 / options.reference_length as f64) * width - PADDING
    } else {
        width - PADDING
    }
}

pub fn build_scale(options: &WidgetOptions, model: &BandModel) -> Result<LinearScale, ScaleError> {
    LinearScale::new(model.start as f64, model.stop as f64, 0.0, range_end(options, model))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandGlyph {
    pub id: String,
    pub band_type: BandType,
    pub class: String,
    pub start_pos: u64,
    pub end_pos: u64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BandGlyph {
    pub fn new(band: &Band, scale: &LinearScale, band_height: f64) -> Self {
        let (y, height) = if band.band_type.is_stalk() {
            (PADDING + STALK_SPACING, band_height * STALK_MAG_PC)
        } else {
            (PADDING, band_height)
        };
        let start = band.start_pos as f64;
        let end = band.end_pos as f64;
        Self {
            id: band.id.clone(),
            band_type: band.band_type.clone(),
            class: band.band_type.css_class(),
            start_pos: band.start_pos,
            end_pos: band.end_pos,
            x: scale.map(start),
            y,
            width: scale.map(end) - scale.map(start),
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Text element that shows the id of the hovered band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelGlyph {
    pub text: Option<String>,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub bp: f64,
    pub x: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisGlyph {
    /// Vertical translation of the axis group.
    pub y: f64,
    pub x_start: f64,
    pub x_end: f64,
    pub ticks: Vec<Tick>,
}

impl AxisGlyph {
    pub fn new(scale: &LinearScale, band_height: f64) -> Self {
        let (x_start, x_end) = scale.range();
        let ticks = scale
            .ticks(AXIS_TICKS)
            .into_iter()
            .map(|bp| Tick { bp, x: scale.map(bp), label: format_si(bp) })
            .collect();
        Self {
            y: band_height + PADDING + AXIS_SPACING,
            x_start,
            x_end,
            ticks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorGlyph {
    /// Vertical translation of the selector group.
    pub y: f64,
    pub height: f64,
    /// Extent in pixels, if a selection exists.
    pub extent: Option<(f64, f64)>,
    pub handle_width: f64,
}

impl SelectorGlyph {
    pub fn new(selector: &Selector, band_height: f64) -> Self {
        Self {
            y: PADDING - AXIS_SPACING,
            height: band_height + AXIS_SPACING * 2.0,
            extent: selector.extent_px(),
            handle_width: HANDLE_WIDTH,
        }
    }
}

/// Everything a render target needs to draw one widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KaryotypeScene {
    pub segment: String,
    pub width: f64,
    pub height: f64,
    pub bands: Vec<BandGlyph>,
    pub label: LabelGlyph,
    pub axis: Option<AxisGlyph>,
    pub selector: Option<SelectorGlyph>,
}

impl KaryotypeScene {
    pub fn build(
        options: &WidgetOptions,
        model: &BandModel,
        scale: &LinearScale,
        hovered: Option<&Band>,
        selector: Option<&Selector>,
    ) -> Self {
        let band_height = options.height as f64;
        let bands = model
            .bands
            .iter()
            .map(|band| BandGlyph::new(band, scale, band_height))
            .collect();

        let label = LabelGlyph {
            text: hovered.map(|b| b.id.clone()),
            x: hovered.map_or(0.0, |b| scale.map(b.start_pos as f64)),
            y: LABEL_PADDING,
        };

        Self {
            segment: options.segment.clone(),
            width: options.width as f64,
            height: band_height + 2.0 * PADDING,
            bands,
            label,
            axis: options.include_axis.then(|| AxisGlyph::new(scale, band_height)),
            selector: selector.map(|s| SelectorGlyph::new(s, band_height)),
        }
    }

    /// Band under a horizontal pixel position. Shared boundaries belong to
    /// the band on the right.
    pub fn band_at(&self, px: f64) -> Option<&BandGlyph> {
        self.bands
            .iter()
            .find(|g| px >= g.x && px < g.right())
            .or_else(|| self.bands.iter().rev().find(|g| px >= g.x && px <= g.right()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BandType;

    fn model() -> BandModel {
        BandModel::new("1", 0, 1000)
            .with_band(Band::new("p1", BandType::Gneg, 0, 400))
            .with_band(Band::new("stalk1", BandType::Stalk, 400, 500))
            .with_band(Band::new("q1", BandType::Gpos(50), 500, 1000))
    }

    fn options() -> WidgetOptions {
        WidgetOptions::new("#chr", "1").with_size(530, 20)
    }

    #[test]
    fn test_fixed_width_range() {
        let opts = options();
        assert_eq!(range_end(&opts, &model()), 500.0);
        let mut big = model();
        big.stop = 200_000_000;
        assert_eq!(range_end(&opts, &big), 500.0);
    }

    #[test]
    fn test_relative_width_range() {
        let opts = WidgetOptions::new("#chr", "1").with_size(900, 20).with_relative_size(true);
        let mut half = model();
        half.stop = CHR1_BP_END / 2;
        let expected = (half.stop as f64 / CHR1_BP_END as f64) * 900.0 - PADDING;
        assert_eq!(range_end(&opts, &half), expected);

        let mut chr1 = model();
        chr1.stop = CHR1_BP_END;
        assert_eq!(range_end(&opts, &chr1), 870.0);
    }

    #[test]
    fn test_tiny_relative_segment_fails_fast() {
        let opts = WidgetOptions::new("#chr", "MT").with_relative_size(true);
        let mito = BandModel::new("MT", 1, 16_569);
        assert!(matches!(build_scale(&opts, &mito), Err(ScaleError::DegenerateRange { .. })));
    }

    #[test]
    fn test_band_geometry() {
        let opts = options();
        let m = model();
        let scale = build_scale(&opts, &m).unwrap();
        let scene = KaryotypeScene::build(&opts, &m, &scale, None, None);

        assert_eq!(scene.width, 530.0);
        assert_eq!(scene.height, 80.0);

        let p1 = &scene.bands[0];
        assert_eq!((p1.x, p1.width, p1.y, p1.height), (0.0, 200.0, PADDING, 20.0));
        assert_eq!(p1.class, "band gneg");

        let stalk = &scene.bands[1];
        assert_eq!(stalk.y, PADDING + STALK_SPACING);
        assert_eq!(stalk.height, 20.0 * STALK_MAG_PC);
        assert_eq!(stalk.class, "band stalk");

        assert!(scene.axis.is_none());
        assert!(scene.selector.is_none());
        assert_eq!(scene.label.text, None);
    }

    #[test]
    fn test_label_follows_hovered_band() {
        let opts = options();
        let m = model();
        let scale = build_scale(&opts, &m).unwrap();
        let scene = KaryotypeScene::build(&opts, &m, &scale, m.band("q1"), None);
        assert_eq!(scene.label.text.as_deref(), Some("q1"));
        assert_eq!(scene.label.x, 250.0);
        assert_eq!(scene.label.y, LABEL_PADDING);
    }

    #[test]
    fn test_axis_and_selector_geometry() {
        let opts = options().with_axis(true);
        let m = model();
        let scale = build_scale(&opts, &m).unwrap();
        let mut selector = Selector::new(scale);
        selector.set_extent(500.0, 1000.0).unwrap();
        let scene = KaryotypeScene::build(&opts, &m, &scale, None, Some(&selector));

        let axis = scene.axis.unwrap();
        assert_eq!(axis.y, 20.0 + PADDING + AXIS_SPACING);
        assert_eq!(axis.ticks.first().map(|t| t.label.as_str()), Some("0"));
        assert_eq!(axis.ticks.last().map(|t| t.x), Some(500.0));

        let sel = scene.selector.unwrap();
        assert_eq!(sel.y, PADDING - AXIS_SPACING);
        assert_eq!(sel.height, 28.0);
        assert_eq!(sel.extent, Some((250.0, 500.0)));
    }

    #[test]
    fn test_band_at() {
        let opts = options();
        let m = model();
        let scale = build_scale(&opts, &m).unwrap();
        let scene = KaryotypeScene::build(&opts, &m, &scale, None, None);
        assert_eq!(scene.band_at(10.0).map(|g| g.id.as_str()), Some("p1"));
        assert_eq!(scene.band_at(200.0).map(|g| g.id.as_str()), Some("stalk1"));
        assert_eq!(scene.band_at(500.0).map(|g| g.id.as_str()), Some("q1"));
        assert_eq!(scene.band_at(501.0), None);
    }
}
