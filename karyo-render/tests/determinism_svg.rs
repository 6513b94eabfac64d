use karyo_core::{Band, BandModel, BandType, Chromosome, StaticLoader, WidgetOptions, WidgetState};
use karyo_render::{ExportConfig, SvgRenderTarget};

fn demo_model() -> BandModel {
    BandModel::new("X", 0, 156_040_895)
        .with_band(Band::new("p22.33", BandType::Gneg, 0, 4_400_000))
        .with_band(Band::new("p22.32", BandType::Gpos(50), 4_400_000, 6_100_000))
        .with_band(Band::new("p11.1", BandType::Acen, 6_100_000, 60_600_000))
        .with_band(Band::new("q11.1", BandType::Acen, 60_600_000, 65_000_000))
        .with_band(Band::new("q28", BandType::Gpos(100), 65_000_000, 156_040_895))
}

fn render_to(path: &std::path::Path) {
    let cfg = ExportConfig {
        show_footer: false, // disable dynamic timestamp
        provenance_comment: Some("Determinism Test".into()),
        ..ExportConfig::default()
    };
    let target = SvgRenderTarget::new(cfg).with_targets(["#chrX"]);
    let options = WidgetOptions::new("#chrX", "X").with_axis(true).with_relative_size(true);
    let mut widget = Chromosome::new(options, Box::new(StaticLoader::new(demo_model())), target).unwrap();

    assert_eq!(widget.draw(), WidgetState::Rendered);
    widget.hover_band("q28");
    widget.click_band("p22.32").unwrap();
    widget.target().save("#chrX", path).unwrap();
}

#[test]
fn svg_export_is_deterministic() {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = tempfile::tempdir().unwrap();
    let f1 = dir.path().join("a.svg");
    let f2 = dir.path().join("b.svg");

    render_to(&f1);
    render_to(&f2);

    let b1 = std::fs::read(&f1).unwrap();
    let b2 = std::fs::read(&f2).unwrap();
    assert_eq!(b1, b2, "SVG bytes differ between identical renders");

    let text = String::from_utf8(b1).unwrap();
    assert!(text.contains(r#"data-band-id="p22.32""#));
    let label = &text[text.find(r#"class="band-lbl""#).unwrap()..];
    let body = &label[label.find('>').unwrap() + 1..label.find("</text>").unwrap()];
    assert_eq!(body.trim(), "q28");
    assert!(text.contains(r#"class="extent""#));
}

#[test]
fn missing_target_renders_nothing() {
    let target = SvgRenderTarget::new(ExportConfig::default()).with_targets(["#chrX"]);
    let options = WidgetOptions::new("#elsewhere", "X");
    let mut widget = Chromosome::new(options, Box::new(StaticLoader::new(demo_model())), target).unwrap();

    assert!(matches!(widget.draw(), WidgetState::Failed(_)));
    assert!(widget.target().to_svg_string("#chrX").is_none());
}
