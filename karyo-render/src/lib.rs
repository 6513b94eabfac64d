/*!
# Karyo Render

SVG output for chromosome widgets. [`SvgRenderTarget`] implements
[`karyo_core::RenderTarget`], so a [`karyo_core::Chromosome`] draws straight
into SVG documents that can be saved or embedded.

## Layers

1. **Background**: optional page rectangle
2. **Bands**: one rectangle per band, classed by stain and filled from the palette
3. **Label**: id of the hovered band
4. **Axis**: base-pair ticks with SI labels, when requested
5. **Selector**: brush extent and resize handles
6. **Footer**: version, segment and generation time
*/

pub mod vector_export;

pub use vector_export::{render_scene, BandPalette, ExportConfig, SvgRenderTarget};
