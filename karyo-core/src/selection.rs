//! Draggable selection ("brush") over a [`LinearScale`].
//!
//! Extents are stored in base pairs. Pointer interaction happens in pixel
//! space and is converted back through the scale's inverse, clamped to the
//! scale's range.

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scale::LinearScale;
use crate::types::Selection;

/// Width in pixels of the resize handles centred on the extent edges.
pub const HANDLE_WIDTH: f64 = 6.0;

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("Inverted selection: start ({start}) is greater than end ({end})")]
    Inverted { start: f64, end: f64 },
    #[error("Non-finite selection bound")]
    NonFinite,
}

/// Part of the brush a pointer gesture grabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushHandle {
    /// The extent body; dragging translates the whole selection.
    Extent,
    /// Left edge handle.
    West,
    /// Right edge handle.
    East,
}

#[derive(Debug, Clone)]
pub struct Selector {
    scale: LinearScale,
    extent: Option<Selection>,
}

impl Selector {
    pub fn new(scale: LinearScale) -> Self {
        Self { scale, extent: None }
    }

    pub fn scale(&self) -> &LinearScale {
        &self.scale
    }

    pub fn extent(&self) -> Option<Selection> {
        self.extent
    }

    pub fn set_extent(&mut self, start: f64, end: f64) -> Result<Selection, SelectionError> {
        let selection = validate(start, end)?;
        self.extent = Some(selection);
        Ok(selection)
    }

    pub fn clear(&mut self) {
        self.extent = None;
    }

    /// Current extent in pixels.
    pub fn extent_px(&self) -> Option<(f64, f64)> {
        self.extent
            .map(|s| (self.scale.map(s.start), self.scale.map(s.end)))
    }

    pub fn hit_test(&self, px: f64) -> Option<BrushHandle> {
        let (x0, x1) = self.extent_px()?;
        let half = HANDLE_WIDTH / 2.0;
        let d_west = (px - x0).abs();
        let d_east = (px - x1).abs();
        if d_west <= half || d_east <= half {
            return Some(if d_west <= d_east { BrushHandle::West } else { BrushHandle::East });
        }
        if px > x0 && px < x1 {
            return Some(BrushHandle::Extent);
        }
        None
    }

    /// Apply a pointer drag from `from_px` to `to_px` on `handle`. Returns the
    /// new extent, or `None` when there is no extent to drag.
    pub fn drag(&mut self, handle: BrushHandle, from_px: f64, to_px: f64) -> Option<Selection> {
        let (x0, x1) = self.extent_px()?;
        let (r0, r1) = self.scale.range();

        let (nx0, nx1) = match handle {
            BrushHandle::Extent => {
                // pull an extent that overhangs the range back inside first,
                // then keep the width and stop at whichever edge is hit
                let (x0, x1) = (self.scale.clamp_px(x0), self.scale.clamp_px(x1));
                let dx = (to_px - from_px).max(r0 - x0).min(r1 - x1);
                (x0 + dx, x1 + dx)
            }
            BrushHandle::West => order(self.scale.clamp_px(to_px), x1),
            BrushHandle::East => order(x0, self.scale.clamp_px(to_px)),
        };

        let selection = Selection::new(self.scale.invert(nx0), self.scale.invert(nx1));
        debug!(
            "brush {:?} drag {:.1}px -> {:.1}px, extent {:.0}-{:.0}",
            handle, from_px, to_px, selection.start, selection.end
        );
        self.extent = Some(selection);
        Some(selection)
    }
}

fn order(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn validate(start: f64, end: f64) -> Result<Selection, SelectionError> {
    if !start.is_finite() || !end.is_finite() {
        return Err(SelectionError::NonFinite);
    }
    if start > end {
        return Err(SelectionError::Inverted { start, end });
    }
    Ok(Selection::new(start, end))
}

/// Owns the optional selector of a widget. When the feature is disabled every
/// operation is inert.
#[derive(Debug, Clone)]
pub struct SelectionController {
    enabled: bool,
    selector: Option<Selector>,
}

impl SelectionController {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, selector: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_attached(&self) -> bool {
        self.selector.is_some()
    }

    /// Bind a fresh selector to `scale`, dropping any previous extent.
    pub fn attach(&mut self, scale: LinearScale) {
        if self.enabled {
            self.selector = Some(Selector::new(scale));
        }
    }

    pub fn detach(&mut self) {
        self.selector = None;
    }

    pub fn selector(&self) -> Option<&Selector> {
        self.selector.as_ref()
    }

    /// Set the extent in base pairs. Does nothing when disabled or before a
    /// selector is attached.
    pub fn move_selector_to(&mut self, start: f64, end: f64) -> Result<(), SelectionError> {
        if !self.enabled {
            return Ok(());
        }
        match self.selector.as_mut() {
            Some(selector) => selector.set_extent(start, end).map(|_| ()),
            None => {
                debug!("move_selector_to({}, {}) ignored: no selector attached", start, end);
                Ok(())
            }
        }
    }

    pub fn get_current_selection(&self) -> Option<Selection> {
        if !self.enabled {
            return None;
        }
        self.selector.as_ref().and_then(Selector::extent)
    }

    pub fn hit_test(&self, px: f64) -> Option<BrushHandle> {
        self.selector.as_ref().and_then(|s| s.hit_test(px))
    }

    pub fn drag(&mut self, handle: BrushHandle, from_px: f64, to_px: f64) -> Option<Selection> {
        if !self.enabled {
            return None;
        }
        self.selector.as_mut().and_then(|s| s.drag(handle, from_px, to_px))
    }
}
