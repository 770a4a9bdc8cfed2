//! Drawing primitives handed to the rendering surface

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in game coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// One textured rectangle for a symbol slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolQuad<'a, T> {
    /// Reel index
    pub reel: usize,
    /// Slot index within the reel
    pub slot: usize,
    /// Destination rectangle (may extend past the reel mask)
    pub rect: Rect,
    /// Symbol index
    pub symbol: usize,
    /// Whether the blurred variant is shown
    pub blurred: bool,
    pub texture: &'a T,
}

/// Surface that draws textured rectangles
pub trait RenderSurface<T> {
    /// Draw `quad`, clipped to `mask`
    fn draw_quad(&mut self, quad: &SymbolQuad<'_, T>, mask: Rect);
}

/// Surface that records every draw call
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub draws: Vec<RecordedDraw>,
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub reel: usize,
    pub slot: usize,
    pub rect: Rect,
    pub mask: Rect,
    pub symbol: usize,
    pub blurred: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.draws.clear();
    }
}

impl<T> RenderSurface<T> for RecordingSurface {
    fn draw_quad(&mut self, quad: &SymbolQuad<'_, T>, mask: Rect) {
        self.draws.push(RecordedDraw {
            reel: quad.reel,
            slot: quad.slot,
            rect: quad.rect,
            mask,
            symbol: quad.symbol,
            blurred: quad.blurred,
        });
    }
}
