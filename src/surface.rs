// The scratch card: square measurement + image loading + reveal layer + placeholder.
// Visual: a centred square card; dragging on it scratches the card away to show the photo.
//
// Stacking, back to front: placeholder, then the reveal layer. The reveal layer
// is transparent except on the stroke, so the card is covered only where you scratched.

use crate::blend::composite_over;
use crate::canvas::{MaskedRevealCanvas, ShaderBounds};
use crate::error::Error;
use crate::gamma::GammaLut;
use crate::gesture::{PanRecognizer, PointerEvent};
use crate::layout::{LayoutEvent, SquareView};
use crate::loader::{ImageLoader, LoadEvent};
use crate::path::{GestureHandler, RedrawFlag, StrokePathStore};
use crate::types::{FrameBuffer, Point, SizeConfig};
use std::rc::Rc;
use tracing::{debug, trace};

pub type UriFn = Box<dyn Fn(SizeConfig) -> String>;
pub type PlaceholderFn = Box<dyn Fn(SizeConfig) -> FrameBuffer>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceStyle {
    pub margin: f32,      // the card's box is the window minus this on every side
    pub background: u32,  // 0x00RRGGBB outside the card
    pub shader_bounds: ShaderBounds,
}

/// Everything the card needs; no field has a default here.
pub struct SurfaceConfig {
    pub style: SurfaceStyle,
    pub stroke_width: f32,
    pub uri: UriFn,
    pub placeholder: PlaceholderFn,
}

/// One mounted drawing area: its path, redraw target and pan state.
struct Content {
    store: StrokePathStore,
    redraw: Rc<RedrawFlag>,
    handler: GestureHandler,
    pan: PanRecognizer,
}

impl Content {
    fn mount(min_distance: f32) -> Self {
        let redraw = Rc::new(RedrawFlag::default());
        let store = StrokePathStore::new(redraw.clone());
        let handler = store.handler();
        Self { store, redraw, handler, pan: PanRecognizer::new(min_distance) }
    }
}

pub struct ScratchSurface {
    config: SurfaceConfig,
    square: SquareView,
    canvas: MaskedRevealCanvas,
    loader: ImageLoader,
    lut: GammaLut,
    min_distance: f32,
    window: (usize, usize),
    size: Option<SizeConfig>,
    card: Option<(u32, FrameBuffer)>, // placeholder rendered for this side
    content: Content,
    capturing: bool,                  // the current press started on the card
    dirty: bool,                      // layout, image or remount changed
}

impl ScratchSurface {
    pub fn new(config: SurfaceConfig, loader: ImageLoader, min_distance: f32) -> Self {
        let canvas = MaskedRevealCanvas::new(config.stroke_width, config.style.shader_bounds);
        Self {
            config,
            square: SquareView::new().with_observer(|e| trace!(?e, "layout box")),
            canvas,
            loader,
            lut: GammaLut::new(),
            min_distance,
            window: (0, 0),
            size: None,
            card: None,
            content: Content::mount(min_distance),
            capturing: false,
            dirty: true,
        }
    }

    /// The window's client area changed.
    pub fn on_layout(&mut self, width: usize, height: usize) {
        self.window = (width, height);
        self.dirty = true;
        // 0 stays "unbounded"; a measured axis the margins eat up leaves no card.
        let m = 2.0 * self.config.style.margin;
        let inset = |raw: usize| match raw {
            0 => Some(0.0),
            raw => Some(raw as f32 - m).filter(|&d| d > 0.0),
        };
        let (Some(w), Some(h)) = (inset(width), inset(height)) else {
            debug!(width, height, "layout leaves no room for the card");
            self.size = None;
            return;
        };
        let event = LayoutEvent { width: w, height: h };
        let uri_for = &self.config.uri;
        let measured = self.square.layout(event, |size| (size, uri_for(size)));
        self.size = measured.as_ref().map(|(size, _)| *size);
        debug!(width, height, side = ?self.size.map(|s| s.size), "layout");
        if let Some((_, uri)) = measured {
            self.loader.request(&uri);
        }
    }

    /// Pointer sample in window coordinates.
    pub fn on_pointer(&mut self, event: PointerEvent) {
        let Some(size) = self.size else { return };
        let (ox, oy) = self.origin(size);
        let local = |p: Point| Point::new(p.x - ox as f32, p.y - oy as f32);

        let event = match event {
            PointerEvent::Down(p) => {
                let p = local(p);
                if !(0.0..size.size).contains(&p.x) || !(0.0..size.size).contains(&p.y) {
                    return; // press outside the card is not ours
                }
                self.capturing = true;
                PointerEvent::Down(p)
            }
            PointerEvent::Move(p) if self.capturing => PointerEvent::Move(local(p)),
            PointerEvent::Up if self.capturing => {
                self.capturing = false;
                PointerEvent::Up
            }
            _ => return,
        };
        if let Some(gesture) = self.content.pan.handle(event) {
            self.content.handler.dispatch(gesture);
        }
    }

    /// Drop the drawing area and mount a fresh, empty one.
    pub fn remount(&mut self) {
        debug!(commands = self.content.store.snapshot().len(), "remount");
        self.content = Content::mount(self.min_distance);
        self.capturing = false;
        self.dirty = true;
    }

    /// Pick up a finished image fetch; a new image needs a repaint.
    pub fn poll_image(&mut self) {
        if self.loader.poll() == Some(LoadEvent::Loaded) {
            self.dirty = true;
        }
    }

    /// True once per pending repaint request.
    pub fn take_redraw(&mut self) -> bool {
        let layout = std::mem::take(&mut self.dirty);
        let drawn = self.content.redraw.take();
        layout | drawn
    }

    /// Window-sized frame with the card centred. None until a side has been measured.
    pub fn render(&mut self) -> Result<Option<FrameBuffer>, Error> {
        let Some(size) = self.size else { return Ok(None) };
        let (w, h) = self.window;
        let mut frame = FrameBuffer::filled(w, h, self.config.style.background);
        let side = size.pixels();
        if side == 0 {
            return Ok(Some(frame));
        }

        let mut card = self.card(size).clone();
        let layer = self.canvas.render(&self.content.store.snapshot(), self.loader.image(), side)?;
        if let Some(layer) = layer {
            composite_over(&mut card, &layer, &self.lut)?;
        }

        let (ox, oy) = self.origin(size);
        frame.blit(&card, ox, oy);
        trace!(side, "frame rendered");
        Ok(Some(frame))
    }

    #[cfg(test)]
    pub fn size(&self) -> Option<SizeConfig> {
        self.size
    }

    #[cfg(test)]
    pub fn path(&self) -> std::cell::Ref<'_, crate::path::StrokePath> {
        self.content.store.snapshot()
    }

    /// Callbacks of the currently mounted drawing area.
    #[cfg(test)]
    pub fn gesture_handler(&self) -> GestureHandler {
        self.content.handler.clone()
    }

    #[cfg(test)]
    pub fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    /// Top-left of the card inside the window.
    fn origin(&self, size: SizeConfig) -> (usize, usize) {
        let side = size.pixels() as usize;
        let (w, h) = self.window;
        (w.saturating_sub(side) / 2, h.saturating_sub(side) / 2)
    }

    /// Placeholder for this side, always exactly side x side.
    fn card(&mut self, size: SizeConfig) -> &FrameBuffer {
        let side = size.pixels();
        if self.card.as_ref().is_some_and(|(s, _)| *s != side) {
            self.card = None;
        }
        let (_, fb) = self.card.get_or_insert_with(|| {
            let visual = (self.config.placeholder)(size);
            let n = side as usize;
            if visual.width == n && visual.height == n {
                return (side, visual);
            }
            let mut fitted = FrameBuffer::filled(n, n, self.config.style.background);
            fitted.blit(&visual, 0, 0);
            (side, fitted)
        });
        fb
    }
}
