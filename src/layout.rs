// Square-fit measurement.
// Visual: whatever the window's shape, the scratch card is the biggest square that fits.

use crate::types::SizeConfig;

/// Raw box reported by the host whenever the available area changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutEvent {
    pub width: f32,
    pub height: f32,
}

/// Largest square side that fits `width` x `height`.
/// A zero/negative/NaN dimension counts as unbounded, so the other axis decides.
/// Both unbounded means "not measured yet" and yields None.
pub fn square_side(width: f32, height: f32) -> Option<f32> {
    let unbounded = |v: f32| if v > 0.0 { v } else { f32::INFINITY }; // NaN > 0 is false
    let side = unbounded(width).min(unbounded(height));
    side.is_finite().then_some(side)
}

/// Wraps some content and feeds it the square side on every layout change.
/// Holds no size between events; each event is a fresh computation.
#[derive(Default)]
pub struct SquareView {
    on_layout: Option<Box<dyn FnMut(&LayoutEvent)>>,
}

impl SquareView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an outside observer that sees every raw event first.
    pub fn with_observer(mut self, observer: impl FnMut(&LayoutEvent) + 'static) -> Self {
        self.on_layout = Some(Box::new(observer));
        self
    }

    pub fn measure(&mut self, event: LayoutEvent) -> Option<SizeConfig> {
        if let Some(observer) = self.on_layout.as_mut() {
            observer(&event);
        }
        square_side(event.width, event.height).map(|size| SizeConfig { size })
    }

    /// Run `content` with the square size, or skip it entirely when unmeasured.
    pub fn layout<R>(&mut self, event: LayoutEvent, content: impl FnOnce(SizeConfig) -> R) -> Option<R> {
        self.measure(event).map(content)
    }
}
