// The reveal layer: the drag path stroked with the photo as its paint.
// Visual: a wide transparent-everywhere-else layer where the stroke shows the photo.

use crate::error::Error;
use crate::loader::ImageHandle;
use crate::path::StrokePath;
use serde::Deserialize;
use tiny_skia::{FilterQuality, Paint, Pattern, Pixmap, Rect, SpreadMode, Stroke, Transform};

/// Which rectangle the photo is stretched over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderBounds {
    /// The whole square; the photo stays put while you scratch.
    #[default]
    Surface,
    /// The stroke's own bounding box, growing as the path grows.
    Stroke,
}

pub struct MaskedRevealCanvas {
    stroke_width: f32,
    bounds: ShaderBounds,
}

impl MaskedRevealCanvas {
    pub fn new(stroke_width: f32, bounds: ShaderBounds) -> Self {
        Self { stroke_width, bounds }
    }

    /// Paint `path` into a fresh `side` x `side` layer.
    /// Ok(None) means "render nothing": no photo yet, however much has been drawn.
    pub fn render(&self, path: &StrokePath, image: Option<&ImageHandle>, side: u32) -> Result<Option<Pixmap>, Error> {
        let Some(image) = image else { return Ok(None) };
        if side == 0 {
            return Ok(None);
        }

        let mut layer = Pixmap::new(side, side)
            .ok_or_else(|| Error::Raster(format!("reveal layer {side}x{side}")))?;
        let Some(skia_path) = path.to_skia() else {
            return Ok(Some(layer)); // photo ready, nothing scratched yet
        };

        let surface = Rect::from_xywh(0.0, 0.0, side as f32, side as f32);
        let target = match self.bounds {
            ShaderBounds::Surface => surface,
            ShaderBounds::Stroke => {
                let b = skia_path.bounds();
                let hw = self.stroke_width / 2.0;
                Rect::from_ltrb(b.left() - hw, b.top() - hw, b.right() + hw, b.bottom() + hw).or(surface)
            }
        }
        .ok_or_else(|| Error::Raster("empty shader rect".into()))?;

        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.shader = Pattern::new(
            image.pixmap().as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            1.0,
            fill_transform(image, target),
        );

        let stroke = Stroke { width: self.stroke_width, ..Stroke::default() };
        layer.stroke_path(&skia_path, &paint, &stroke, Transform::identity(), None);
        Ok(Some(layer))
    }
}

/// "Fill" fit: stretch each axis independently so the photo covers `target` exactly.
fn fill_transform(image: &ImageHandle, target: Rect) -> Transform {
    let sx = target.width() / image.width() as f32;
    let sy = target.height() / image.height() as f32;
    Transform::from_scale(sx, sy).post_translate(target.left(), target.top())
}
