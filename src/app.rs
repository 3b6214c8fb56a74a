// Screen-level policy: which photo to ask for and what the card looks like.
// Visual: a silver "SCRATCH ME" card (or your own picture) hiding a random photo.

use crate::blend::pack;
use crate::config::AppConfig;
use crate::draw::{draw_text_5x7, text_width_5x7};
use crate::error::Error;
use crate::surface::{PlaceholderFn, SurfaceConfig, SurfaceStyle, UriFn};
use crate::types::{FrameBuffer, SizeConfig};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::info;

/// `https://{service}/{w}/{h}/{category}` with the side floored to whole pixels.
pub fn image_uri(service: &str, category: &str, cfg: SizeConfig) -> String {
    let side = cfg.pixels();
    format!("https://{service}/{side}/{side}/{category}")
}

const CARD_BASE: u32 = 0x00_B4_B6_BE;   // silver
const CARD_HATCH: u32 = 0x00_C6_C8_D0;  // lighter diagonal stripes
const CARD_EDGE: u32 = 0x00_8C_8E_96;   // 2px frame
const LABEL: &str = "SCRATCH ME!";

/// Built-in card: opaque silver with diagonal hatching and a centred label.
pub fn scratch_card(cfg: SizeConfig) -> FrameBuffer {
    let n = cfg.pixels() as usize;
    let mut fb = FrameBuffer::filled(n, n, CARD_BASE);
    for y in 0..n {
        for x in 0..n {
            let edge = x < 2 || y < 2 || x + 2 >= n || y + 2 >= n;
            let color = if edge {
                CARD_EDGE
            } else if (x + y) % 14 < 3 {
                CARD_HATCH
            } else {
                continue;
            };
            fb.pixels[y * n + x] = color;
        }
    }

    // Label fills about 60% of the width
    let scale = ((n as f32 * 0.6) / text_width_5x7(LABEL, 1) as f32).floor().max(1.0) as i32;
    let tx = (n as i32 - text_width_5x7(LABEL, scale)) / 2;
    let ty = (n as i32 - 7 * scale) / 2;
    draw_text_5x7(&mut fb, tx, ty, LABEL, scale, 0x00_FF_FF_FF, 0x00_5A_5C_64);
    fb
}

/// "Contain" fit: the whole picture, aspect kept, centred on `background`.
pub fn contain(image: &RgbaImage, cfg: SizeConfig, background: u32) -> FrameBuffer {
    let n = cfg.pixels();
    let mut fb = FrameBuffer::filled(n as usize, n as usize, background);
    let (iw, ih) = image.dimensions();
    if n == 0 || iw == 0 || ih == 0 {
        return fb;
    }

    let scale = (n as f32 / iw as f32).min(n as f32 / ih as f32);
    let w = ((iw as f32 * scale).round() as u32).clamp(1, n);
    let h = ((ih as f32 * scale).round() as u32).clamp(1, n);
    let fitted = imageops::resize(image, w, h, FilterType::Triangle);
    let (ox, oy) = ((n - w) / 2, (n - h) / 2);

    let (br, bg, bb) = ((background >> 16) & 0xFF, (background >> 8) & 0xFF, background & 0xFF);
    for (x, y, px) in fitted.enumerate_pixels() {
        let a = px[3] as u32;
        let mix = |c: u8, b: u32| ((c as u32 * a + b * (255 - a) + 127) / 255) as u8;
        let idx = (oy + y) as usize * n as usize + (ox + x) as usize;
        fb.pixels[idx] = pack(mix(px[0], br), mix(px[1], bg), mix(px[2], bb));
    }
    fb
}

/// Wire the config's policies into a surface config.
pub fn surface_config(cfg: &AppConfig) -> Result<SurfaceConfig, Error> {
    let service = cfg.image_service.clone();
    let category = cfg.image_category.clone();
    let uri: UriFn = Box::new(move |size| image_uri(&service, &category, size));

    let placeholder: PlaceholderFn = match &cfg.placeholder {
        Some(path) => {
            let image = image::open(path)
                .map_err(|e| Error::Decode(format!("{}: {e}", path.display())))?
                .to_rgba8();
            info!(path = %path.display(), "custom placeholder");
            let background = cfg.background;
            Box::new(move |size| contain(&image, size, background))
        }
        None => Box::new(scratch_card),
    };

    Ok(SurfaceConfig {
        style: SurfaceStyle {
            margin: cfg.margin,
            background: cfg.background,
            shader_bounds: cfg.shader_bounds,
        },
        stroke_width: cfg.stroke_width,
        uri,
        placeholder,
    })
}
