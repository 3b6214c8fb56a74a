// What you SEE:
// • A square card centred in the window, as big as the window allows.
// • Hold Left Mouse and drag on the card: you scratch it away and a random photo shows through.
// • Resize the window: the card follows and a photo of the new size is fetched.
// • C clears every scratch (fresh card). ESC quits.

mod app;
mod blend;
mod canvas;
mod config;
mod draw;
mod error;
mod gamma;
mod gesture;
mod layout;
mod loader;
mod path;
mod surface;
mod types;

use config::{AppConfig, CONFIG_FILE};
use draw::Drawer;
use error::Error;
use gesture::PointerEvent;
use loader::{HttpFetch, ImageLoader};
use std::sync::Arc;
use surface::ScratchSurface;
use tracing::info;
use types::{FrameBuffer, Point};

fn main() -> Result<(), Error> {
    /* --- Settings + logging ---
       Visual: none; scratch.toml (optional) tweaks pen width, margin, photo category. */
    let cfg = AppConfig::load(CONFIG_FILE)?;
    tracing_subscriber::fmt().with_max_level(cfg.max_level()).init();
    info!(stroke_width = cfg.stroke_width, category = %cfg.image_category, "starting");

    /* --- Card + photo loader ---
       Visual: nothing yet; the card appears once the window reports its size. */
    let loader = ImageLoader::new(Arc::new(HttpFetch::new()?))?;
    let mut surface = ScratchSurface::new(app::surface_config(&cfg)?, loader, cfg.min_distance);

    /* --- Window ---
       Visual: an empty window opens. */
    let mut drawer = Drawer::new(&cfg.title, cfg.width, cfg.height)?;
    let mut window_size = (0, 0);
    let mut was_down = false;
    let mut last_mouse: Option<(f32, f32)> = None;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Layout: a new window size re-measures the card. */
        let size = drawer.size();
        if size != window_size {
            window_size = size;
            surface.on_layout(size.0, size.1);
        }

        /* 2) Inputs: press/drag/release become pointer events for the card. */
        if drawer.c_pressed_once() {
            surface.remount(); // visual: the card is whole again
        }
        let down = drawer.left_mouse_down();
        let mouse = drawer.mouse_pos();
        if let Some((x, y)) = mouse {
            let p = Point::new(x, y);
            if down && !was_down {
                surface.on_pointer(PointerEvent::Down(p));
            } else if down && mouse != last_mouse {
                surface.on_pointer(PointerEvent::Move(p)); // visual: scratch grows
            }
        }
        if !down && was_down {
            surface.on_pointer(PointerEvent::Up);
        }
        was_down = down;
        last_mouse = mouse;

        /* 3) Photo: pick it up if the fetch finished (existing scratches light up). */
        surface.poll_image();

        /* 4) Present only when something asked for a redraw. */
        if surface.take_redraw() {
            let frame = match surface.render()? {
                Some(frame) => frame,
                None => FrameBuffer::filled(size.0.max(1), size.1.max(1), cfg.background),
            };
            drawer.present(&frame)?;
        } else {
            drawer.idle();
        }
    }

    Ok(())
}
