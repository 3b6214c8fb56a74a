// Fetches and decodes the image behind the scratch card.
// Visual: nothing is revealed until the picture has arrived; then the existing scratch shows it.
//
// The fetch runs on a worker thread. Results come back over a channel and are
// picked up by `poll()` on the window loop, so UI state never leaves that thread.

use crate::error::Error;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use tiny_skia::{IntSize, Pixmap};
use tracing::{debug, info, warn};

/// Decoded, premultiplied image shared between loader and renderer.
#[derive(Clone, Debug)]
pub struct ImageHandle(Arc<Pixmap>);

impl ImageHandle {
    pub fn pixmap(&self) -> &Pixmap {
        &self.0
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }
}

/// Where image bytes come from.
pub trait ImageFetch: Send + Sync {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, Error>;
}

impl<F> ImageFetch for F
where
    F: Fn(&str) -> Result<Vec<u8>, Error> + Send + Sync,
{
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, Error> {
        self(uri)
    }
}

/// HTTP(S) via reqwest; `file://` and bare paths read from disk.
pub struct HttpFetch {
    client: reqwest::blocking::Client,
}

impl HttpFetch {
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| Error::Fetch(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl ImageFetch for HttpFetch {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, Error> {
        if !(uri.starts_with("http://") || uri.starts_with("https://")) {
            let path = uri.strip_prefix("file://").unwrap_or(uri);
            return std::fs::read(path).map_err(|e| Error::Fetch(format!("{path}: {e}")));
        }

        let response = self
            .client
            .get(uri)
            .send()
            .map_err(|e| Error::Fetch(format!("{uri}: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Fetch(format!("{uri}: HTTP {}", response.status())));
        }
        let bytes = response.bytes().map_err(|e| Error::Fetch(format!("{uri}: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Decode any supported format into a premultiplied pixmap.
pub fn decode(bytes: &[u8]) -> Result<ImageHandle, Error> {
    let rgba = image::load_from_memory(bytes)
        .map_err(|e| Error::Decode(e.to_string()))?
        .to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut data = rgba.into_raw();

    // tiny-skia stores premultiplied alpha
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 255 { continue; }
        for c in &mut px[..3] {
            *c = ((*c as u32 * a + 127) / 255) as u8;
        }
    }

    let size = IntSize::from_wh(w, h).ok_or_else(|| Error::Decode(format!("bad size {w}x{h}")))?;
    let pixmap = Pixmap::from_vec(data, size).ok_or_else(|| Error::Decode("pixmap from pixels".into()))?;
    Ok(ImageHandle(Arc::new(pixmap)))
}

type Delivery = (String, Result<ImageHandle, Error>);

/// What `poll()` picked up for the current URI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadEvent {
    Loaded,
    Failed,
}

/// Tracks the image for the current URI: unloaded until the worker delivers it.
/// One worker thread serves every request; while it is busy, queued requests
/// collapse to the newest one.
pub struct ImageLoader {
    uri: Option<String>,
    image: Option<ImageHandle>,
    requests: Sender<String>,
    results: Receiver<Delivery>,
}

impl ImageLoader {
    pub fn new(fetcher: Arc<dyn ImageFetch>) -> Result<Self, Error> {
        let (requests, inbox) = mpsc::channel::<String>();
        let (outbox, results) = mpsc::channel();
        std::thread::Builder::new()
            .name("image-fetch".into())
            .spawn(move || {
                // Ends when the loader (and with it the request sender) is dropped.
                while let Ok(mut uri) = inbox.recv() {
                    // Only the newest size matters; skip what a resize superseded.
                    while let Ok(newer) = inbox.try_recv() {
                        uri = newer;
                    }
                    let result = fetcher.fetch(&uri).and_then(|bytes| decode(&bytes));
                    if outbox.send((uri, result)).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| Error::Fetch(format!("could not start image worker: {e}")))?;
        Ok(Self { uri: None, image: None, requests, results })
    }

    /// Point the loader at `uri`. Same URI: nothing happens.
    /// New URI: the old image is dropped and a fetch is queued.
    pub fn request(&mut self, uri: &str) {
        if self.uri.as_deref() == Some(uri) {
            return;
        }
        debug!(uri, "image requested");
        self.uri = Some(uri.to_owned());
        self.image = None;
        if self.requests.send(uri.to_owned()).is_err() {
            warn!(uri, "image worker is gone");
        }
    }

    /// Pick up finished fetches for the current URI; stale ones are dropped.
    pub fn poll(&mut self) -> Option<LoadEvent> {
        let mut event = None;
        while let Ok((uri, result)) = self.results.try_recv() {
            if self.uri.as_deref() != Some(uri.as_str()) {
                debug!(uri = %uri, "dropping stale image");
                continue;
            }
            match result {
                Ok(image) => {
                    info!(uri = %uri, width = image.width(), height = image.height(), "image loaded");
                    self.image = Some(image);
                    event = Some(LoadEvent::Loaded);
                }
                Err(e) => {
                    warn!(uri = %uri, "image unavailable: {e}");
                    event = Some(LoadEvent::Failed);
                }
            }
        }
        event
    }

    pub fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    #[cfg(test)]
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

#[cfg(test)]
pub(crate) fn test_png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[cfg(test)]
pub(crate) fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while std::time::Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn sized_fetch() -> Arc<dyn ImageFetch> {
        // "w/h" -> a w x h red square; "slow/..." waits first; "bad" is not an image.
        Arc::new(|uri: &str| -> Result<Vec<u8>, Error> {
            let uri = match uri.strip_prefix("slow/") {
                Some(rest) => {
                    std::thread::sleep(Duration::from_millis(60));
                    rest
                }
                None => uri,
            };
            if uri == "bad" {
                return Ok(b"not an image".to_vec());
            }
            if uri == "missing" {
                return Err(Error::Fetch("404".into()));
            }
            let (w, h) = uri.split_once('/').ok_or_else(|| Error::Fetch(uri.into()))?;
            let w = w.parse().map_err(|_| Error::Fetch(uri.into()))?;
            let h = h.parse().map_err(|_| Error::Fetch(uri.into()))?;
            Ok(test_png(w, h, [255, 0, 0, 255]))
        })
    }

    fn loaded(loader: &mut ImageLoader) -> bool {
        wait_until(|| loader.poll() == Some(LoadEvent::Loaded))
    }

    #[test]
    fn test_unloaded_until_worker_delivers() {
        let mut loader = ImageLoader::new(sized_fetch()).unwrap();
        loader.request("4/3");
        assert!(loader.image().is_none());
        assert!(loaded(&mut loader));
        let image = loader.image().unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
    }

    #[test]
    fn test_same_uri_does_not_reload() {
        let mut loader = ImageLoader::new(sized_fetch()).unwrap();
        loader.request("2/2");
        assert!(loaded(&mut loader));
        loader.request("2/2");
        assert!(loader.image().is_some());
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(loader.poll(), None);
    }

    #[test]
    fn test_uri_change_drops_old_image_and_stale_result() {
        let mut loader = ImageLoader::new(sized_fetch()).unwrap();
        loader.request("slow/8/8");
        loader.request("5/5");
        assert!(loader.image().is_none());
        assert!(loaded(&mut loader));
        // Let the slow one arrive too if it was fetched; it must be ignored.
        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(loader.poll(), None);
        assert_eq!(loader.image().map(|i| i.width()), Some(5));
        assert_eq!(loader.uri(), Some("5/5"));
    }

    #[test]
    fn test_burst_of_requests_collapses_to_newest() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let inner = sized_fetch();
        let fetch: Arc<dyn ImageFetch> = Arc::new(move |uri: &str| -> Result<Vec<u8>, Error> {
            counted.fetch_add(1, Ordering::SeqCst);
            inner.fetch(uri)
        });
        let mut loader = ImageLoader::new(fetch).unwrap();
        // The worker is busy on the first; the rest queue up behind it.
        loader.request("slow/1/1");
        for side in 2..=9 {
            loader.request(&format!("{side}/{side}"));
        }
        assert!(loaded(&mut loader));
        assert_eq!(loader.image().map(|i| i.width()), Some(9));
        assert!(calls.load(Ordering::SeqCst) <= 2, "fetched {} times", calls.load(Ordering::SeqCst));
    }

    #[test]
    fn test_failures_leave_loader_unloaded() {
        for uri in ["bad", "missing"] {
            let mut loader = ImageLoader::new(sized_fetch()).unwrap();
            loader.request(uri);
            assert!(wait_until(|| loader.poll() == Some(LoadEvent::Failed)));
            assert!(loader.image().is_none());
        }
    }

    #[test]
    fn test_decode_premultiplies() {
        let handle = decode(&test_png(1, 1, [200, 100, 50, 128])).unwrap();
        let px = handle.pixmap().pixel(0, 0).unwrap();
        assert_eq!(px.alpha(), 128);
        assert_eq!(px.red(), ((200u32 * 128 + 127) / 255) as u8);
    }

    #[test]
    fn test_http_fetch_reads_local_files() {
        let dir = std::env::temp_dir().join(format!("scratch-reveal-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("tiny.png");
        std::fs::write(&file, test_png(2, 2, [0, 0, 255, 255])).unwrap();

        let fetch = HttpFetch::new().unwrap();
        let uri = format!("file://{}", file.display());
        let bytes = fetch.fetch(&uri).unwrap();
        assert_eq!(decode(&bytes).unwrap().width(), 2);
        assert!(fetch.fetch("/definitely/not/here.png").is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
