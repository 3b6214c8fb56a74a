// One error type for the whole app.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
    #[error("Image fetch error: {0}")]
    Fetch(String), // Network or file read for an image failed
    #[error("Image decode error: {0}")]
    Decode(String), // Bytes arrived but are not an image we understand
    #[error("Config error: {0}")]
    Config(String), // scratch.toml exists but could not be read/parsed
    #[error("Raster error: {0}")]
    Raster(String), // A pixmap could not be allocated
}
