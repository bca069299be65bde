use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::error::AssetError;

/// Unique identifier for a texture created during loading.
pub type AssetId = u64;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_asset_id() -> AssetId {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Pixel format of a loaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgba8,
    Rgb8,
}

/// A loaded texture with raw pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureAsset {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub format: TextureFormat,
}

impl TextureAsset {
    /// A 1x1 texture of a single RGBA pixel.
    pub fn solid(pixel: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            data: pixel.to_vec(),
            format: TextureFormat::Rgba8,
        }
    }
}

/// Lifecycle of a texture referenced by a material.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureState {
    /// Content is still decoding; draw with the placeholder pixel meanwhile.
    Pending { placeholder: [u8; 4] },
    Ready(TextureAsset),
    Failed(String),
}

/// Handle to a texture whose content may arrive after the model has been
/// assembled. Cloning shares the underlying state; handles compare equal
/// by id.
#[derive(Debug, Clone)]
pub struct TextureHandle {
    id: AssetId,
    state: watch::Receiver<TextureState>,
}

impl TextureHandle {
    /// A handle that is immediately ready with a 1x1 solid color.
    pub fn solid(pixel: [u8; 4]) -> Self {
        let (_, state) = watch::channel(TextureState::Ready(TextureAsset::solid(pixel)));
        Self {
            id: next_asset_id(),
            state,
        }
    }

    /// A pending handle plus the writer used to complete it.
    pub fn pending(placeholder: [u8; 4]) -> (Self, TextureWriter) {
        let (sender, state) = watch::channel(TextureState::Pending { placeholder });
        let handle = Self {
            id: next_asset_id(),
            state,
        };
        (handle, TextureWriter { sender })
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), TextureState::Ready(_))
    }

    /// Run `f` against the current state without cloning pixel data.
    pub fn inspect<T>(&self, f: impl FnOnce(&TextureState) -> T) -> T {
        f(&self.state.borrow())
    }

    /// Wait until the texture leaves the pending state. This is the
    /// completion signal to join before a draw that samples the texture is
    /// considered valid.
    pub async fn wait_ready(&self) -> Result<(), AssetError> {
        let mut state = self.state.clone();
        let outcome = state
            .wait_for(|current| !matches!(current, TextureState::Pending { .. }))
            .await;
        match outcome {
            Ok(current) => match &*current {
                TextureState::Failed(reason) => Err(AssetError::TextureFailed(reason.clone())),
                _ => Ok(()),
            },
            Err(_) => Err(AssetError::TextureAbandoned),
        }
    }
}

impl PartialEq for TextureHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TextureHandle {}

/// Producing side of a pending texture. Fulfill or fail exactly once.
#[derive(Debug)]
pub struct TextureWriter {
    sender: watch::Sender<TextureState>,
}

impl TextureWriter {
    pub fn fulfill(self, asset: TextureAsset) {
        let _ = self.sender.send(TextureState::Ready(asset));
    }

    pub fn fail(self, reason: impl Into<String>) {
        let _ = self.sender.send(TextureState::Failed(reason.into()));
    }
}

/// Decode an image file into an RGBA8 texture.
pub fn load_texture(path: &Path) -> Result<TextureAsset, AssetError> {
    let img = image::open(path)
        .map_err(|e| AssetError::ImageLoad(path.display().to_string(), e.to_string()))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(TextureAsset {
        width,
        height,
        data: rgba.into_raw(),
        format: TextureFormat::Rgba8,
    })
}
