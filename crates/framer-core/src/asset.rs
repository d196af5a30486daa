//! Decoded image assets and their resource handles.
//!
//! Each loaded image carries an [`AssetHandle`] registered in a shared
//! [`ResourceLedger`]. The handle is released when the asset is dropped, so
//! replacing a subject or frame, or tearing down the session, can never leak
//! a handle. The handle id doubles as the asset's identity: the render loop
//! restarts when the identity of either slot changes.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::decode::{
    decode_image, decode_image_no_orientation, resize_to_fit, DecodeError, DecodedImage,
    FilterType,
};

/// Identity of a loaded asset.
pub type AssetId = u64;

/// Which slot an asset is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Subject,
    Frame,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Subject => f.write_str("subject"),
            AssetKind::Frame => f.write_str("frame"),
        }
    }
}

/// Tracks which asset handles are currently alive.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    next_id: Cell<AssetId>,
    live: RefCell<BTreeSet<AssetId>>,
}

impl ResourceLedger {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Register a new handle.
    pub fn acquire(self: &Rc<Self>, kind: AssetKind) -> AssetHandle {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.live.borrow_mut().insert(id);
        log::debug!("acquired {} handle #{}", kind, id);
        AssetHandle {
            id,
            kind,
            ledger: Rc::clone(self),
        }
    }

    /// Number of handles not yet released.
    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }

    pub fn is_live(&self, id: AssetId) -> bool {
        self.live.borrow().contains(&id)
    }

    fn release(&self, id: AssetId) {
        self.live.borrow_mut().remove(&id);
    }
}

/// Scoped resource handle; released on drop.
pub struct AssetHandle {
    id: AssetId,
    kind: AssetKind,
    ledger: Rc<ResourceLedger>,
}

impl AssetHandle {
    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }
}

impl fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

impl Drop for AssetHandle {
    fn drop(&mut self) {
        self.ledger.release(self.id);
        log::debug!("released {} handle #{}", self.kind, self.id);
    }
}

/// A decoded bitmap ready for compositing.
#[derive(Debug)]
pub struct ImageAsset {
    bitmap: DecodedImage,
    handle: AssetHandle,
}

impl ImageAsset {
    pub fn bitmap(&self) -> &DecodedImage {
        &self.bitmap
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height
    }

    pub fn id(&self) -> AssetId {
        self.handle.id()
    }

    pub fn kind(&self) -> AssetKind {
        self.handle.kind()
    }
}

/// Decodes uploads into [`ImageAsset`]s.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    ledger: Rc<ResourceLedger>,
    max_image_size: u32,
}

impl AssetLoader {
    pub fn new(ledger: Rc<ResourceLedger>, max_image_size: u32) -> Self {
        Self {
            ledger,
            max_image_size,
        }
    }

    pub fn ledger(&self) -> &Rc<ResourceLedger> {
        &self.ledger
    }

    /// Decode an uploaded file, downscaling it to the size cap.
    ///
    /// # Errors
    ///
    /// Returns the [`DecodeError`] if the bytes are not a decodable image. No
    /// handle is acquired in that case.
    pub fn load_upload(&self, bytes: &[u8], kind: AssetKind) -> Result<ImageAsset, DecodeError> {
        let decoded = match kind {
            AssetKind::Subject => decode_image(bytes)?,
            AssetKind::Frame => decode_image_no_orientation(bytes)?,
        };
        let bitmap = resize_to_fit(&decoded, self.max_image_size, FilterType::Bilinear)?;
        Ok(self.finish(bitmap, kind))
    }

    /// Decode a preset frame as-is, skipping the upload preprocessing.
    ///
    /// # Errors
    ///
    /// Returns the [`DecodeError`] if the bytes are not a decodable image.
    pub fn load_preset(&self, bytes: &[u8]) -> Result<ImageAsset, DecodeError> {
        let bitmap = decode_image_no_orientation(bytes)?;
        Ok(self.finish(bitmap, AssetKind::Frame))
    }

    /// Wrap an already-decoded bitmap.
    ///
    /// # Errors
    ///
    /// Returns the [`DecodeError`] if the bitmap is empty or its buffer does
    /// not match its dimensions. No handle is acquired in that case.
    pub fn adopt(&self, bitmap: DecodedImage, kind: AssetKind) -> Result<ImageAsset, DecodeError> {
        bitmap.validate()?;
        Ok(self.finish(bitmap, kind))
    }

    fn finish(&self, bitmap: DecodedImage, kind: AssetKind) -> ImageAsset {
        let handle = self.ledger.acquire(kind);
        log::info!(
            "loaded {} #{} ({}x{})",
            kind,
            handle.id(),
            bitmap.width,
            bitmap.height
        );
        ImageAsset { bitmap, handle }
    }
}
