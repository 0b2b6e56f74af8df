//! Wallpaper storage: at most one active video or image.
//!
//! Videos are kept as raw bytes. Images are kept as a base64 data URL so they can
//! be dropped straight into a page. Storing a new wallpaper empties both slots
//! first, so a crash mid-way leaves no wallpaper rather than two.

use crate::error::{DeskError, Result};
use crate::model::{MediaKind, WallpaperMedia};
use crate::store::StorageBackend;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, info};

pub const VIDEO_SLOT: &str = "current-video";
pub const IMAGE_SLOT: &str = "current-image";

pub struct MediaVault<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> MediaVault<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn store(&self, media: &WallpaperMedia) -> Result<()> {
        self.clear()?;
        match media {
            WallpaperMedia::Video(bytes) => self.backend.write_slot(VIDEO_SLOT, bytes)?,
            WallpaperMedia::Image(data_url) => {
                self.backend.write_slot(IMAGE_SLOT, data_url.as_bytes())?
            }
        }
        info!(kind = %media.kind(), bytes = media.len(), "wallpaper stored");
        Ok(())
    }

    /// Encode raw image bytes as a data URL and store them.
    pub fn store_image_bytes(&self, bytes: &[u8], mime: &str) -> Result<WallpaperMedia> {
        let media = WallpaperMedia::Image(encode_data_url(bytes, mime));
        self.store(&media)?;
        Ok(media)
    }

    /// Store fetched bytes as the given kind.
    pub fn store_bytes(&self, kind: MediaKind, bytes: Vec<u8>, mime: &str) -> Result<WallpaperMedia> {
        match kind {
            MediaKind::Video => {
                let media = WallpaperMedia::Video(bytes);
                self.store(&media)?;
                Ok(media)
            }
            MediaKind::Image => self.store_image_bytes(&bytes, mime),
        }
    }

    /// The active wallpaper. The video slot is checked first.
    pub fn load(&self) -> Result<Option<WallpaperMedia>> {
        if let Some(bytes) = self.backend.read_slot(VIDEO_SLOT)? {
            return Ok(Some(WallpaperMedia::Video(bytes)));
        }
        match self.backend.read_slot(IMAGE_SLOT)? {
            Some(bytes) => {
                let data_url = String::from_utf8(bytes).map_err(|_| {
                    DeskError::InvalidInput("stored image is not a data URL".to_string())
                })?;
                Ok(Some(WallpaperMedia::Image(data_url)))
            }
            None => {
                debug!("no wallpaper stored");
                Ok(None)
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.backend.delete_slot(VIDEO_SLOT)?;
        self.backend.delete_slot(IMAGE_SLOT)
    }
}

pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Split a base64 data URL into its MIME type and decoded bytes.
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>)> {
    let invalid = || DeskError::InvalidInput("not a base64 data URL".to_string());
    let rest = data_url.strip_prefix("data:").ok_or_else(invalid)?;
    let (header, payload) = rest.split_once(',').ok_or_else(invalid)?;
    let mime = header.strip_suffix(";base64").ok_or_else(invalid)?;
    let bytes = STANDARD.decode(payload.trim()).map_err(|_| invalid())?;
    Ok((mime.to_string(), bytes))
}

/// Raw bytes of a wallpaper, decoding image data URLs.
pub fn payload_bytes(media: &WallpaperMedia) -> Result<Vec<u8>> {
    match media {
        WallpaperMedia::Video(bytes) => Ok(bytes.clone()),
        WallpaperMedia::Image(data_url) => decode_data_url(data_url).map(|(_, bytes)| bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemBackend;

    #[test]
    fn empty_vault_loads_nothing() {
        let vault = MediaVault::new(MemBackend::new());
        assert_eq!(vault.load().unwrap(), None);
    }

    #[test]
    fn storing_image_replaces_video() {
        let backend = MemBackend::new();
        let vault = MediaVault::new(backend.clone());
        vault.store(&WallpaperMedia::Video(vec![1, 2, 3])).unwrap();
        vault.store_image_bytes(b"png!", "image/png").unwrap();

        let loaded = vault.load().unwrap().unwrap();
        assert_eq!(loaded.kind(), MediaKind::Image);
        assert_eq!(backend.read_slot(VIDEO_SLOT).unwrap(), None);
    }

    #[test]
    fn storing_video_replaces_image() {
        let vault = MediaVault::new(MemBackend::new());
        vault.store_image_bytes(b"png!", "image/png").unwrap();
        vault.store(&WallpaperMedia::Video(vec![9; 16])).unwrap();
        assert_eq!(
            vault.load().unwrap(),
            Some(WallpaperMedia::Video(vec![9; 16]))
        );
    }

    #[test]
    fn video_slot_wins_when_both_present() {
        let backend = MemBackend::new();
        backend.write_slot(IMAGE_SLOT, b"data:image/png;base64,AA==").unwrap();
        backend.write_slot(VIDEO_SLOT, &[7, 7]).unwrap();
        let vault = MediaVault::new(backend);
        assert_eq!(vault.load().unwrap().unwrap().kind(), MediaKind::Video);
    }

    #[test]
    fn image_is_stored_as_data_url() {
        let vault = MediaVault::new(MemBackend::new());
        let media = vault.store_image_bytes(&[0xff, 0xd8, 0xff], "image/jpeg").unwrap();
        match &media {
            WallpaperMedia::Image(url) => assert_eq!(url, "data:image/jpeg;base64,/9j/"),
            other => panic!("expected image, got {:?}", other),
        }
        assert_eq!(payload_bytes(&media).unwrap(), vec![0xff, 0xd8, 0xff]);
    }

    #[test]
    fn clear_removes_wallpaper() {
        let vault = MediaVault::new(MemBackend::new());
        vault.store(&WallpaperMedia::Video(vec![1])).unwrap();
        vault.clear().unwrap();
        assert_eq!(vault.load().unwrap(), None);
    }

    #[test]
    fn decode_rejects_plain_text() {
        assert!(decode_data_url("hello").is_err());
        assert!(decode_data_url("data:image/png,raw").is_err());
    }

    #[test]
    fn failed_write_reports_unavailable() {
        let backend = MemBackend::new();
        let vault = MediaVault::new(backend.clone());
        backend.set_simulate_write_error(true);
        let err = vault.store(&WallpaperMedia::Video(vec![1])).unwrap_err();
        assert!(err.is_storage_unavailable());
    }
}
