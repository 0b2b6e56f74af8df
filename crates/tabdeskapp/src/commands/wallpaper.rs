use crate::commands::{recover, CmdMessage, CmdResult, WallpaperInfo};
use crate::error::{DeskError, Result};
use crate::fetch::{MediaFetcher, Transport};
use crate::media::{decode_data_url, payload_bytes, MediaVault};
use crate::model::{MediaKind, WallpaperMedia};
use crate::store::StorageBackend;
use std::path::Path;

const EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("avif", "image/avif"),
    ("svg", "image/svg+xml"),
    ("mp4", "video/mp4"),
    ("m4v", "video/mp4"),
    ("webm", "video/webm"),
    ("ogv", "video/ogg"),
    ("mov", "video/quicktime"),
];

/// MIME type guessed from a file extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

fn kind_of(mime: &str) -> Option<MediaKind> {
    if mime.starts_with("video/") {
        Some(MediaKind::Video)
    } else if mime.starts_with("image/") {
        Some(MediaKind::Image)
    } else {
        None
    }
}

fn info_of(media: &WallpaperMedia) -> WallpaperInfo {
    match media {
        WallpaperMedia::Video(bytes) => WallpaperInfo {
            kind: MediaKind::Video,
            bytes: bytes.len(),
            mime: None,
        },
        WallpaperMedia::Image(data_url) => {
            let decoded = decode_data_url(data_url).ok();
            WallpaperInfo {
                kind: MediaKind::Image,
                bytes: decoded.as_ref().map_or(0, |(_, b)| b.len()),
                mime: decoded.map(|(mime, _)| mime),
            }
        }
    }
}

pub fn show<B: StorageBackend>(vault: &MediaVault<B>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match vault.load()? {
        Some(media) => result.wallpaper = Some(info_of(&media)),
        None => result.add_message(CmdMessage::info("No wallpaper set.")),
    }
    Ok(result)
}

/// Use a local file as the wallpaper. `kind` overrides what the extension suggests.
pub fn set_file<B: StorageBackend>(
    vault: &MediaVault<B>,
    path: &Path,
    kind: Option<MediaKind>,
) -> Result<CmdResult> {
    let guessed = mime_for_path(path);
    let kind = kind.or_else(|| guessed.and_then(kind_of)).ok_or_else(|| {
        DeskError::InvalidInput(format!(
            "cannot tell whether {} is a video or an image",
            path.display()
        ))
    })?;
    let mime = guessed.unwrap_or(match kind {
        MediaKind::Video => "video/mp4",
        MediaKind::Image => "image/png",
    });
    let bytes = std::fs::read(path)?;
    store(vault, kind, bytes, mime, &path.display().to_string())
}

pub fn fetch<B: StorageBackend, T: Transport>(
    vault: &MediaVault<B>,
    fetcher: &MediaFetcher<T>,
    url: &str,
    kind: MediaKind,
) -> Result<CmdResult> {
    let fetched = fetcher.fetch(url, kind)?;
    let mut result = store(vault, kind, fetched.bytes, &fetched.mime, url)?;
    if fetched.via_proxy {
        result.add_message(CmdMessage::info("Downloaded through the proxy."));
    }
    Ok(result)
}

fn store<B: StorageBackend>(
    vault: &MediaVault<B>,
    kind: MediaKind,
    bytes: Vec<u8>,
    mime: &str,
    source: &str,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match vault.store_bytes(kind, bytes, mime) {
        Ok(media) => {
            result.wallpaper = Some(info_of(&media));
            result.add_message(CmdMessage::success(format!(
                "Wallpaper set to {} from {}.",
                kind, source
            )));
        }
        Err(e) => recover(&mut result, e, "Wallpaper")?,
    }
    Ok(result)
}

pub fn clear<B: StorageBackend>(vault: &MediaVault<B>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match vault.clear() {
        Ok(()) => result.add_message(CmdMessage::success("Wallpaper cleared.")),
        Err(e) => recover(&mut result, e, "Wallpaper")?,
    }
    Ok(result)
}

/// Write the stored wallpaper's raw bytes to `path`.
pub fn export<B: StorageBackend>(vault: &MediaVault<B>, path: &Path) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let Some(media) = vault.load()? else {
        result.add_message(CmdMessage::warning("No wallpaper to export."));
        return Ok(result);
    };
    let bytes = payload_bytes(&media)?;
    std::fs::write(path, &bytes)?;
    result.wallpaper = Some(info_of(&media));
    result.add_message(CmdMessage::success(format!(
        "Exported {} bytes to {}.",
        bytes.len(),
        path.display()
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::fetch::FetchResponse;
    use crate::store::MemBackend;
    use tempfile::tempdir;

    struct Canned(FetchResponse);

    impl Transport for Canned {
        fn get(&self, _url: &str) -> Result<FetchResponse> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for_path(Path::new("a/b.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("clip.webm")), Some("video/webm"));
        assert_eq!(mime_for_path(Path::new("notes.txt")), None);
    }

    #[test]
    fn set_file_then_show_and_export() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("bg.png");
        std::fs::write(&src, b"\x89PNG").unwrap();
        let vault = MediaVault::new(MemBackend::new());

        set_file(&vault, &src, None).unwrap();
        let shown = show(&vault).unwrap().wallpaper.unwrap();
        assert_eq!(shown.kind, MediaKind::Image);
        assert_eq!(shown.bytes, 4);
        assert_eq!(shown.mime.as_deref(), Some("image/png"));

        let out = dir.path().join("out.png");
        export(&vault, &out).unwrap();
        assert_eq!(std::fs::read(out).unwrap(), b"\x89PNG");
    }

    #[test]
    fn unknown_extension_needs_a_kind() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("bg.bin");
        std::fs::write(&src, b"data").unwrap();
        let vault = MediaVault::new(MemBackend::new());

        assert!(matches!(
            set_file(&vault, &src, None),
            Err(DeskError::InvalidInput(_))
        ));
        set_file(&vault, &src, Some(MediaKind::Video)).unwrap();
        assert_eq!(show(&vault).unwrap().wallpaper.unwrap().kind, MediaKind::Video);
    }

    #[test]
    fn fetch_stores_downloaded_media() {
        let vault = MediaVault::new(MemBackend::new());
        let fetcher = MediaFetcher::new(
            Canned(FetchResponse {
                status: 200,
                content_type: Some("video/mp4".into()),
                bytes: b"vid".to_vec(),
            }),
            "https://proxy.example.com/?u={url}",
        );
        let result = fetch(&vault, &fetcher, "https://cdn.example.com/a.mp4", MediaKind::Video).unwrap();
        assert_eq!(result.wallpaper.unwrap().bytes, 3);
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn clear_and_empty_export() {
        let dir = tempdir().unwrap();
        let vault = MediaVault::new(MemBackend::new());
        vault.store(&WallpaperMedia::Video(vec![1, 2])).unwrap();
        clear(&vault).unwrap();
        assert_eq!(show(&vault).unwrap().messages[0].content, "No wallpaper set.");

        let result = export(&vault, &dir.path().join("x")).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
    }
}
