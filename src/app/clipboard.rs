//! OS clipboard → [`ClipboardPayload`].
//!
//! `arboard` hands images over as raw RGBA; they are re-encoded as PNG so the
//! paste channel sees an ordinary `image/png` file.

use std::io::Cursor;

use anyhow::{Context, Result};

use crate::media::{ClipboardItem, ClipboardPayload, FileItem};

/// Name given to a pasted bitmap.
pub const PASTED_IMAGE_NAME: &str = "clipboard.png";

/// Snapshot the system clipboard.  An unavailable clipboard yields an empty
/// payload.
pub fn read_clipboard() -> ClipboardPayload {
    let mut clipboard = match arboard::Clipboard::new() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("clipboard: unavailable: {e}");
            return ClipboardPayload::default();
        }
    };

    let image = clipboard.get_image().ok();
    let text = clipboard.get_text().ok();
    payload_from(image, text)
}

/// Build the payload from what the clipboard offered.
pub fn payload_from(image: Option<arboard::ImageData<'_>>, text: Option<String>) -> ClipboardPayload {
    let mut items = Vec::new();

    if let Some(image) = image {
        let file = match encode_png(&image) {
            Ok(bytes) => Some(FileItem::from_bytes(
                PASTED_IMAGE_NAME,
                Some("image/png".into()),
                bytes,
            )),
            Err(e) => {
                log::warn!("clipboard: {e:#}");
                None
            }
        };
        items.push(ClipboardItem {
            kind: "image/png".into(),
            file,
        });
    }

    if text.is_some() {
        items.push(ClipboardItem {
            kind: "text/plain".into(),
            file: None,
        });
    }

    ClipboardPayload { items, text }
}

/// RGBA clipboard bitmap → PNG bytes.
pub fn encode_png(image: &arboard::ImageData<'_>) -> Result<Vec<u8>> {
    let width = u32::try_from(image.width).context("image too wide")?;
    let height = u32::try_from(image.height).context("image too tall")?;
    let buffer = image::RgbaImage::from_raw(width, height, image.bytes.to_vec())
        .context("clipboard bitmap size does not match its dimensions")?;

    let mut png = Cursor::new(Vec::new());
    buffer
        .write_to(&mut png, image::ImageFormat::Png)
        .context("PNG encoding failed")?;
    Ok(png.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
