//! Acquisition channels.
//!
//! Each function handles one platform event end to end: it takes an
//! acquisition ticket under a short lock, performs any file read without the
//! lock held, and applies the result only if the ticket is still current.
//!
//! ```text
//! file picker ──┐
//! URL field   ──┤
//! drop        ──┼──▶ InputSources ──▶ current ImageSource ──▶ preview
//! paste       ──┘
//! ```

use crate::media::{ClipboardPayload, DropPayload, FileItem};

use super::input::{is_accepted_url, AcquisitionTicket};
use super::state::{lock_session, SharedSession};

/// What an acquisition event ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The channel's value became the current source.
    Loaded,
    /// A later acquisition event won; this one changed nothing.
    Superseded,
    /// The payload held nothing usable; channels stay cleared.
    NoImage,
    /// The file could not be read; channels stay cleared.
    ReadFailed,
    /// The file picker closed without a choice.
    Cancelled,
}

// ---------------------------------------------------------------------------
// File picker
// ---------------------------------------------------------------------------

/// The file picker closed, with or without a chosen file.
pub async fn on_file_chosen(session: SharedSession, file: Option<FileItem>) -> AcquireOutcome {
    let Some(file) = file else {
        lock_session(&session).inputs.on_file_cancelled();
        log::debug!("input: file picker cancelled");
        return AcquireOutcome::Cancelled;
    };

    let ticket = lock_session(&session).inputs.begin_acquisition();
    log::debug!("input: reading chosen file {:?}", file.name);

    match file.read_as_data_url().await {
        Ok(data_url) => {
            let applied = lock_session(&session)
                .inputs
                .complete_file(ticket, &file.name, data_url);
            applied_or_superseded(applied)
        }
        Err(e) => {
            log::warn!("input: could not read chosen file {:?}: {e}", file.name);
            AcquireOutcome::ReadFailed
        }
    }
}

// ---------------------------------------------------------------------------
// URL field
// ---------------------------------------------------------------------------

/// Keystroke in the URL field.
pub fn on_url_input(session: &SharedSession, raw: &str) {
    lock_session(session).inputs.on_url_input(raw);
}

// ---------------------------------------------------------------------------
// Drop
// ---------------------------------------------------------------------------

/// Files were released over the window.
pub async fn on_drop(session: SharedSession, payload: DropPayload) -> AcquireOutcome {
    let (ticket, file) = {
        let mut st = lock_session(&session);
        st.drag.on_drop();
        let ticket = st.inputs.begin_replacement();
        (ticket, payload.first_image().cloned())
    };

    let Some(file) = file else {
        log::debug!(
            "input: drop of {} file(s) held no image",
            payload.files.len()
        );
        return AcquireOutcome::NoImage;
    };

    load_image(&session, ticket, &file).await
}

// ---------------------------------------------------------------------------
// Paste
// ---------------------------------------------------------------------------

/// A paste gesture outside any text widget.
pub async fn on_paste(session: SharedSession, payload: ClipboardPayload) -> AcquireOutcome {
    let ticket = lock_session(&session).inputs.begin_replacement();

    if let Some(file) = payload.first_image_file() {
        return load_image(&session, ticket, file).await;
    }

    match payload.text.as_deref() {
        Some(text) if is_accepted_url(text) => {
            let mut st = lock_session(&session);
            if !st.inputs.is_current(ticket) {
                return AcquireOutcome::Superseded;
            }
            st.inputs.paste_url(text);
            log::debug!("input: pasted URL became the source");
            AcquireOutcome::Loaded
        }
        _ => AcquireOutcome::NoImage,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_image(
    session: &SharedSession,
    ticket: AcquisitionTicket,
    file: &FileItem,
) -> AcquireOutcome {
    match file.read_as_data_url().await {
        Ok(data_url) => {
            let applied = lock_session(session).inputs.complete_image(ticket, data_url);
            applied_or_superseded(applied)
        }
        Err(e) => {
            log::warn!("input: could not read image {:?}: {e}", file.name);
            AcquireOutcome::ReadFailed
        }
    }
}

fn applied_or_superseded(applied: bool) -> AcquireOutcome {
    if applied {
        AcquireOutcome::Loaded
    } else {
        log::debug!("input: read finished after a newer acquisition, dropped");
        AcquireOutcome::Superseded
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{data_url, ClipboardItem};
    use crate::session::input::ImageSource;
    use crate::session::state::new_shared_session;

    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0, 1];
    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn source_of(session: &SharedSession) -> Option<ImageSource> {
        lock_session(session).inputs.source().cloned()
    }

    #[tokio::test]
    async fn chosen_file_becomes_data_url_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("car.jpg");
        std::fs::write(&path, JPEG_MAGIC).unwrap();

        let session = new_shared_session();
        let outcome = on_file_chosen(session.clone(), Some(FileItem::from_path(&path))).await;
        assert_eq!(outcome, AcquireOutcome::Loaded);

        let st = lock_session(&session);
        assert_eq!(st.inputs.file_selection(), Some("car.jpg"));
        let source = st.inputs.source().unwrap();
        assert!(source.as_str().starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn cancelled_picker_keeps_active_url() {
        let session = new_shared_session();
        on_url_input(&session, "https://example.com/car.jpg");

        let outcome = on_file_chosen(session.clone(), None).await;
        assert_eq!(outcome, AcquireOutcome::Cancelled);
        assert_eq!(
            source_of(&session),
            Some(ImageSource::Remote("https://example.com/car.jpg".into()))
        );
    }

    #[tokio::test]
    async fn unreadable_file_leaves_state_alone() {
        let session = new_shared_session();
        on_url_input(&session, "https://example.com/car.jpg");

        let outcome = on_file_chosen(
            session.clone(),
            Some(FileItem::from_path("/nope/missing.png")),
        )
        .await;
        assert_eq!(outcome, AcquireOutcome::ReadFailed);
        // The file channel only clears on completion.
        assert!(source_of(&session).is_some());
    }

    #[tokio::test]
    async fn url_then_dropped_jpeg_replaces_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("front.jpg");
        std::fs::write(&path, JPEG_MAGIC).unwrap();

        let session = new_shared_session();
        on_url_input(&session, "https://example.com/car.jpg");
        assert!(lock_session(&session).inputs.preview().is_some());

        let payload = DropPayload::new(vec![FileItem::from_path(&path)]);
        assert_eq!(on_drop(session.clone(), payload).await, AcquireOutcome::Loaded);

        let st = lock_session(&session);
        assert_eq!(st.inputs.url_text(), "");
        let preview = st.inputs.preview().unwrap();
        let decoded = data_url::decode(preview.as_str()).unwrap();
        assert_eq!(decoded.bytes, JPEG_MAGIC);
    }

    #[tokio::test]
    async fn drop_without_image_stays_cleared() {
        let session = new_shared_session();
        on_url_input(&session, "https://example.com/car.jpg");
        {
            let mut st = lock_session(&session);
            st.drag.on_drag_enter();
            st.drag.on_drag_enter();
        }

        let payload = DropPayload::new(vec![FileItem::from_path("/tmp/notes.txt")]);
        assert_eq!(on_drop(session.clone(), payload).await, AcquireOutcome::NoImage);

        let st = lock_session(&session);
        assert!(st.inputs.source().is_none());
        assert_eq!(st.inputs.url_text(), "");
        assert_eq!(st.drag.depth(), 0);
        assert!(!st.drag.is_dragging_over());
    }

    #[tokio::test]
    async fn drop_uses_first_image_file() {
        let session = new_shared_session();
        let payload = DropPayload::new(vec![
            FileItem::from_bytes("notes.txt", Some("text/plain".into()), b"hello".to_vec()),
            FileItem::from_bytes("car.png", None, PNG_MAGIC.to_vec()),
        ]);
        assert_eq!(on_drop(session.clone(), payload).await, AcquireOutcome::Loaded);
        let source = source_of(&session).unwrap();
        assert!(source.as_str().starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn pasted_image_beats_pasted_text() {
        let session = new_shared_session();
        let payload = ClipboardPayload {
            items: vec![ClipboardItem {
                kind: "image/png".into(),
                file: Some(FileItem::from_bytes("clip", None, PNG_MAGIC.to_vec())),
            }],
            text: Some("https://example.com/ignored.jpg".into()),
        };
        assert_eq!(on_paste(session.clone(), payload).await, AcquireOutcome::Loaded);

        let st = lock_session(&session);
        assert!(matches!(st.inputs.source(), Some(ImageSource::DataUrl(_))));
        assert_eq!(st.inputs.url_text(), "");
    }

    #[tokio::test]
    async fn pasted_url_text_fills_the_field() {
        let session = new_shared_session();
        let payload = ClipboardPayload::text("https://cdn.example.com/car.webp");
        assert_eq!(on_paste(session.clone(), payload).await, AcquireOutcome::Loaded);

        let st = lock_session(&session);
        assert_eq!(st.inputs.url_text(), "https://cdn.example.com/car.webp");
        assert_eq!(
            st.inputs.preview(),
            Some(&ImageSource::Remote("https://cdn.example.com/car.webp".into()))
        );
    }

    #[tokio::test]
    async fn pasted_plain_text_clears_everything() {
        let session = new_shared_session();
        on_url_input(&session, "https://example.com/car.jpg");

        let payload = ClipboardPayload::text("just a description");
        assert_eq!(on_paste(session.clone(), payload).await, AcquireOutcome::NoImage);

        let st = lock_session(&session);
        assert!(st.inputs.source().is_none());
        assert_eq!(st.inputs.url_text(), "");
    }

    #[tokio::test]
    async fn last_completed_channel_wins() {
        let session = new_shared_session();

        on_url_input(&session, "https://example.com/a.jpg");
        on_paste(session.clone(), ClipboardPayload::text("https://example.com/b.jpg")).await;
        on_url_input(&session, "https://example.com/c.jpg");

        let st = lock_session(&session);
        assert_eq!(
            st.inputs.source(),
            Some(&ImageSource::Remote("https://example.com/c.jpg".into()))
        );
        assert_eq!(st.inputs.url_text(), "https://example.com/c.jpg");
        assert!(st.inputs.file_selection().is_none());
    }
}
