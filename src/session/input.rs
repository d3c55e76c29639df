//! Input Source Manager.
//!
//! [`InputSources`] owns the single current [`ImageSource`] and the values
//! stored by each acquisition channel (chosen file, URL field text).  Every
//! channel clears the others before writing, so at most one channel's
//! contribution is live at a time.
//!
//! # Acquisition tickets
//!
//! File reads complete asynchronously.  Every acquisition event takes an
//! [`AcquisitionTicket`]; a completion carrying a ticket older than the latest
//! event is discarded instead of overwriting the newer channel's value.
//!
//! ```text
//! t0  choose file  ── ticket 1 ──────────────── read done (ticket 1: stale, dropped)
//! t1  type URL     ── ticket 2 → source = URL
//! ```

/// URL prefixes accepted by the URL field and by pasted text.
pub const ACCEPTED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Returns `true` when `text` starts with an accepted URL scheme.
pub fn is_accepted_url(text: &str) -> bool {
    ACCEPTED_SCHEMES.iter().any(|scheme| text.starts_with(scheme))
}

// ---------------------------------------------------------------------------
// ImageSource
// ---------------------------------------------------------------------------

/// Reference to the image that will be sent for generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Inline bytes as a `data:` URL (file picker, drop, clipboard image).
    DataUrl(String),
    /// Remote image URL (URL field, pasted text).
    Remote(String),
}

impl ImageSource {
    /// Classify a reference string.
    pub fn from_reference(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        if crate::media::is_data_url(&reference) {
            Self::DataUrl(reference)
        } else {
            Self::Remote(reference)
        }
    }

    /// The reference string, as the generation service expects it.
    pub fn as_str(&self) -> &str {
        match self {
            Self::DataUrl(s) | Self::Remote(s) => s,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

// ---------------------------------------------------------------------------
// AcquisitionTicket
// ---------------------------------------------------------------------------

/// Proof of when an acquisition event happened.  See the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AcquisitionTicket(u64);

// ---------------------------------------------------------------------------
// InputSources
// ---------------------------------------------------------------------------

/// Current input image plus every channel's own stored value.
#[derive(Debug, Default)]
pub struct InputSources {
    source: Option<ImageSource>,
    /// Name of the file chosen in the picker (the picker's own value).
    file_selection: Option<String>,
    /// Text of the URL field.
    url_text: String,
    /// Latest acquisition event.
    epoch: u64,
    /// Bumped by every `set_source` so the preview knows when to reload.
    preview_revision: u64,
}

impl InputSources {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Accessors ────────────────────────────────────────────────────────

    /// The current input image, if any.
    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    /// What the preview surface shows; `None` means hidden.
    pub fn preview(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    pub fn preview_revision(&self) -> u64 {
        self.preview_revision
    }

    /// Name of the file currently held by the picker.
    pub fn file_selection(&self) -> Option<&str> {
        self.file_selection.as_deref()
    }

    /// Text currently held by the URL field.
    pub fn url_text(&self) -> &str {
        &self.url_text
    }

    // ── Core contract ────────────────────────────────────────────────────

    /// Replace the current source and resynchronise the preview.
    pub fn set_source(&mut self, source: Option<ImageSource>) {
        self.source = source;
        self.preview_revision = self.preview_revision.wrapping_add(1);
    }

    /// Reset every channel's stored value and hide the preview.
    pub fn clear_all(&mut self) {
        self.file_selection = None;
        self.url_text.clear();
        self.set_source(None);
    }

    /// Record a new acquisition event.
    pub fn begin_acquisition(&mut self) -> AcquisitionTicket {
        self.epoch += 1;
        AcquisitionTicket(self.epoch)
    }

    /// `true` while no acquisition event happened after `ticket`.
    pub fn is_current(&self, ticket: AcquisitionTicket) -> bool {
        ticket.0 == self.epoch
    }

    // ── URL field ────────────────────────────────────────────────────────

    /// Keystroke in the URL field; `raw` is the full field text.
    pub fn on_url_input(&mut self, raw: &str) {
        self.begin_acquisition();
        let url = raw.trim();

        if url.is_empty() {
            self.url_text = raw.to_string();
            self.set_source(None);
        } else if is_accepted_url(url) {
            self.clear_all();
            self.url_text = url.to_string();
            self.set_source(Some(ImageSource::Remote(url.to_string())));
        } else {
            // Keep the text so the user can finish typing.
            self.url_text = raw.to_string();
            self.set_source(None);
        }
    }

    // ── File picker ──────────────────────────────────────────────────────

    /// The picker closed without a file.
    pub fn on_file_cancelled(&mut self) {
        if self.source.is_none() {
            self.clear_all();
        }
    }

    /// The chosen file finished reading.  Returns `false` when the read was
    /// superseded and nothing changed.
    pub fn complete_file(
        &mut self,
        ticket: AcquisitionTicket,
        name: &str,
        data_url: String,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.clear_all();
        self.file_selection = Some(name.to_string());
        self.set_source(Some(ImageSource::from_reference(data_url)));
        true
    }

    // ── Drop / paste ─────────────────────────────────────────────────────

    /// Drop or paste: clear everything up front and take a ticket.
    pub fn begin_replacement(&mut self) -> AcquisitionTicket {
        self.clear_all();
        self.begin_acquisition()
    }

    /// A dropped or pasted image finished reading.  Returns `false` when the
    /// read was superseded.
    pub fn complete_image(&mut self, ticket: AcquisitionTicket, data_url: String) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.set_source(Some(ImageSource::from_reference(data_url)));
        true
    }

    /// Pasted text that is an accepted URL: mirror it into the URL field.
    pub fn paste_url(&mut self, text: &str) {
        self.url_text = text.to_string();
        self.set_source(Some(ImageSource::Remote(text.to_string())));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = "data:image/jpeg;base64,/9j/4AAQ";

    #[test]
    fn accepted_schemes() {
        assert!(is_accepted_url("http://a.b/c.jpg"));
        assert!(is_accepted_url("https://a.b/c.jpg"));
        assert!(!is_accepted_url("ftp://a.b/c.jpg"));
        assert!(!is_accepted_url("HTTPS://a.b/c.jpg"));
        assert!(!is_accepted_url("www.example.com"));
    }

    #[test]
    fn image_source_classification() {
        assert_eq!(
            ImageSource::from_reference(DATA),
            ImageSource::DataUrl(DATA.into())
        );
        let remote = ImageSource::from_reference("https://x.y/z.png");
        assert!(remote.is_remote());
        assert_eq!(remote.as_str(), "https://x.y/z.png");
    }

    #[test]
    fn set_source_syncs_preview() {
        let mut inputs = InputSources::new();
        let rev = inputs.preview_revision();

        inputs.set_source(Some(ImageSource::Remote("https://a/b.png".into())));
        assert_eq!(inputs.preview(), inputs.source());
        assert!(inputs.preview().is_some());
        assert_ne!(inputs.preview_revision(), rev);

        inputs.set_source(None);
        assert!(inputs.preview().is_none());
    }

    #[test]
    fn valid_url_is_trimmed_and_becomes_source() {
        let mut inputs = InputSources::new();
        inputs.on_url_input("  https://example.com/car.jpg  ");
        assert_eq!(inputs.url_text(), "https://example.com/car.jpg");
        assert_eq!(
            inputs.source(),
            Some(&ImageSource::Remote("https://example.com/car.jpg".into()))
        );
    }

    #[test]
    fn invalid_url_hides_preview_but_keeps_text() {
        let mut inputs = InputSources::new();
        inputs.on_url_input("https://example.com/car.jpg");
        inputs.on_url_input("exa");
        assert_eq!(inputs.url_text(), "exa");
        assert!(inputs.source().is_none());
        assert!(inputs.preview().is_none());
    }

    #[test]
    fn empty_url_hides_preview() {
        let mut inputs = InputSources::new();
        inputs.on_url_input("https://example.com/car.jpg");
        inputs.on_url_input("   ");
        assert!(inputs.source().is_none());
    }

    #[test]
    fn valid_url_clears_file_selection() {
        let mut inputs = InputSources::new();
        let ticket = inputs.begin_acquisition();
        assert!(inputs.complete_file(ticket, "car.jpg", DATA.into()));
        assert_eq!(inputs.file_selection(), Some("car.jpg"));

        inputs.on_url_input("https://example.com/other.jpg");
        assert!(inputs.file_selection().is_none());
    }

    #[test]
    fn file_completion_clears_url_field() {
        let mut inputs = InputSources::new();
        inputs.on_url_input("https://example.com/car.jpg");

        let ticket = inputs.begin_acquisition();
        assert!(inputs.complete_file(ticket, "local.jpg", DATA.into()));
        assert_eq!(inputs.url_text(), "");
        assert_eq!(inputs.source(), Some(&ImageSource::DataUrl(DATA.into())));
    }

    #[test]
    fn cancel_without_source_clears_everything() {
        let mut inputs = InputSources::new();
        inputs.on_url_input("not-a-url");
        inputs.on_file_cancelled();
        assert_eq!(inputs.url_text(), "");
        assert!(inputs.source().is_none());
    }

    #[test]
    fn cancel_with_active_source_keeps_it() {
        let mut inputs = InputSources::new();
        inputs.on_url_input("https://example.com/car.jpg");
        inputs.on_file_cancelled();
        assert_eq!(inputs.url_text(), "https://example.com/car.jpg");
        assert!(inputs.source().is_some());
    }

    #[test]
    fn stale_completion_is_dropped() {
        let mut inputs = InputSources::new();
        let file_ticket = inputs.begin_acquisition();
        inputs.on_url_input("https://example.com/typed-later.jpg");

        assert!(!inputs.complete_file(file_ticket, "slow.jpg", DATA.into()));
        assert_eq!(
            inputs.source(),
            Some(&ImageSource::Remote("https://example.com/typed-later.jpg".into()))
        );
        assert!(inputs.file_selection().is_none());
    }

    #[test]
    fn replacement_clears_up_front() {
        let mut inputs = InputSources::new();
        inputs.on_url_input("https://example.com/car.jpg");
        let ticket = inputs.begin_replacement();
        assert!(inputs.source().is_none());
        assert_eq!(inputs.url_text(), "");

        assert!(inputs.complete_image(ticket, DATA.into()));
        assert_eq!(inputs.source(), Some(&ImageSource::DataUrl(DATA.into())));
    }

    #[test]
    fn older_replacement_loses_to_newer_one() {
        let mut inputs = InputSources::new();
        let first = inputs.begin_replacement();
        let second = inputs.begin_replacement();

        assert!(inputs.complete_image(second, "data:image/png;base64,AAAA".into()));
        assert!(!inputs.complete_image(first, DATA.into()));
        assert_eq!(inputs.source().map(ImageSource::as_str), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn paste_url_mirrors_into_field() {
        let mut inputs = InputSources::new();
        inputs.begin_replacement();
        inputs.paste_url("https://cdn.example.com/p.png");
        assert_eq!(inputs.url_text(), "https://cdn.example.com/p.png");
        assert!(inputs.source().is_some_and(ImageSource::is_remote));
    }
}
