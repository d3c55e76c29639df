//! Remote Generation Workflow.
//!
//! ```text
//! submit()
//!   ├─ in flight?        → Busy
//!   ├─ no source         → notice, MissingImage
//!   ├─ blank prompt      → notice, MissingPrompt
//!   └─ lock trigger, show loading, hide previous result
//!        └─▶ ImageGenerator::generate
//!              ├─ url      → result shown
//!              ├─ no url   → notice
//!              └─ error    → notice + error log
//!        (guard) unlock trigger, hide loading
//! ```

use std::sync::Arc;

use crate::config::{GenerationConfig, Quality};
use crate::generation::{GenerationError, GenerationRequest, ImageGenerator};
use crate::media;
use crate::notify::{messages, Notifier};
use crate::session::{lock_session, GenerationResult, ImageSource, SharedSession};

/// Appended to every prompt while plate obfuscation is on.
pub const PLATE_OBFUSCATION_SUFFIX: &str = ". IMPORTANT: Ensure all vehicle license plates in the image are perfectly obscured, blurred, or removed, while maintaining high realism, shadow precision, and tone standardization.";

/// Final prompt sent to the service.
pub fn build_prompt(prompt: &str, plate_obfuscation: bool) -> String {
    let prompt = prompt.trim();
    if plate_obfuscation {
        format!("{prompt}{PLATE_OBFUSCATION_SUFFIX}")
    } else {
        prompt.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A generation was already in flight; nothing happened.
    Busy,
    MissingImage,
    MissingPrompt,
    /// The result URL now displayed.
    Generated(String),
    /// The service answered without a URL.
    NoUrl,
    Failed,
}

pub struct GenerationWorkflow {
    session: SharedSession,
    generator: Arc<dyn ImageGenerator>,
    notifier: Arc<dyn Notifier>,
    quality: Quality,
    /// Set when remote sources are inlined before upload.
    inline_client: Option<reqwest::Client>,
}

impl GenerationWorkflow {
    pub fn new(
        session: SharedSession,
        generator: Arc<dyn ImageGenerator>,
        notifier: Arc<dyn Notifier>,
        config: &GenerationConfig,
    ) -> Self {
        Self {
            session,
            generator,
            notifier,
            quality: config.quality,
            inline_client: None,
        }
    }

    /// Fetch remote sources and send them as data URLs.
    pub fn with_remote_inlining(mut self, client: reqwest::Client) -> Self {
        self.inline_client = Some(client);
        self
    }

    /// Flip plate obfuscation and tell the user the new mode.
    pub fn toggle_plate_obfuscation(&self) -> bool {
        let active = {
            let mut st = lock_session(&self.session);
            st.plate_obfuscation = !st.plate_obfuscation;
            st.plate_obfuscation
        };
        log::debug!("generate: plate obfuscation {}", if active { "on" } else { "off" });
        self.notifier.info(if active {
            messages::PLATE_ON
        } else {
            messages::PLATE_OFF
        });
        active
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (source, prompt) = match self.begin() {
            Ok(ready) => ready,
            Err(outcome) => return outcome,
        };
        let _in_flight = InFlightGuard(&self.session);
        log::debug!("generate: request started");

        let response = match self.prepare_input(source).await {
            Ok(image_url) => {
                let request = GenerationRequest::new(prompt, image_url, self.quality);
                self.generator.generate(&request).await
            }
            Err(e) => Err(e),
        };

        match response {
            Ok(response) => match response.result_url() {
                Some(url) => {
                    let url = url.to_string();
                    let mut st = lock_session(&self.session);
                    st.generation.result = Some(GenerationResult { url: url.clone() });
                    st.generation.result_visible = true;
                    log::debug!("generate: result received");
                    SubmitOutcome::Generated(url)
                }
                None => {
                    self.notifier.error(messages::GENERATION_NO_URL);
                    SubmitOutcome::NoUrl
                }
            },
            Err(e) => {
                log::error!("generate: request failed: {e}");
                self.notifier.error(messages::GENERATION_ERROR);
                SubmitOutcome::Failed
            }
        }
    }

    /// Preconditions and in-flight transition under one lock.
    fn begin(&self) -> Result<(ImageSource, String), SubmitOutcome> {
        let mut st = lock_session(&self.session);
        if st.generation.in_flight {
            return Err(SubmitOutcome::Busy);
        }

        let Some(source) = st.inputs.source().cloned() else {
            drop(st);
            self.notifier.warn(messages::MISSING_IMAGE);
            return Err(SubmitOutcome::MissingImage);
        };
        if st.prompt.trim().is_empty() {
            drop(st);
            self.notifier.warn(messages::MISSING_PROMPT);
            return Err(SubmitOutcome::MissingPrompt);
        }

        let prompt = build_prompt(&st.prompt, st.plate_obfuscation);
        st.generation.in_flight = true;
        st.generation.loading = true;
        st.generation.result_visible = false;
        Ok((source, prompt))
    }

    async fn prepare_input(&self, source: ImageSource) -> Result<String, GenerationError> {
        match (source, &self.inline_client) {
            (ImageSource::Remote(url), Some(client)) => {
                log::debug!("generate: inlining remote source");
                Ok(media::fetch_as_data_url(client, &url).await?)
            }
            (source, _) => Ok(source.as_str().to_string()),
        }
    }
}

/// Re-enables the trigger and hides loading, including on cancellation.
struct InFlightGuard<'a>(&'a SharedSession);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut st = lock_session(self.0);
        st.generation.in_flight = false;
        st.generation.loading = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::generation::GenerationResponse;
    use crate::notify::NoticeBoard;
    use crate::session::new_shared_session;

    /// Records every request and replays a canned reply.
    struct MockGenerator {
        requests: Mutex<Vec<GenerationRequest>>,
        reply: fn() -> Result<GenerationResponse, GenerationError>,
        session: Option<SharedSession>,
        observed_loading: Mutex<Option<(bool, bool)>>,
    }

    impl MockGenerator {
        fn new(reply: fn() -> Result<GenerationResponse, GenerationError>) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                reply,
                session: None,
                observed_loading: Mutex::new(None),
            }
        }

        fn watching(mut self, session: &SharedSession) -> Self {
            self.session = Some(Arc::clone(session));
            self
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ImageGenerator for MockGenerator {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> Result<GenerationResponse, GenerationError> {
            if let Some(session) = &self.session {
                let st = lock_session(session);
                *self.observed_loading.lock().unwrap() =
                    Some((st.generation.loading, st.generation.result_visible));
            }
            self.requests.lock().unwrap().push(request.clone());
            (self.reply)()
        }
    }

    fn ok_url() -> Result<GenerationResponse, GenerationError> {
        Ok(GenerationResponse {
            url: Some("https://cdn.example.com/out.png".into()),
        })
    }

    fn no_url() -> Result<GenerationResponse, GenerationError> {
        Ok(GenerationResponse { url: None })
    }

    fn http_500() -> Result<GenerationResponse, GenerationError> {
        Err(GenerationError::Status(500))
    }

    struct Fixture {
        session: SharedSession,
        board: Arc<NoticeBoard>,
        generator: Arc<MockGenerator>,
        workflow: GenerationWorkflow,
    }

    fn fixture(generator: MockGenerator) -> Fixture {
        let session = new_shared_session();
        let board = Arc::new(NoticeBoard::new());
        let generator = Arc::new(generator.watching(&session));
        let workflow = GenerationWorkflow::new(
            Arc::clone(&session),
            generator.clone(),
            board.clone(),
            &GenerationConfig::default(),
        );
        Fixture {
            session,
            board,
            generator,
            workflow,
        }
    }

    fn ready(fx: &Fixture, prompt: &str) {
        let mut st = lock_session(&fx.session);
        st.inputs.on_url_input("https://example.com/car.jpg");
        st.prompt = prompt.into();
    }

    #[test]
    fn suffix_is_appended_only_when_flag_on() {
        assert_eq!(build_prompt("  pintar de azul ", false), "pintar de azul");
        assert_eq!(
            build_prompt("pintar de azul", true),
            format!("pintar de azul{PLATE_OBFUSCATION_SUFFIX}")
        );
    }

    #[tokio::test]
    async fn no_image_means_no_call() {
        let fx = fixture(MockGenerator::new(ok_url));
        lock_session(&fx.session).prompt = "trocar fundo".into();

        assert_eq!(fx.workflow.submit().await, SubmitOutcome::MissingImage);
        assert_eq!(fx.generator.calls(), 0);
        assert_eq!(fx.board.messages(), vec![messages::MISSING_IMAGE.to_string()]);
    }

    #[tokio::test]
    async fn blank_prompt_means_no_call() {
        let fx = fixture(MockGenerator::new(ok_url));
        ready(&fx, "   ");

        assert_eq!(fx.workflow.submit().await, SubmitOutcome::MissingPrompt);
        assert_eq!(fx.generator.calls(), 0);
        assert_eq!(fx.board.messages(), vec![messages::MISSING_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn success_shows_result_and_releases_trigger() {
        let fx = fixture(MockGenerator::new(ok_url));
        ready(&fx, "fundo de showroom");

        let outcome = fx.workflow.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Generated("https://cdn.example.com/out.png".into())
        );

        let sent = fx.generator.requests.lock().unwrap()[0].clone();
        assert_eq!(sent.prompt, "fundo de showroom");
        assert_eq!(sent.image_inputs[0].url, "https://example.com/car.jpg");
        assert_eq!(sent.model_options.quality, Quality::High);

        assert_eq!(*fx.generator.observed_loading.lock().unwrap(), Some((true, false)));

        let st = lock_session(&fx.session);
        assert!(!st.generation.in_flight);
        assert!(!st.generation.loading);
        assert_eq!(st.current_result(), Some("https://cdn.example.com/out.png"));
        assert!(fx.board.is_empty());
    }

    #[tokio::test]
    async fn plate_flag_changes_sent_prompt() {
        let fx = fixture(MockGenerator::new(ok_url));
        ready(&fx, "fundo branco");
        assert!(fx.workflow.toggle_plate_obfuscation());
        fx.board.drain();

        fx.workflow.submit().await;
        let sent = fx.generator.requests.lock().unwrap()[0].prompt.clone();
        assert_eq!(sent, format!("fundo branco{PLATE_OBFUSCATION_SUFFIX}"));
    }

    #[tokio::test]
    async fn missing_url_is_reported() {
        let fx = fixture(MockGenerator::new(no_url));
        ready(&fx, "fundo");

        assert_eq!(fx.workflow.submit().await, SubmitOutcome::NoUrl);
        assert_eq!(fx.board.messages(), vec![messages::GENERATION_NO_URL.to_string()]);
        let st = lock_session(&fx.session);
        assert!(st.current_result().is_none());
        assert!(!st.generation.in_flight);
    }

    #[tokio::test]
    async fn failure_is_reported_and_previous_result_stays_hidden() {
        let fx = fixture(MockGenerator::new(http_500));
        ready(&fx, "fundo");
        {
            let mut st = lock_session(&fx.session);
            st.generation.result = Some(GenerationResult {
                url: "https://cdn.example.com/old.png".into(),
            });
            st.generation.result_visible = true;
        }

        assert_eq!(fx.workflow.submit().await, SubmitOutcome::Failed);
        assert_eq!(fx.board.messages(), vec![messages::GENERATION_ERROR.to_string()]);
        let st = lock_session(&fx.session);
        assert!(st.current_result().is_none());
        assert!(!st.generation.loading);
    }

    #[tokio::test]
    async fn in_flight_submit_is_a_noop() {
        let fx = fixture(MockGenerator::new(ok_url));
        ready(&fx, "fundo");
        lock_session(&fx.session).generation.in_flight = true;

        assert_eq!(fx.workflow.submit().await, SubmitOutcome::Busy);
        assert_eq!(fx.generator.calls(), 0);
        assert!(fx.board.is_empty());
    }

    #[tokio::test]
    async fn unreachable_remote_source_fails_when_inlining() {
        let fx = fixture(MockGenerator::new(ok_url));
        {
            let mut st = lock_session(&fx.session);
            // Nothing listens on port 1; the connection is refused locally.
            st.inputs.on_url_input("http://127.0.0.1:1/x.jpg");
            st.prompt = "fundo".into();
        }
        let workflow = fx.workflow.with_remote_inlining(reqwest::Client::new());

        assert_eq!(workflow.submit().await, SubmitOutcome::Failed);
        assert_eq!(fx.generator.calls(), 0);
        assert_eq!(fx.board.messages(), vec![messages::GENERATION_ERROR.to_string()]);
        let st = lock_session(&fx.session);
        assert!(!st.generation.in_flight);
        assert!(!st.generation.loading);
        assert!(st.current_result().is_none());
    }

    #[tokio::test]
    async fn remote_source_is_sent_unchanged_without_inlining() {
        let fx = fixture(MockGenerator::new(ok_url));
        {
            let mut st = lock_session(&fx.session);
            st.inputs.on_url_input("http://127.0.0.1:1/x.jpg");
            st.prompt = "fundo".into();
        }

        assert!(matches!(fx.workflow.submit().await, SubmitOutcome::Generated(_)));
        let sent = fx.generator.requests.lock().unwrap()[0].clone();
        assert_eq!(sent.image_inputs.len(), 1);
        assert_eq!(sent.image_inputs[0].url, "http://127.0.0.1:1/x.jpg");
    }

    #[test]
    fn toggle_reports_each_mode() {
        let fx = fixture(MockGenerator::new(ok_url));
        assert!(fx.workflow.toggle_plate_obfuscation());
        assert!(!fx.workflow.toggle_plate_obfuscation());
        assert_eq!(
            fx.board.messages(),
            vec![messages::PLATE_ON.to_string(), messages::PLATE_OFF.to_string()]
        );
    }
}
