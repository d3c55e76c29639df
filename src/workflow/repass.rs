//! Remote Structuring Workflow ("repasse").
//!
//! Turns a dictated vehicle description into a formatted listing.  The
//! waiting placeholder stays up for at least [`MIN_VISIBLE`], so a fast
//! answer does not flash past the user.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::llm::{listing, ChatCompleter, LlmError};
use crate::notify::messages;
use crate::session::{lock_session, SharedSession};

/// Minimum time between showing the placeholder and the final text.
pub const MIN_VISIBLE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepassOutcome {
    /// A structuring request was already running.
    Busy,
    /// The rendered listing now shown.
    Structured(String),
    /// The retry message is shown instead.
    Failed,
}

pub struct RepassWorkflow {
    session: SharedSession,
    completer: Arc<dyn ChatCompleter>,
    min_visible: Duration,
}

impl RepassWorkflow {
    pub fn new(session: SharedSession, completer: Arc<dyn ChatCompleter>) -> Self {
        Self {
            session,
            completer,
            min_visible: MIN_VISIBLE,
        }
    }

    /// Override the placeholder floor.
    pub fn with_min_visible(mut self, min_visible: Duration) -> Self {
        self.min_visible = min_visible;
        self
    }

    pub async fn structure(&self, transcript: &str) -> RepassOutcome {
        {
            let mut st = lock_session(&self.session);
            if st.repass.busy {
                return RepassOutcome::Busy;
            }
            st.repass.busy = true;
            st.repass.visible = true;
            st.repass.text = messages::repass_waiting(transcript);
        }
        let _busy = BusyGuard(&self.session);
        let started = Instant::now();
        log::debug!("repass: structuring {} chars", transcript.len());

        let rendered = self.request_listing(transcript).await;
        let (text, outcome) = match rendered {
            Ok(text) => (text.clone(), RepassOutcome::Structured(text)),
            Err(e) => {
                log::error!("repass: listing generation failed: {e}");
                (messages::REPASS_RETRY.to_string(), RepassOutcome::Failed)
            }
        };

        let elapsed = started.elapsed();
        if elapsed < self.min_visible {
            tokio::time::sleep(self.min_visible - elapsed).await;
        }

        lock_session(&self.session).repass.text = text;
        outcome
    }

    async fn request_listing(&self, transcript: &str) -> Result<String, LlmError> {
        let content = self.completer.complete(&listing::request(transcript)).await?;
        let draft = listing::parse(&content)?;
        Ok(draft.render())
    }
}

/// Clears the busy flag after the final text, or on cancellation.
struct BusyGuard<'a>(&'a SharedSession);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        lock_session(self.0).repass.busy = false;
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
    use crate::llm::CompletionRequest;
    use crate::session::new_shared_session;

    const LISTING: &str = r#"{
        "titulo": "Gol econômico",
        "modelo_ano": "VW Gol 2015",
        "descricao_sumario": "Ótimo para o dia a dia",
        "lista_detalhes": ["Ar condicionado", "Direção hidráulica", "IPVA pago", "Revisado", "Pneus novos"],
        "preco": "A consultar",
        "contato": "Ligue já"
    }"#;

    struct MockCompleter {
        reply: Result<&'static str, ()>,
        requests: Mutex<Vec<CompletionRequest>>,
        placeholder_seen: Mutex<Option<String>>,
        session: SharedSession,
    }

    #[async_trait]
    impl ChatCompleter for MockCompleter {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            *self.placeholder_seen.lock().unwrap() =
                Some(lock_session(&self.session).repass.text.clone());
            match self.reply {
                Ok(content) => Ok(content.to_string()),
                Err(()) => Err(LlmError::Timeout),
            }
        }
    }

    fn workflow(
        reply: Result<&'static str, ()>,
        min_visible: Duration,
    ) -> (RepassWorkflow, Arc<MockCompleter>, SharedSession) {
        let session = new_shared_session();
        let completer = Arc::new(MockCompleter {
            reply,
            requests: Mutex::new(Vec::new()),
            placeholder_seen: Mutex::new(None),
            session: Arc::clone(&session),
        });
        let wf = RepassWorkflow::new(Arc::clone(&session), completer.clone())
            .with_min_visible(min_visible);
        (wf, completer, session)
    }

    #[tokio::test]
    async fn valid_listing_is_rendered() {
        let (wf, completer, session) = workflow(Ok(LISTING), Duration::ZERO);

        let text = match wf.structure("gol 2015 branco").await {
            RepassOutcome::Structured(text) => text,
            other => panic!("expected Structured, got {other:?}"),
        };
        assert!(text.starts_with("--- Gol econômico ---"));
        assert!(text.contains("- IPVA pago\n- Revisado"));

        let st = lock_session(&session);
        assert_eq!(st.repass.text, text);
        assert!(st.repass.visible);
        assert!(!st.repass.busy);

        assert_eq!(
            completer.placeholder_seen.lock().unwrap().as_deref(),
            Some("Aguardando análise da AI sobre: \"gol 2015 branco\"...")
        );
        let requests = completer.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages[1].content, "Detalhes ditados: gol 2015 branco");
    }

    #[tokio::test]
    async fn invalid_json_shows_retry_after_floor() {
        let (wf, _, session) = workflow(Ok("não é json"), MIN_VISIBLE);

        let started = std::time::Instant::now();
        assert_eq!(wf.structure("qualquer coisa").await, RepassOutcome::Failed);
        assert!(started.elapsed() >= MIN_VISIBLE);

        let st = lock_session(&session);
        assert_eq!(st.repass.text, messages::REPASS_RETRY);
        assert!(!st.repass.busy);
    }

    #[tokio::test]
    async fn call_failure_shows_retry() {
        let (wf, _, session) = workflow(Err(()), Duration::from_millis(20));
        let started = std::time::Instant::now();
        assert_eq!(wf.structure("x").await, RepassOutcome::Failed);
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(lock_session(&session).repass.text, messages::REPASS_RETRY);
    }

    #[tokio::test]
    async fn busy_workflow_refuses_reentry() {
        let (wf, completer, session) = workflow(Ok(LISTING), Duration::ZERO);
        lock_session(&session).repass.busy = true;

        assert_eq!(wf.structure("x").await, RepassOutcome::Busy);
        assert!(completer.requests.lock().unwrap().is_empty());
    }
}
