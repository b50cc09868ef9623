// The conversation session: an append-only message list plus the submit
// lifecycle. One session per chat surface; nothing here persists.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::catalog::{Catalog, RecommendedItem};
use crate::config::{PersonaConfig, APOLOGY_REPLY};
use crate::provider::{ChatRole, ChatTurn, CompletionProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One exchanged message. Immutable once appended; ids are strictly
/// increasing within a session, starting at 1 with the seeded greeting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub recommendations: Vec<RecommendedItem>,
}

/// What a submit attempt did. Rejections are silent: no message is appended
/// and the session is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// User message and assistant reply (or apology) were appended.
    Completed,
    /// Empty or whitespace-only input.
    RejectedEmpty,
    /// A completion request is already in flight.
    RejectedBusy,
    /// The one-shot handoff already ran.
    AlreadyBootstrapped,
}

// Everything a turn mutates, behind one lock. The lock is only ever held for
// synchronous bookkeeping, never across the provider await.
struct SessionState {
    messages: Vec<Message>,
    next_id: u64,
    busy: bool,
    bootstrapped: bool,
}

impl SessionState {
    fn append(&mut self, sender: Sender, text: String, recommendations: Vec<RecommendedItem>) {
        self.messages.push(Message {
            id: self.next_id,
            sender,
            text,
            timestamp: Utc::now(),
            recommendations,
        });
        self.next_id += 1;
    }

    fn history_turns(&self, end: usize) -> Vec<ChatTurn> {
        self.messages[1..end]
            .iter()
            .map(|msg| {
                ChatTurn::new(
                    match msg.sender {
                        Sender::User => ChatRole::User,
                        Sender::Assistant => ChatRole::Assistant,
                    },
                    msg.text.clone(),
                )
            })
            .collect()
    }
}

/// Cheaply cloneable handle; clones share the same message list and busy
/// flag, so one clone can render snapshots while another runs a turn.
#[derive(Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    persona: Arc<PersonaConfig>,
    catalog: Arc<Catalog>,
    provider: Arc<dyn CompletionProvider>,
    recommend_cap: usize,
}

impl Session {
    /// Creates a session with the persona greeting seeded as message 1. The
    /// greeting is display-only and never forwarded to the provider.
    pub fn new(
        persona: Arc<PersonaConfig>,
        catalog: Arc<Catalog>,
        provider: Arc<dyn CompletionProvider>,
        recommend_cap: usize,
    ) -> Self {
        let mut state = SessionState {
            messages: Vec::new(),
            next_id: 1,
            busy: false,
            bootstrapped: false,
        };
        state.append(Sender::Assistant, persona.greeting.clone(), Vec::new());
        Session {
            state: Arc::new(Mutex::new(state)),
            persona,
            catalog,
            provider,
            recommend_cap,
        }
    }

    /// Immutable snapshot of the message list, in display order.
    pub fn messages(&self) -> Vec<Message> {
        self.lock_state().messages.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock_state().busy
    }

    pub fn persona(&self) -> &PersonaConfig {
        &self.persona
    }

    /// Submits one user utterance: immediate local append, one provider
    /// call, then the reply (or the fixed apology) appended. Provider
    /// failures never escape; they are logged and degraded to the apology.
    ///
    /// The provider call runs in its own task, so the turn settles even if
    /// this future is dropped mid-await (a disconnected client); the
    /// dropped observer simply never sees the settlement.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let trimmed = text.trim().to_string();
        if trimmed.is_empty() {
            return SubmitOutcome::RejectedEmpty;
        }

        let recommendations = self.catalog.recommend(&trimmed, self.recommend_cap);

        // Claim the busy flag and append the user message in one critical
        // section, so concurrent submits cannot interleave. The UI disables
        // input while busy; this is the same invariant enforced at the
        // source of truth.
        let history = {
            let mut state = self.lock_state();
            if state.busy {
                warn!("Submission rejected: completion request already in flight");
                return SubmitOutcome::RejectedBusy;
            }
            state.busy = true;
            debug!(
                matched = recommendations.len(),
                "Appending user message and dispatching completion request"
            );
            state.append(Sender::User, trimmed.clone(), recommendations.clone());
            // History stops before the message just appended: the provider
            // receives the new utterance separately, and the greeting (id 1)
            // is never forwarded.
            state.history_turns(state.messages.len() - 1)
        };

        let provider = Arc::clone(&self.provider);
        let state = Arc::clone(&self.state);
        let turn = tokio::spawn(async move {
            let reply = provider.complete(&history, &trimmed).await;
            let mut state = state.lock().expect("session state lock poisoned");
            match reply {
                Ok(reply_text) => {
                    // The assistant reply carries the same annotations as
                    // the user message that triggered it.
                    state.append(Sender::Assistant, reply_text, recommendations);
                }
                Err(e) => {
                    error!(error = %e, "Completion request failed; substituting apology reply");
                    state.append(Sender::Assistant, APOLOGY_REPLY.to_string(), Vec::new());
                }
            }
            state.busy = false;
        });

        let _ = turn.await;
        SubmitOutcome::Completed
    }

    /// Runs `submit` for a message carried over from the onboarding flow.
    /// One-shot: a second invocation (a re-rendered surface firing its
    /// trigger twice) appends nothing.
    pub async fn bootstrap_from_handoff(&self, text: &str) -> SubmitOutcome {
        {
            let mut state = self.lock_state();
            if state.bootstrapped {
                debug!("Ignoring duplicate handoff bootstrap");
                return SubmitOutcome::AlreadyBootstrapped;
            }
            state.bootstrapped = true;
        }
        self.submit(text).await
    }

    /// Everything after the greeting, role-tagged and oldest first, as it
    /// would be forwarded on the next submit.
    pub fn forwarded_history(&self) -> Vec<ChatTurn> {
        let state = self.lock_state();
        state.history_turns(state.messages.len())
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::provider::ProviderError;
    use async_trait::async_trait;

    struct EchoProvider;

    #[async_trait]
    impl CompletionProvider for EchoProvider {
        async fn complete(
            &self,
            _history: &[ChatTurn],
            user_message: &str,
        ) -> Result<String, ProviderError> {
            Ok(format!("echo: {}", user_message))
        }
    }

    fn session() -> Session {
        Session::new(
            Arc::new(PersonaConfig::default()),
            Arc::new(default_catalog()),
            Arc::new(EchoProvider),
            3,
        )
    }

    #[test]
    fn test_new_session_seeds_greeting() {
        let session = session();
        let messages = session.messages();
        assert_eq!(messages.len(), 1);
        let greeting = &messages[0];
        assert_eq!(greeting.id, 1);
        assert_eq!(greeting.sender, Sender::Assistant);
        assert!(greeting.text.contains("Dr. Helio"));
        assert!(greeting.recommendations.is_empty());
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_greeting_excluded_from_forwarded_history() {
        let session = session();
        session.submit("I have a headache").await;
        let history = session.forwarded_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[0].content, "I have a headache");
        assert_eq!(history[1].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn test_ids_strictly_increasing() {
        let session = session();
        session.submit("one").await;
        session.submit("two").await;
        let ids: Vec<u64> = session.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_submit_trims_input() {
        let session = session();
        session.submit("  spaced out  ").await;
        assert_eq!(session.messages()[1].text, "spaced out");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let session = session();
        let view = session.clone();
        session.submit("hello").await;
        assert_eq!(view.messages().len(), 3);
    }
}
