//! Intent resolution: the one call between a user message and its reply.
//!
//! `resolve` is total: any NLU failure is logged and collapsed into a fixed
//! fallback string, so the caller always has exactly one reply text to send.

use crate::nlu::DialogflowClient;

/// Reply used whenever the NLU service cannot produce one.
pub const FALLBACK_TEXT: &str = "Сейчас не могу ответить. Попробуйте позже.";

/// Total adapter over the NLU client.
#[derive(Clone)]
pub struct IntentResolver {
    client: DialogflowClient,
}

impl IntentResolver {
    pub fn new(client: DialogflowClient) -> Self {
        Self { client }
    }

    /// Resolve user text to a reply. The NLU session is keyed by `user_id`, so repeated
    /// messages from the same user share conversational context. Never errors: failures
    /// go to the log and the fixed fallback comes back instead.
    pub async fn resolve(&self, text: &str, user_id: i64) -> String {
        let session_id = user_id.to_string();
        match self.client.detect_intent(text, &session_id).await {
            Ok(fulfillment) => fulfillment,
            Err(e) => {
                log::warn!("dialogflow detect_intent failed: {}", e);
                FALLBACK_TEXT.to_string()
            }
        }
    }
}
