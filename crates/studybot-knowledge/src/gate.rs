//! Knowledge relevance gate.
//!
//! Decides whether a message may be answered by the external model at all.
//! The gate exists to control cost and hallucination: when the knowledge base
//! has no coverage for a topic, the model is not allowed to answer it
//! confidently and the user gets a fixed out-of-scope reply instead.
//! Small-talk and generic technical questions pass through allowlists.

use tracing::{info, warn};

use crate::client::{KnowledgeClient, SearchResponse};

/// Fixed reply for messages outside the knowledge base's coverage.
pub const OUT_OF_SCOPE_REPLY: &str = "I don't have that in my knowledge.";

/// Default minimum fuzzy-match score for knowledge to count as relevant.
pub const DEFAULT_THRESHOLD: f32 = 65.0;

/// Programming-related terms that may always reach the model.
const TECHNICAL_KEYWORDS: &[&str] = &[
    "programming",
    "code",
    "coding",
    "software",
    "python",
    "java",
    "javascript",
    "sql",
    "database",
    "algorithm",
    "data structure",
    "api",
    "git",
    "docker",
    "kubernetes",
    "cloud",
    "devops",
    "agile",
    "machine learning",
    "testing",
    "debugging",
    "framework",
];

/// Basic conversational messages that may always reach the model.
const BASIC_CONVERSATIONAL: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
    "thanks",
    "thank you",
    "bye",
    "goodbye",
    "see you",
    "who are you",
    "what can you do",
    "help",
];

/// Outcome of the gate decision.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Message is outside coverage; reply with [`OUT_OF_SCOPE_REPLY`] and do
    /// not call the model.
    OutOfScope,
    /// Message may reach the model, optionally with a knowledge context
    /// block for its instruction channel.
    Permitted {
        /// Assembled knowledge text, when relevant documents were found.
        knowledge: Option<String>,
    },
}

/// Whether a message mentions a generic technical topic.
fn is_technical(message: &str) -> bool {
    let lower = message.to_lowercase();
    TECHNICAL_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Whether a message is basic conversation (greeting, thanks, farewell).
fn is_basic_conversational(message: &str) -> bool {
    let lower = message.to_lowercase();
    BASIC_CONVERSATIONAL.iter().any(|k| lower.contains(k))
}

/// Assemble retrieved documents into a context block for the model.
fn assemble_knowledge(response: &SearchResponse) -> String {
    response
        .results
        .iter()
        .map(|hit| format!("{}\n{}", hit.title, hit.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The gate: a knowledge client plus the relevance threshold.
pub struct KnowledgeGate {
    client: KnowledgeClient,
    threshold: f32,
}

impl KnowledgeGate {
    /// Create a gate with the default threshold.
    pub fn new(client: KnowledgeClient) -> Self {
        Self {
            client,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Create a gate with a custom threshold.
    ///
    /// The default is hand-tuned against the current knowledge base; callers
    /// recalibrating after a reindex pass the new value here.
    pub fn with_threshold(client: KnowledgeClient, threshold: f32) -> Self {
        Self { client, threshold }
    }

    /// Query the knowledge base and decide whether the message may be
    /// answered.
    ///
    /// A failed search degrades to "no knowledge" and falls through to the
    /// allowlists (fail-open); it never surfaces as an error.
    pub async fn check(&self, message: &str) -> GateDecision {
        let response = match self.client.search(message).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Knowledge search failed, proceeding without knowledge");
                SearchResponse::empty()
            }
        };

        self.decide(&response, message)
    }

    /// Pure decision over a search outcome and the message text.
    pub fn decide(&self, response: &SearchResponse, message: &str) -> GateDecision {
        if !response.has_knowledge || response.highest_score < self.threshold {
            if is_technical(message) || is_basic_conversational(message) {
                info!(
                    highest_score = response.highest_score,
                    "No relevant knowledge, but message is allowlisted"
                );
                return GateDecision::Permitted { knowledge: None };
            }
            info!(
                highest_score = response.highest_score,
                threshold = self.threshold,
                "Message rejected as out of knowledge"
            );
            return GateDecision::OutOfScope;
        }

        GateDecision::Permitted {
            knowledge: Some(assemble_knowledge(response)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SearchHit;

    fn gate() -> KnowledgeGate {
        KnowledgeGate::new(KnowledgeClient::new("http://localhost:5000"))
    }

    fn response_with_score(score: f32) -> SearchResponse {
        SearchResponse {
            results: vec![SearchHit {
                title: "Course notes".to_string(),
                content: "Some content.".to_string(),
                score,
            }],
            has_knowledge: true,
            highest_score: score,
        }
    }

    #[test]
    fn test_below_threshold_rejected() {
        let decision = gate().decide(&response_with_score(64.0), "what about underwater basket weaving");
        assert_eq!(decision, GateDecision::OutOfScope);
    }

    #[test]
    fn test_at_threshold_permitted_with_knowledge() {
        let decision = gate().decide(&response_with_score(70.0), "what is covered in the notes");
        match decision {
            GateDecision::Permitted { knowledge: Some(k) } => {
                assert!(k.contains("Course notes"));
                assert!(k.contains("Some content."));
            }
            other => panic!("expected permitted with knowledge, got {:?}", other),
        }
    }

    #[test]
    fn test_no_knowledge_technical_allowlisted() {
        let decision = gate().decide(&SearchResponse::empty(), "how do I debug python code");
        assert_eq!(decision, GateDecision::Permitted { knowledge: None });
    }

    #[test]
    fn test_no_knowledge_basic_allowlisted() {
        let decision = gate().decide(&SearchResponse::empty(), "hello, who are you");
        assert_eq!(decision, GateDecision::Permitted { knowledge: None });
    }

    #[test]
    fn test_no_knowledge_other_rejected() {
        let decision = gate().decide(&SearchResponse::empty(), "favourite pizza topping");
        assert_eq!(decision, GateDecision::OutOfScope);
    }

    #[test]
    fn test_custom_threshold() {
        let gate = KnowledgeGate::with_threshold(
            KnowledgeClient::new("http://localhost:5000"),
            50.0,
        );
        match gate.decide(&response_with_score(55.0), "anything at all really") {
            GateDecision::Permitted { knowledge: Some(_) } => {}
            other => panic!("expected permitted, got {:?}", other),
        }
    }

    #[test]
    fn test_knowledge_assembled_with_separators() {
        let response = SearchResponse {
            results: vec![
                SearchHit {
                    title: "Doc A".to_string(),
                    content: "Alpha.".to_string(),
                    score: 80.0,
                },
                SearchHit {
                    title: "Doc B".to_string(),
                    content: "Beta.".to_string(),
                    score: 72.0,
                },
            ],
            has_knowledge: true,
            highest_score: 80.0,
        };

        match gate().decide(&response, "tell me everything in the notes") {
            GateDecision::Permitted { knowledge: Some(k) } => {
                assert_eq!(k, "Doc A\nAlpha.\n\nDoc B\nBeta.");
            }
            other => panic!("expected permitted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_check_fails_open_to_allowlists() {
        // Unreachable service: technical message still permitted, without
        // knowledge context.
        let gate = KnowledgeGate::new(KnowledgeClient::new("http://127.0.0.1:1"));
        let decision = gate.check("how does git branching work").await;
        assert_eq!(decision, GateDecision::Permitted { knowledge: None });
    }

    #[test]
    fn test_out_of_scope_reply_text() {
        assert_eq!(OUT_OF_SCOPE_REPLY, "I don't have that in my knowledge.");
    }
}
