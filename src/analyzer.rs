//! Remote script analysis with a local fallback.
//!
//! The analyzer asks a generative model to break a speech text into
//! teleprompter chunks with per-chunk duration estimates, a total duration,
//! and a one-sentence summary. Any analyzer failure degrades to the
//! deterministic local [`Chunker`], so a missing API key or a network outage
//! never blocks a session.

use crate::error::{ErrorReporter, PrompterError, Result};
use crate::script::{Chunker, Script, ScriptChunk};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A fully analyzed script: chunks plus presentation metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub script: Script,
    pub total_duration_sec: f64,
    pub summary: String,
}

impl Analysis {
    /// Builds an analysis from locally chunked output. The summary is the
    /// script's own leading-chunks digest.
    pub fn from_script(script: Script) -> Self {
        let total_duration_sec = script.total_duration_ms() as f64 / 1000.0;
        let summary = script.summary();
        Self {
            script,
            total_duration_sec,
            summary,
        }
    }
}

/// Contract for the external analysis service.
#[async_trait]
pub trait ScriptAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Analysis>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "analyzer"
    }
}

/// Analyze `text` remotely, falling back to the local chunker.
///
/// Analyzer errors are reported, not propagated; only a text the chunker
/// itself rejects (too short, no words) fails.
pub async fn analyze_or_chunk(
    analyzer: &dyn ScriptAnalyzer,
    chunker: &Chunker,
    text: &str,
    reporter: &dyn ErrorReporter,
) -> Result<Analysis> {
    match analyzer.analyze(text).await {
        Ok(analysis) => Ok(analysis),
        Err(e) => {
            reporter.report(analyzer.name(), &e);
            Ok(Analysis::from_script(chunker.chunk(text)?))
        }
    }
}

// Wire shape of the analyzer response, shared with the remote schema.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAnalysis {
    chunks: Vec<WireChunk>,
    total_duration_sec: f64,
    summary: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireChunk {
    text: String,
    suggested_duration_ms: u64,
}

/// Parses the analyzer's JSON payload into an [`Analysis`].
///
/// Rejects payloads with no chunks or with chunks the script model itself
/// would not accept (empty text, zero duration).
pub fn parse_analyzer_response(json: &str) -> Result<Analysis> {
    let wire: WireAnalysis = serde_json::from_str(json).map_err(|e| PrompterError::Analyzer {
        message: format!("malformed analyzer response: {e}"),
    })?;

    let chunks: Vec<ScriptChunk> = wire
        .chunks
        .into_iter()
        .map(|c| ScriptChunk::new(c.text, c.suggested_duration_ms))
        .collect::<Result<_>>()
        .map_err(|e| PrompterError::Analyzer {
            message: format!("analyzer returned an invalid chunk: {e}"),
        })?;

    let script = Script::from_chunks(chunks).map_err(|_| PrompterError::Analyzer {
        message: "analyzer returned no chunks".to_string(),
    })?;

    Ok(Analysis {
        script,
        total_duration_sec: wire.total_duration_sec,
        summary: wire.summary,
    })
}

#[cfg(feature = "analyzer")]
pub use remote::GeminiAnalyzer;

#[cfg(feature = "analyzer")]
mod remote {
    use super::{Analysis, ScriptAnalyzer, parse_analyzer_response};
    use crate::defaults;
    use crate::error::{PrompterError, Result};
    use async_trait::async_trait;
    use serde::Serialize;
    use serde_json::json;

    const GENERATE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

    #[derive(Debug, Serialize)]
    struct GenerateRequest {
        contents: Vec<Content>,
        #[serde(rename = "generationConfig")]
        generation_config: GenerationConfig,
    }

    #[derive(Debug, Serialize)]
    struct Content {
        parts: Vec<Part>,
    }

    #[derive(Debug, Serialize)]
    struct Part {
        text: String,
    }

    #[derive(Debug, Serialize)]
    struct GenerationConfig {
        #[serde(rename = "responseMimeType")]
        response_mime_type: String,
        #[serde(rename = "responseSchema")]
        response_schema: serde_json::Value,
    }

    #[derive(Debug, serde::Deserialize)]
    struct GenerateResponse {
        candidates: Option<Vec<Candidate>>,
    }

    #[derive(Debug, serde::Deserialize)]
    struct Candidate {
        content: CandidateContent,
    }

    #[derive(Debug, serde::Deserialize)]
    struct CandidateContent {
        parts: Vec<CandidatePart>,
    }

    #[derive(Debug, serde::Deserialize)]
    struct CandidatePart {
        text: String,
    }

    /// Remote analyzer backed by the Gemini `generateContent` endpoint.
    pub struct GeminiAnalyzer {
        api_key: String,
        model: String,
        client: reqwest::Client,
    }

    impl GeminiAnalyzer {
        pub fn new(api_key: impl Into<String>) -> Self {
            Self {
                api_key: api_key.into(),
                model: defaults::ANALYZER_MODEL.to_string(),
                client: reqwest::Client::new(),
            }
        }

        pub fn with_model(mut self, model: impl Into<String>) -> Self {
            self.model = model.into();
            self
        }

        fn request_body(text: &str) -> GenerateRequest {
            let prompt = format!(
                "Analyze the following speech text.\n\
                 1. Break it into natural, readable chunks (short phrases, max 8-12 words) \
                 suitable for a teleprompter screen. Ensure no chunk is too long to fit on a \
                 single screen.\n\
                 2. Estimate the natural reading duration in milliseconds for EACH chunk, \
                 assuming a moderate, clear speaking pace (approx 130-150 wpm).\n\
                 3. Provide a total estimated duration in seconds.\n\
                 4. Provide a very brief 1-sentence summary of the speech.\n\n\
                 Speech Text:\n\"{text}\""
            );
            GenerateRequest {
                contents: vec![Content {
                    parts: vec![Part { text: prompt }],
                }],
                generation_config: GenerationConfig {
                    response_mime_type: "application/json".to_string(),
                    response_schema: json!({
                        "type": "OBJECT",
                        "properties": {
                            "chunks": {
                                "type": "ARRAY",
                                "items": {
                                    "type": "OBJECT",
                                    "properties": {
                                        "text": { "type": "STRING" },
                                        "suggestedDurationMs": { "type": "INTEGER" }
                                    },
                                    "required": ["text", "suggestedDurationMs"]
                                }
                            },
                            "totalDurationSec": { "type": "NUMBER" },
                            "summary": { "type": "STRING" }
                        },
                        "required": ["chunks", "totalDurationSec", "summary"]
                    }),
                },
            }
        }
    }

    #[async_trait]
    impl ScriptAnalyzer for GeminiAnalyzer {
        async fn analyze(&self, text: &str) -> Result<Analysis> {
            if self.api_key.is_empty() {
                return Err(PrompterError::Analyzer {
                    message: "no API key configured".to_string(),
                });
            }

            let url = format!(
                "{GENERATE_URL}/{}:generateContent?key={}",
                self.model, self.api_key
            );
            let response = self
                .client
                .post(&url)
                .json(&Self::request_body(text))
                .send()
                .await
                .map_err(|e| PrompterError::Analyzer {
                    message: format!("request failed: {e}"),
                })?;

            if !response.status().is_success() {
                return Err(PrompterError::Analyzer {
                    message: format!("service returned status {}", response.status()),
                });
            }

            let body: GenerateResponse =
                response.json().await.map_err(|e| PrompterError::Analyzer {
                    message: format!("unreadable response: {e}"),
                })?;

            let payload = body
                .candidates
                .and_then(|candidates| candidates.into_iter().next())
                .and_then(|candidate| candidate.content.parts.into_iter().next())
                .map(|part| part.text)
                .ok_or_else(|| PrompterError::Analyzer {
                    message: "empty response".to_string(),
                })?;

            parse_analyzer_response(&payload)
        }

        fn name(&self) -> &'static str {
            "gemini"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_request_body_carries_text_and_schema() {
            let body = GeminiAnalyzer::request_body("hello world");
            let value = serde_json::to_value(&body).unwrap();
            let prompt = value["contents"][0]["parts"][0]["text"].as_str().unwrap();
            assert!(prompt.contains("hello world"));
            assert_eq!(
                value["generationConfig"]["responseMimeType"],
                "application/json"
            );
            let required = &value["generationConfig"]["responseSchema"]["required"];
            assert_eq!(required[0], "chunks");
        }

        #[tokio::test]
        async fn test_missing_api_key_is_an_analyzer_error() {
            let analyzer = GeminiAnalyzer::new("");
            let result = analyzer.analyze("some speech").await;
            assert!(matches!(result, Err(PrompterError::Analyzer { .. })));
        }
    }
}

/// Scripted analyzer for tests and offline rehearsal.
pub struct MockAnalyzer {
    outcome: std::result::Result<Analysis, String>,
}

impl MockAnalyzer {
    /// Always returns the given analysis.
    pub fn succeeding(analysis: Analysis) -> Self {
        Self {
            outcome: Ok(analysis),
        }
    }

    /// Always fails with an analyzer error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
        }
    }
}

#[async_trait]
impl ScriptAnalyzer for MockAnalyzer {
    async fn analyze(&self, _text: &str) -> Result<Analysis> {
        match &self.outcome {
            Ok(analysis) => Ok(analysis.clone()),
            Err(message) => Err(PrompterError::Analyzer {
                message: message.clone(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
