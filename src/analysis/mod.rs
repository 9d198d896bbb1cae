//! Analysis client
//!
//! The vision service is an opaque remote function: it receives one
//! embedded photo and either returns a fully shaped `AnalysisResult` or
//! fails. `CatAnalyzer` is the seam; `GeminiAnalyzer` is the production
//! adapter.

pub mod gemini;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use gemini::GeminiAnalyzer;

use crate::state::data::AnalysisResult;

/// Analysis client errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("API key is missing. Set GEMINI_API_KEY.")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("No response from the vision service")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait CatAnalyzer: Send + Sync {
    /// Describe the cat in an embedded image. Single attempt, no retry.
    async fn analyze(&self, image: &str) -> Result<AnalysisResult, AnalysisError>;
}

/// Run one analysis, optionally bounded by a caller-imposed timeout
pub async fn run_analysis(
    analyzer: Arc<dyn CatAnalyzer>,
    image: String,
    timeout: Option<Duration>,
) -> Result<AnalysisResult, AnalysisError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, analyzer.analyze(&image))
            .await
            .map_err(|_| AnalysisError::Timeout(limit))?,
        None => analyzer.analyze(&image).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowAnalyzer;

    #[async_trait]
    impl CatAnalyzer for SlowAnalyzer {
        async fn analyze(&self, _image: &str) -> Result<AnalysisResult, AnalysisError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(AnalysisResult::default())
        }
    }

    struct InstantAnalyzer;

    #[async_trait]
    impl CatAnalyzer for InstantAnalyzer {
        async fn analyze(&self, image: &str) -> Result<AnalysisResult, AnalysisError> {
            Ok(AnalysisResult {
                features: image.to_string(),
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let limit = Duration::from_millis(10);
        let result = run_analysis(Arc::new(SlowAnalyzer), "img".to_string(), Some(limit)).await;
        assert_eq!(result, Err(AnalysisError::Timeout(limit)));
    }

    #[tokio::test]
    async fn test_without_timeout_result_passes_through() {
        let result = run_analysis(Arc::new(InstantAnalyzer), "img".to_string(), None)
            .await
            .unwrap();
        assert_eq!(result.features, "img");
    }
}
