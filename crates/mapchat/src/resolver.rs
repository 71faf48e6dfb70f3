//! Region resolution: extraction, embedding, similarity search, and
//! disambiguation.
//!
//! The only fatal outcomes here are upstream service failures and an
//! extraction response that is not a region object. Everything else that can
//! go wrong (empty index, rejected candidates, malformed disambiguation
//! replies) resolves to the "not found" sentinel so the conversation loop can
//! tell the user gracefully.

use anyhow::Result;
use regex::Regex;
use serde_json::json;

use crate::embedding::Embedder;
use crate::errors::ResolveError;
use crate::index::{IndexMatch, SimilarityIndex};
use crate::models::message::Message;
use crate::models::region::{RegionCandidate, RegionInfo};
use crate::prompts;
use crate::providers::base::Provider;
use crate::providers::utils::messages_to_wire;

/// How many nearest neighbors the disambiguation step chooses between.
pub const DEFAULT_TOP_K: usize = 3;

/// Outcome of parsing the disambiguation response. The call site must handle
/// each variant explicitly; out-of-range indices are handled there because
/// the parser does not know the candidate count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Selected(usize),
    NoMatch,
    Unparseable,
}

impl Selection {
    /// Strict parser for the canonical `<index>N</index>` / `null` contract.
    /// Anything else is `Unparseable`, which callers treat as "no match"
    /// rather than an error.
    pub fn parse(text: &str) -> Selection {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("<index>null</index>")
        {
            return Selection::NoMatch;
        }

        // unwrap: pattern is a compile-time constant
        let tag = Regex::new(r"<index>\s*(\d+)\s*</index>").unwrap();
        match tag.captures(trimmed) {
            Some(captures) => match captures[1].parse::<usize>() {
                Ok(index) => Selection::Selected(index),
                Err(_) => Selection::Unparseable,
            },
            None => Selection::Unparseable,
        }
    }
}

pub struct RegionResolver {
    provider: Box<dyn Provider>,
    embedder: Box<dyn Embedder>,
    index: Box<dyn SimilarityIndex>,
    top_k: usize,
}

impl RegionResolver {
    pub fn new(
        provider: Box<dyn Provider>,
        embedder: Box<dyn Embedder>,
        index: Box<dyn SimilarityIndex>,
    ) -> Self {
        Self {
            provider,
            embedder,
            index,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Resolve the conversation context to a region record, or the sentinel.
    pub async fn resolve(&self, messages: &[Message]) -> Result<RegionInfo> {
        let candidate_text = self.extract_candidate(messages).await?;

        let embedding = self.embedder.embed(&candidate_text).await?;
        let matches = self.index.query(&embedding, self.top_k).await?;
        if matches.is_empty() {
            tracing::debug!("similarity index returned no candidates");
            return Ok(RegionInfo::not_found());
        }

        self.disambiguate(messages, &candidate_text, &matches).await
    }

    /// LLM extraction of a `{region, subregions}` candidate. The whole
    /// conversation is passed as one serialized user message. A response that
    /// does not parse as the candidate object fails the request.
    async fn extract_candidate(&self, messages: &[Message]) -> Result<String> {
        let context = Message::user().with_text(serde_json::to_string(&messages_to_wire(
            messages,
        ))?);
        let (response, _) = self
            .provider
            .complete(prompts::EXTRACTION_SYSTEM, &[context], &[])
            .await?;

        let text = response.text();
        let candidate: RegionCandidate = serde_json::from_str(text.trim())
            .map_err(|_| ResolveError::MalformedExtraction(text.clone()))?;
        tracing::debug!(region = %candidate.region, "extracted region candidate");

        // Embed the canonical serialization so formatting quirks in the
        // model's output don't move the query vector.
        Ok(serde_json::to_string(&candidate)?)
    }

    /// Second LLM call: choose among the top-K candidates or reject them all.
    async fn disambiguate(
        &self,
        messages: &[Message],
        query: &str,
        matches: &[IndexMatch],
    ) -> Result<RegionInfo> {
        let options: Vec<_> = matches
            .iter()
            .map(|hit| json!({"score": hit.score, "metadata": hit.metadata}))
            .collect();
        let system = prompts::disambiguation_system(query, &serde_json::to_string(&options)?);

        let context = Message::user().with_text(serde_json::to_string(&messages_to_wire(
            messages,
        ))?);
        let (response, _) = self.provider.complete(&system, &[context], &[]).await?;

        let resolved = match Selection::parse(&response.text()) {
            Selection::Selected(index) if index < matches.len() => {
                matches[index].metadata.clone()
            }
            Selection::Selected(index) => {
                tracing::warn!(index, candidates = matches.len(), "selection out of range");
                RegionInfo::not_found()
            }
            Selection::NoMatch => RegionInfo::not_found(),
            Selection::Unparseable => {
                tracing::warn!(text = %response.text(), "unparseable selection response");
                RegionInfo::not_found()
            }
        };

        tracing::info!(region = %resolved.region, "region resolution complete");
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::Value;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.1, 0.2, 0.3])
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(anyhow!("embedding service unavailable"))
        }
    }

    struct StaticIndex {
        matches: Vec<IndexMatch>,
    }

    #[async_trait]
    impl SimilarityIndex for StaticIndex {
        async fn query(&self, _vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>> {
            Ok(self.matches.iter().take(top_k).cloned().collect())
        }
    }

    fn match_for(region: &str, subregions: &[&str]) -> IndexMatch {
        IndexMatch {
            score: 0.9,
            metadata: RegionInfo::new(
                region,
                subregions.iter().map(|s| s.to_string()).collect(),
            ),
        }
    }

    fn extraction_response(region: &str) -> Message {
        Message::assistant().with_text(format!(
            "{{\"region\": \"{}\", \"subregions\": [\"A\", \"B\"]}}",
            region
        ))
    }

    fn user_query() -> Vec<Message> {
        vec![Message::user().with_text("Show me population by county in Chicago")]
    }

    fn resolver_with(
        responses: Vec<Message>,
        matches: Vec<IndexMatch>,
    ) -> RegionResolver {
        RegionResolver::new(
            Box::new(MockProvider::new(responses)),
            Box::new(FixedEmbedder),
            Box::new(StaticIndex { matches }),
        )
    }

    #[test]
    fn selection_parses_tagged_index() {
        assert_eq!(Selection::parse("<index>2</index>"), Selection::Selected(2));
        assert_eq!(
            Selection::parse("  <index> 0 </index>\n"),
            Selection::Selected(0)
        );
    }

    #[test]
    fn selection_treats_null_as_no_match() {
        assert_eq!(Selection::parse("null"), Selection::NoMatch);
        assert_eq!(Selection::parse("NULL"), Selection::NoMatch);
        assert_eq!(Selection::parse("<index>null</index>"), Selection::NoMatch);
    }

    #[test]
    fn selection_rejects_everything_else() {
        assert_eq!(Selection::parse("2"), Selection::Unparseable);
        assert_eq!(Selection::parse("the second one"), Selection::Unparseable);
        assert_eq!(Selection::parse("<index>-1</index>"), Selection::Unparseable);
        assert_eq!(Selection::parse(""), Selection::Unparseable);
    }

    #[tokio::test]
    async fn resolves_selected_candidate_unmodified() -> Result<()> {
        let mut metadata = RegionInfo::new(
            "Chicago",
            vec!["Cook County".to_string(), "DuPage County".to_string()],
        );
        metadata
            .extra
            .insert("source".to_string(), Value::String("census".to_string()));
        let matches = vec![
            match_for("Milwaukee", &["Milwaukee County"]),
            IndexMatch {
                score: 0.95,
                metadata: metadata.clone(),
            },
        ];

        let resolver = resolver_with(
            vec![
                extraction_response("Chicago"),
                Message::assistant().with_text("<index>1</index>"),
            ],
            matches,
        );

        let resolved = resolver.resolve(&user_query()).await?;
        assert_eq!(resolved, metadata);
        Ok(())
    }

    #[tokio::test]
    async fn null_selection_resolves_to_sentinel() -> Result<()> {
        let resolver = resolver_with(
            vec![
                extraction_response("Atlantis"),
                Message::assistant().with_text("null"),
            ],
            vec![match_for("Chicago", &["Cook County"])],
        );

        let resolved = resolver.resolve(&user_query()).await?;
        assert_eq!(resolved, RegionInfo::not_found());
        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_selection_resolves_to_sentinel() -> Result<()> {
        let resolver = resolver_with(
            vec![
                extraction_response("Chicago"),
                Message::assistant().with_text("<index>5</index>"),
            ],
            vec![
                match_for("Chicago", &["Cook County"]),
                match_for("Milwaukee", &["Milwaukee County"]),
            ],
        );

        let resolved = resolver.resolve(&user_query()).await?;
        assert_eq!(resolved, RegionInfo::not_found());
        Ok(())
    }

    #[tokio::test]
    async fn empty_index_resolves_to_sentinel() -> Result<()> {
        // Only the extraction response is scripted; with no candidates the
        // disambiguation call must never happen.
        let resolver = resolver_with(vec![extraction_response("Chicago")], Vec::new());

        let resolved = resolver.resolve(&user_query()).await?;
        assert_eq!(resolved, RegionInfo::not_found());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_extraction_is_fatal() {
        let resolver = resolver_with(
            vec![Message::assistant().with_text("I think you mean Chicago!")],
            vec![match_for("Chicago", &["Cook County"])],
        );

        let error = resolver.resolve(&user_query()).await.unwrap_err();
        assert!(error.downcast_ref::<ResolveError>().is_some());
    }

    #[tokio::test]
    async fn embedding_failure_is_fatal() {
        let resolver = RegionResolver::new(
            Box::new(MockProvider::new(vec![extraction_response("Chicago")])),
            Box::new(FailingEmbedder),
            Box::new(StaticIndex { matches: vec![] }),
        );

        assert!(resolver.resolve(&user_query()).await.is_err());
    }
}
