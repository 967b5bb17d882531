// ChatEvidence - core/tagger.rs
//
// Weighted, negation-aware keyword tagging against Article 840 categories.
// Core layer: pure logic. The tagger holds only immutable data, so one
// instance can be shared across threads and every call is independent.
//
// Multi-label: every non-general category with a keyword hit is
// returned, ranked, with no minimum-count cutoff.

use crate::core::dictionary::{self, KeywordDictionary};
use crate::core::model::{Article840Category, EvidenceChunk, ParsedMessage, TaggingResult};
use crate::core::negation::{NegationDetector, WindowNegationDetector};
use crate::util::constants;
use crate::util::error::DictionaryError;
use rayon::prelude::*;
use std::sync::Arc;

/// Anything with message text the tagger can read.
pub trait MessageContent {
    fn content(&self) -> &str;
}

impl MessageContent for str {
    fn content(&self) -> &str {
        self
    }
}

impl MessageContent for &str {
    fn content(&self) -> &str {
        self
    }
}

impl MessageContent for String {
    fn content(&self) -> &str {
        self
    }
}

impl MessageContent for ParsedMessage {
    fn content(&self) -> &str {
        &self.content
    }
}

impl MessageContent for EvidenceChunk {
    fn content(&self) -> &str {
        &self.content
    }
}

/// Keyword tagger bound to one dictionary and an optional negation detector.
pub struct ArticleTagger {
    dictionary: Arc<KeywordDictionary>,
    negation: Option<Box<dyn NegationDetector>>,
}

/// A category with at least one un-negated keyword hit.
#[derive(Debug, Clone, Copy)]
struct CategoryHit {
    category: Article840Category,
    weight: u32,
    count: u32,
}

impl CategoryHit {
    fn score(&self) -> u32 {
        self.weight * self.count
    }
}

impl ArticleTagger {
    /// Tagger without negation detection.
    pub fn new(dictionary: Arc<KeywordDictionary>) -> Self {
        Self {
            dictionary,
            negation: None,
        }
    }

    /// Tagger over the built-in dictionary.
    pub fn builtin() -> Result<Self, DictionaryError> {
        Ok(Self::new(Arc::new(dictionary::load_builtin()?)))
    }

    /// Enable negation filtering with a custom detector.
    pub fn with_negation(mut self, detector: Box<dyn NegationDetector>) -> Self {
        self.negation = Some(detector);
        self
    }

    /// Enable negation filtering with the window detector.
    pub fn with_default_negation(self) -> Self {
        self.with_negation(Box::new(WindowNegationDetector::default()))
    }

    pub fn dictionary(&self) -> &KeywordDictionary {
        &self.dictionary
    }

    pub fn negation_enabled(&self) -> bool {
        self.negation.is_some()
    }

    /// Tag anything exposing message text.
    pub fn tag_message<M: MessageContent + ?Sized>(&self, message: &M) -> TaggingResult {
        self.tag(message.content())
    }

    /// Tag many messages. Output order matches input order; items are
    /// tagged independently on the rayon pool.
    pub fn tag_batch<M: MessageContent + Sync>(&self, messages: &[M]) -> Vec<TaggingResult> {
        let results: Vec<TaggingResult> = messages
            .par_iter()
            .map(|m| self.tag(m.content()))
            .collect();
        tracing::debug!(
            messages = messages.len(),
            tagged = results.iter().filter(|r| !r.is_general_only()).count(),
            "Batch tagging complete"
        );
        results
    }

    /// Classify one message's content.
    pub fn tag(&self, content: &str) -> TaggingResult {
        if content.trim().is_empty() {
            return TaggingResult {
                categories: vec![Article840Category::General],
                confidence: constants::CONFIDENCE_EMPTY,
                matched_keywords: Vec::new(),
                negated_keywords: Vec::new(),
                reasoning: "empty message".to_string(),
            };
        }

        let lowered = content.to_lowercase();
        let mut matched_keywords: Vec<String> = Vec::new();
        let mut negated_keywords: Vec<String> = Vec::new();
        let mut hits: Vec<CategoryHit> = Vec::new();

        for rule in self.dictionary.rules() {
            let mut count = 0;
            for keyword in &rule.keywords {
                if !lowered.contains(keyword.as_str()) {
                    continue;
                }
                if let Some(detector) = &self.negation {
                    if detector.check(&lowered, keyword).negated {
                        if !negated_keywords.contains(keyword) {
                            negated_keywords.push(keyword.clone());
                        }
                        continue;
                    }
                }
                // Local counts are per category; the global list is deduplicated.
                count += 1;
                if !matched_keywords.contains(keyword) {
                    matched_keywords.push(keyword.clone());
                }
            }
            if count > 0 {
                hits.push(CategoryHit {
                    category: rule.category,
                    weight: rule.weight,
                    count,
                });
            }
        }

        if hits.is_empty() {
            let reasoning = with_negation_note(
                "No Article 840 keywords matched; classified as general.".to_string(),
                &negated_keywords,
            );
            return TaggingResult {
                categories: vec![Article840Category::General],
                confidence: constants::CONFIDENCE_NO_MATCH,
                matched_keywords,
                negated_keywords,
                reasoning,
            };
        }

        if hits.iter().all(|h| h.category == Article840Category::General) {
            let reasoning = with_negation_note(
                format!(
                    "Only general evidence keywords matched ({}): {}.",
                    Article840Category::General.korean_label(),
                    quote_keywords(&matched_keywords)
                ),
                &negated_keywords,
            );
            return TaggingResult {
                categories: vec![Article840Category::General],
                confidence: constants::CONFIDENCE_GENERAL_ONLY,
                matched_keywords,
                negated_keywords,
                reasoning,
            };
        }

        // Stable: equal (score, count) keep dictionary order.
        hits.sort_by(|a, b| b.score().cmp(&a.score()).then(b.count.cmp(&a.count)));

        let mut categories: Vec<Article840Category> = hits
            .iter()
            .map(|h| h.category)
            .filter(|c| *c != Article840Category::General)
            .collect();
        if categories.is_empty() {
            categories.push(Article840Category::General);
        }

        let confidence = confidence_for(matched_keywords.len(), categories.len());
        let reasoning = with_negation_note(
            format!(
                "Matched {} based on keywords: {}.",
                describe_categories(&categories),
                quote_keywords(&matched_keywords)
            ),
            &negated_keywords,
        );

        TaggingResult {
            categories,
            confidence,
            matched_keywords,
            negated_keywords,
            reasoning,
        }
    }
}

/// `min(0.3 + 0.2 * distinct_keywords, 1.0)`, scaled by 0.9 when more than
/// one category is selected, rounded to two decimals.
pub fn confidence_for(distinct_keywords: usize, selected_categories: usize) -> f64 {
    let base = (constants::CONFIDENCE_BASE
        + constants::CONFIDENCE_PER_KEYWORD * distinct_keywords as f64)
        .min(1.0);
    if selected_categories > 1 {
        round2(base * constants::MULTI_CATEGORY_PENALTY)
    } else {
        round2(base)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn describe_categories(categories: &[Article840Category]) -> String {
    categories
        .iter()
        .map(|c| format!("{} ({})", c.korean_label(), c.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn quote_keywords(keywords: &[String]) -> String {
    keywords
        .iter()
        .take(constants::REASONING_MAX_KEYWORDS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn with_negation_note(mut reasoning: String, negated: &[String]) -> String {
    if !negated.is_empty() {
        reasoning.push_str(&format!(" [negated, excluded: {}]", negated.join(", ")));
    }
    reasoning
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chunk;
    use crate::core::parser::{parse_content, ParseConfig};
    use std::path::Path;

    fn tagger() -> ArticleTagger {
        ArticleTagger::builtin().unwrap()
    }

    #[test]
    fn test_domestic_violence_scenario() {
        let result = tagger().tag("남편이 나를 때렸다");
        assert!(result.categories.contains(&Article840Category::DomesticViolence));
        assert_eq!(result.matched_keywords, vec!["때렸".to_string()]);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_no_match_is_general_point_one() {
        let result = tagger().tag("오늘 저녁 뭐 먹을까");
        assert_eq!(result.categories, vec![Article840Category::General]);
        assert_eq!(result.confidence, 0.1);
        assert!(result.matched_keywords.is_empty());
    }

    #[test]
    fn test_general_only_is_point_three() {
        let result = tagger().tag("증거 사진");
        assert!(result.is_general_only());
        assert_eq!(result.confidence, 0.3);
        assert_eq!(result.matched_keywords, vec!["증거".to_string(), "사진".to_string()]);
        assert!(result.reasoning.contains("일반 증거"));
    }

    #[test]
    fn test_empty_and_whitespace_content() {
        for content in ["", "   \n\t"] {
            let result = tagger().tag(content);
            assert_eq!(result.categories, vec![Article840Category::General]);
            assert_eq!(result.confidence, 0.0);
            assert!(result.matched_keywords.is_empty());
            assert_eq!(result.reasoning, "empty message");
        }
    }

    #[test]
    fn test_multi_label_ranking_and_penalty() {
        let result = tagger().tag("남편이 도박으로 빚을 지고 나를 때렸다");
        assert_eq!(
            result.categories,
            vec![
                Article840Category::FinancialMisconduct,
                Article840Category::DomesticViolence
            ]
        );
        assert_eq!(result.matched_keywords, vec!["때렸", "도박", "빚"]);
        // base 0.3 + 0.2 * 3 = 0.9, times 0.9 for two categories
        assert_eq!(result.confidence, 0.81);
        assert!(result.reasoning.contains("financial_misconduct"));
        assert!(result.reasoning.contains("가정폭력"));
    }

    #[test]
    fn test_score_tie_broken_by_count() {
        // domestic_violence: 2 x 3 = 6, financial_misconduct: 3 x 2 = 6
        let result = tagger().tag("때렸고 폭행했다 도박 빚 대출");
        assert_eq!(
            result.categories,
            vec![
                Article840Category::FinancialMisconduct,
                Article840Category::DomesticViolence
            ]
        );
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_general_hits_do_not_appear_beside_substantive_ones() {
        let result = tagger().tag("외도 증거 사진 보냈어");
        assert_eq!(result.categories, vec![Article840Category::Adultery]);
        assert_eq!(result.matched_keywords.len(), 3);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_reasoning_quotes_at_most_three_keywords() {
        let result = tagger().tag("폭행 폭력 협박 밀쳤");
        assert_eq!(result.matched_keywords.len(), 4);
        assert!(result.reasoning.contains("폭행, 폭력, 협박"));
        assert!(!result.reasoning.contains("밀쳤"));
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_case_insensitive_matching() {
        let toml = dictionary::builtin_dictionary_source()
            .replace("\"모텔\",", "\"모텔\", \"Motel\",");
        let dict = dictionary::load_from_str(&toml, Path::new("t.toml")).unwrap();
        let result = ArticleTagger::new(Arc::new(dict)).tag("MOTEL receipt");
        assert_eq!(result.categories, vec![Article840Category::Adultery]);
        assert_eq!(result.matched_keywords, vec!["motel"]);
    }

    #[test]
    fn test_shared_keyword_counts_locally_but_listed_once() {
        let mut toml = String::new();
        for cat in Article840Category::all() {
            let kw = match cat {
                Article840Category::Desertion | Article840Category::FinancialMisconduct => "돈",
                Article840Category::General => "증거",
                other => other.label(),
            };
            toml.push_str(&format!(
                "[[category]]\nid = \"{}\"\nweight = 2\nkeywords = [\"{kw}\"]\n",
                cat.label()
            ));
        }
        let dict = dictionary::load_from_str(&toml, Path::new("t.toml")).unwrap();
        let result = ArticleTagger::new(Arc::new(dict)).tag("돈 안 갖고 나갔어");
        assert_eq!(
            result.categories,
            vec![
                Article840Category::Desertion,
                Article840Category::FinancialMisconduct
            ]
        );
        assert_eq!(result.matched_keywords, vec!["돈"]);
        // One distinct keyword: 0.5, penalised for two categories.
        assert_eq!(result.confidence, 0.45);
    }

    #[test]
    fn test_negation_is_opt_in() {
        let plain = tagger().tag("외도한 적 없어");
        assert_eq!(plain.categories, vec![Article840Category::Adultery]);
        assert!(plain.negated_keywords.is_empty());

        let tagger = tagger().with_default_negation();
        assert!(tagger.negation_enabled());
        let negated = tagger.tag("외도한 적 없어");
        assert_eq!(negated.categories, vec![Article840Category::General]);
        assert_eq!(negated.confidence, 0.1);
        assert_eq!(negated.negated_keywords, vec!["외도"]);
        assert!(negated.reasoning.contains("[negated, excluded: 외도]"));
    }

    #[test]
    fn test_negation_only_suppresses_negated_clause() {
        let tagger = tagger().with_default_negation();
        let result = tagger.tag("외도는 안 했다고? 어제 또 때렸잖아");
        assert_eq!(result.categories, vec![Article840Category::DomesticViolence]);
        assert_eq!(result.negated_keywords, vec!["외도"]);
    }

    #[test]
    fn test_negated_clause_does_not_suppress_previous_clause() {
        let tagger = tagger().with_default_negation();

        let result = tagger.tag("남편이 외도는 했지만 폭행은 없었다");
        assert_eq!(result.categories, vec![Article840Category::Adultery]);
        assert_eq!(result.matched_keywords, vec!["외도"]);
        assert_eq!(result.negated_keywords, vec!["폭행"]);
        assert_eq!(result.confidence, 0.5);

        let result = tagger.tag("외도했고 돈도 없어");
        assert_eq!(result.categories, vec![Article840Category::Adultery]);
        assert!(result.negated_keywords.is_empty());
    }

    #[test]
    fn test_tagging_is_idempotent() {
        let tagger = tagger().with_default_negation();
        let text = "시어머니가 또 무시하고 모욕했어";
        assert_eq!(tagger.tag(text), tagger.tag(text));
    }

    #[test]
    fn test_confidence_monotonic_in_keywords() {
        for categories in [1, 2] {
            let mut previous = 0.0;
            for n in 0..10 {
                let c = confidence_for(n, categories);
                assert!(c >= previous, "confidence dropped at n={n}");
                assert!((0.0..=1.0).contains(&c));
                previous = c;
            }
        }
    }

    #[test]
    fn test_batch_preserves_order() {
        let tagger = tagger();
        let inputs = vec!["증거 사진", "남편이 나를 때렸다", "", "도박 빚"];
        let batch = tagger.tag_batch(&inputs);
        assert_eq!(batch.len(), inputs.len());
        for (input, result) in inputs.iter().zip(&batch) {
            assert_eq!(*result, tagger.tag(input));
        }
    }

    #[test]
    fn test_tags_parsed_messages_and_chunks() {
        let parsed = parse_content(
            "2024년 1월 15일\n오후 9:00, 홍길동 : 어제 시댁에서 또 무시당했어",
            "chat.txt",
            &ParseConfig::default(),
        );
        let tagger = tagger();
        let from_message = tagger.tag_message(&parsed.messages[0]);
        let chunks = chunk::build(&parsed, "c", "f");
        let from_chunk = tagger.tag_batch(&chunks);
        assert_eq!(from_message, from_chunk[0]);
        assert_eq!(
            from_message.categories,
            vec![
                Article840Category::MistreatmentByInlaws,
                Article840Category::IrreconcilableDifferences
            ]
        );
    }

    #[test]
    fn test_general_only_invariant() {
        let tagger = tagger();
        let general = tagger.dictionary().rule(Article840Category::General).unwrap();
        for text in ["증거", "녹음 파일이랑 영수증", "아무 말", "진단서 캡처"] {
            let result = tagger.tag(text);
            if result.is_general_only() {
                assert!(result
                    .matched_keywords
                    .iter()
                    .all(|k| general.keywords.contains(k)));
            }
        }
    }
}
