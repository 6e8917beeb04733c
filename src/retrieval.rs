//! Keyword-based document retrieval.
//!
//! A deliberately simple ranker: extract content keywords from the question
//! (stopwords removed, years kept), then score each document by weighted
//! keyword overlap. Matches against the document's own question weigh most,
//! table cells next, narrative text least. LLM-assisted keyword extraction
//! is an external capability and is not implemented here.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dataset::QaDocument;

/// Common English words excluded from keyword extraction.
static STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "below", "between", "both", "but", "by", "can",
    "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from", "further",
    "had", "has", "have", "having", "here", "how", "if", "in", "into", "is", "it", "its", "just",
    "more", "most", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other",
    "our", "out", "over", "own", "same", "should", "so", "some", "such", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your",
];

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

/// Extract search keywords from text.
///
/// Lowercases, strips punctuation, drops stopwords and words shorter than 3
/// characters, and always keeps 4-digit year tokens (they matter in
/// financial documents). Returns a sorted, deduplicated list.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&text, " ");

    let mut keywords: Vec<String> = cleaned
        .split_whitespace()
        .filter(|word| word.len() > 2 && !STOPWORDS.contains(word))
        .map(String::from)
        .collect();

    for year in YEAR.find_iter(&text) {
        keywords.push(year.as_str().to_string());
    }

    keywords.sort();
    keywords.dedup();
    keywords
}

/// Weighted keyword-overlap relevance of a document.
///
/// Question matches score 10, table matches 5, narrative matches 1.
pub fn document_relevance(keywords: &[String], document: &QaDocument) -> u32 {
    let mut score = 0;

    if let Some(qa) = &document.qa {
        let doc_question = qa.question.to_lowercase();
        for keyword in keywords {
            if doc_question.contains(keyword.as_str()) {
                score += 10;
            }
        }
    }

    let mut narrative = document.pre_text.join(" ");
    narrative.push(' ');
    narrative.push_str(&document.post_text.join(" "));
    let narrative = narrative.to_lowercase();
    for keyword in keywords {
        if narrative.contains(keyword.as_str()) {
            score += 1;
        }
    }

    if !document.table.is_empty() {
        let table_text = document
            .table
            .iter()
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        for keyword in keywords {
            if table_text.contains(keyword.as_str()) {
                score += 5;
            }
        }
    }

    score
}

/// Rank documents by relevance to a question and return the top `k`.
///
/// Ties keep the original document order.
pub fn find_relevant_documents<'a>(
    question: &str,
    documents: &'a [QaDocument],
    top_k: usize,
) -> Vec<&'a QaDocument> {
    let keywords = extract_keywords(question);
    log::debug!("Extracted keywords: {}", keywords.join(", "));

    let mut scored: Vec<(u32, &QaDocument)> = documents
        .iter()
        .map(|doc| (document_relevance(&keywords, doc), doc))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored.into_iter().take(top_k).map(|(_, doc)| doc).collect()
}
