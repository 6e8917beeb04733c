//! Financial QA dataset models and loading.
//!
//! A dataset is a JSON array of documents, each mixing narrative text
//! (`pre_text`/`post_text`) with one table and optionally a `qa` record
//! carrying the question and reference answer. Only documents with a `qa`
//! record participate in evaluation; the rest still serve as retrieval
//! candidates.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Question and reference answer attached to a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QaPair {
    /// The question to answer.
    pub question: String,
    /// The reference answer.
    pub answer: String,
}

/// One financial document with optional QA annotation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QaDocument {
    /// Dataset-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Source filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Narrative paragraphs before the table.
    #[serde(default)]
    pub pre_text: Vec<String>,
    /// Narrative paragraphs after the table.
    #[serde(default)]
    pub post_text: Vec<String>,
    /// Tabular data, first row treated as the header.
    #[serde(default)]
    pub table: Vec<Vec<String>>,
    /// Question/answer annotation, when present.
    #[serde(default)]
    pub qa: Option<QaPair>,
}

impl QaDocument {
    /// Whether this document can be used as an evaluation example.
    pub fn is_valid_example(&self) -> bool {
        self.qa.is_some()
    }

    /// Human-readable source reference.
    pub fn source(&self) -> String {
        if let Some(id) = &self.id {
            format!("Document ID: {id}")
        } else if let Some(filename) = &self.filename {
            format!("Document: {filename}")
        } else {
            "Source: Unknown document".to_string()
        }
    }

    /// Assemble the document into a context block for a generator.
    ///
    /// Sections appear in reading order: identifier, text before the table,
    /// the table itself, text after the table.
    pub fn context(&self) -> String {
        let mut context = String::new();

        if let Some(id) = &self.id {
            context.push_str(&format!("DOCUMENT ID: {id}\n\n"));
        } else if let Some(filename) = &self.filename {
            context.push_str(&format!("DOCUMENT: {filename}\n\n"));
        }

        if !self.pre_text.is_empty() {
            context.push_str("TEXT BEFORE TABLE:\n");
            context.push_str(&self.pre_text.join(" "));
            context.push_str("\n\n");
        }

        if !self.table.is_empty() {
            context.push_str("TABLE:\n");
            context.push_str(&format_table(&self.table));
            context.push_str("\n\n");
        }

        if !self.post_text.is_empty() {
            context.push_str("TEXT AFTER TABLE:\n");
            context.push_str(&self.post_text.join(" "));
            context.push_str("\n\n");
        }

        context
    }
}

/// Render a table as a markdown pipe table, separator after the header row.
pub fn format_table(table: &[Vec<String>]) -> String {
    let mut out = String::new();
    for (i, row) in table.iter().enumerate() {
        out.push_str("| ");
        out.push_str(&row.join(" | "));
        out.push_str(" |\n");

        if i == 0 {
            out.push_str("| ");
            out.push_str(&vec!["---"; row.len()].join(" | "));
            out.push_str(" |\n");
        }
    }
    out
}

/// Load a dataset from a JSON file.
pub fn load_dataset(path: &Path) -> Result<Vec<QaDocument>> {
    let contents = fs::read_to_string(path)?;
    let documents: Vec<QaDocument> = serde_json::from_str(&contents)?;
    log::info!("Loaded {} documents from {}", documents.len(), path.display());
    Ok(documents)
}

/// Filter a dataset down to documents usable as evaluation examples.
pub fn valid_examples(documents: &[QaDocument]) -> Vec<&QaDocument> {
    documents.iter().filter(|d| d.is_valid_example()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<Vec<String>> {
        vec![
            vec!["year".to_string(), "revenue".to_string()],
            vec!["2019".to_string(), "1200".to_string()],
        ]
    }

    #[test]
    fn test_format_table_with_header_separator() {
        let rendered = format_table(&table());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "| year | revenue |");
        assert_eq!(lines[1], "| --- | --- |");
        assert_eq!(lines[2], "| 2019 | 1200 |");
    }

    #[test]
    fn test_context_sections_in_order() {
        let doc = QaDocument {
            id: Some("doc-1".to_string()),
            pre_text: vec!["Revenue grew.".to_string()],
            post_text: vec!["See notes.".to_string()],
            table: table(),
            ..Default::default()
        };
        let context = doc.context();

        let id_pos = context.find("DOCUMENT ID: doc-1").unwrap();
        let pre_pos = context.find("TEXT BEFORE TABLE:").unwrap();
        let table_pos = context.find("TABLE:\n|").unwrap();
        let post_pos = context.find("TEXT AFTER TABLE:").unwrap();
        assert!(id_pos < pre_pos && pre_pos < table_pos && table_pos < post_pos);
    }

    #[test]
    fn test_source_fallbacks() {
        let mut doc = QaDocument::default();
        assert_eq!(doc.source(), "Source: Unknown document");
        doc.filename = Some("10k.json".to_string());
        assert_eq!(doc.source(), "Document: 10k.json");
        doc.id = Some("abc".to_string());
        assert_eq!(doc.source(), "Document ID: abc");
    }

    #[test]
    fn test_valid_examples_filter() {
        let docs = vec![
            QaDocument::default(),
            QaDocument {
                qa: Some(QaPair {
                    question: "q".to_string(),
                    answer: "a".to_string(),
                }),
                ..Default::default()
            },
        ];
        assert_eq!(valid_examples(&docs).len(), 1);
    }

    #[test]
    fn test_deserialize_minimal_document() {
        let doc: QaDocument =
            serde_json::from_str(r#"{"qa": {"question": "q?", "answer": "42"}}"#).unwrap();
        assert!(doc.is_valid_example());
        assert!(doc.table.is_empty());
    }
}
