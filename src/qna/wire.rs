//! Wire types for the `generateAnswer` operation.

use serde::{Deserialize, Serialize};

/// Request body: the user's question.
#[derive(Debug, Serialize)]
pub struct QnaRequest<'a> {
    /// Question text, sent verbatim.
    pub question: &'a str,
}

/// Typed view of a `generateAnswer` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QnaResponse {
    /// Candidate answers, best first.
    #[serde(default)]
    pub answers: Vec<QnaAnswer>,
}

/// One candidate answer.
#[derive(Debug, Clone, Deserialize)]
pub struct QnaAnswer {
    /// Answer text.
    #[serde(default)]
    pub answer: String,
    /// Confidence score, 0 to 100.
    #[serde(default)]
    pub score: f64,
    /// Knowledge base questions this answer is attached to.
    #[serde(default)]
    pub questions: Vec<String>,
    /// Knowledge base entry id.
    #[serde(default)]
    pub id: Option<i64>,
    /// Where the entry was imported from.
    #[serde(default)]
    pub source: Option<String>,
}

impl QnaResponse {
    /// The highest-scoring answer, if any.
    pub fn top_answer(&self) -> Option<&QnaAnswer> {
        self.answers
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}
