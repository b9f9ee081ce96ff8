use serde::{Deserialize, Serialize};

/// Everything one chain run produced, in the order it was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaExchange {
    pub question: String,
    pub sql: String,
    pub sql_result: String,
    pub answer: String,
    /// Questions of the few-shot examples placed in the prompt
    pub examples: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub elapsed_ms: u64,
}
