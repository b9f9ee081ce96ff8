pub mod models;
pub mod prompt;
pub mod selector;
pub mod sql;

use crate::config::ChainConfig;
use crate::db::{DbError, SqlDatabase};
use crate::few_shots::few_shots;
use crate::llm::{LlmError, LlmManager};
use async_trait::async_trait;
use models::QaExchange;
use prompt::FewShotPrompt;
use selector::ExampleSelector;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug)]
pub enum ChainError {
    Llm(LlmError),
    Database(DbError),
    Prompt(String),
    Config(String),
    EmptySql,
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Llm(err) => write!(f, "{}", err),
            ChainError::Database(err) => write!(f, "Database error: {}", err),
            ChainError::Prompt(msg) => write!(f, "Prompt error: {}", msg),
            ChainError::Config(msg) => write!(f, "Chain configuration error: {}", msg),
            ChainError::EmptySql => write!(f, "The model did not produce a SQL query"),
        }
    }
}

impl Error for ChainError {}

impl From<LlmError> for ChainError {
    fn from(err: LlmError) -> Self {
        ChainError::Llm(err)
    }
}

impl From<DbError> for ChainError {
    fn from(err: DbError) -> Self {
        ChainError::Database(err)
    }
}

impl From<minijinja::Error> for ChainError {
    fn from(err: minijinja::Error) -> Self {
        ChainError::Prompt(err.to_string())
    }
}

/// Turns a question into an answer.
#[async_trait]
pub trait Chain: Send + Sync {
    async fn run_detailed(&self, question: &str) -> Result<QaExchange, ChainError>;

    async fn run(&self, question: &str) -> Result<String, ChainError> {
        Ok(self.run_detailed(question).await?.answer)
    }
}

/// Produces a ready-to-use chain per question.
pub trait ChainFactory: Send + Sync {
    fn create_chain(&self) -> Result<Box<dyn Chain>, ChainError>;

    /// Name of the LLM backend behind the chains, for status reporting
    fn backend(&self) -> &str;
}

/// Few-shot prompted text-to-SQL: ask the model for a query, run it, then ask
/// the model to phrase the answer from the real result.
pub struct FewShotDbChain {
    llm: Arc<LlmManager>,
    db: SqlDatabase,
    prompt: Arc<FewShotPrompt>,
    selector: Arc<dyn ExampleSelector>,
    sample_rows: usize,
}

impl FewShotDbChain {
    pub fn new(
        llm: Arc<LlmManager>,
        db: SqlDatabase,
        prompt: Arc<FewShotPrompt>,
        selector: Arc<dyn ExampleSelector>,
        sample_rows: usize,
    ) -> Self {
        Self {
            llm,
            db,
            prompt,
            selector,
            sample_rows,
        }
    }
}

#[async_trait]
impl Chain for FewShotDbChain {
    async fn run_detailed(&self, question: &str) -> Result<QaExchange, ChainError> {
        let start_time = Instant::now();
        info!("Answering question: {}", question);

        let examples = self.selector.select(question, few_shots());
        let table_info = self.db.table_info(self.sample_rows).await?;
        let prompt = self.prompt.render(&examples, &table_info, question)?;
        debug!("Prepared LLM prompt: {}", prompt);

        let stop = vec![prompt::SQL_RESULT_STOP.to_string()];

        let completion = self.llm.complete(&prompt, &stop).await?;
        let sql = sql::extract_sql(&completion);
        if sql.is_empty() {
            return Err(ChainError::EmptySql);
        }
        info!("Generated SQL: {}", sql);

        let sql_result = self.db.run(&sql).await?;
        debug!("SQL result: {}", sql_result);

        let answer_prompt = prompt::with_result(&prompt, &sql, &sql_result);
        let answer = self.llm.complete(&answer_prompt, &stop).await?.trim().to_string();

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!("Answered in {}ms", elapsed_ms);

        Ok(QaExchange {
            question: question.to_string(),
            sql,
            sql_result,
            answer,
            examples: examples.iter().map(|ex| ex.question.to_string()).collect(),
            created_at: chrono::Utc::now(),
            elapsed_ms,
        })
    }
}

/// Builds a fresh `FewShotDbChain` per call around shared model and database
/// handles.
pub struct FewShotDbChainFactory {
    llm: Arc<LlmManager>,
    db: SqlDatabase,
    prompt: Arc<FewShotPrompt>,
    selector: Arc<dyn ExampleSelector>,
    sample_rows: usize,
}

impl FewShotDbChainFactory {
    pub fn new(
        llm: LlmManager,
        db: SqlDatabase,
        config: &ChainConfig,
    ) -> Result<Self, ChainError> {
        let selector = selector::from_config(&config.example_selector, config.examples_k)?;

        Ok(Self {
            llm: Arc::new(llm),
            db,
            prompt: Arc::new(FewShotPrompt::new(config.dialect.clone(), config.top_k)),
            selector: Arc::from(selector),
            sample_rows: config.sample_rows,
        })
    }
}

impl ChainFactory for FewShotDbChainFactory {
    fn create_chain(&self) -> Result<Box<dyn Chain>, ChainError> {
        Ok(Box::new(FewShotDbChain::new(
            Arc::clone(&self.llm),
            self.db.clone(),
            Arc::clone(&self.prompt),
            Arc::clone(&self.selector),
            self.sample_rows,
        )))
    }

    fn backend(&self) -> &str {
        self.llm.backend()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, DatabaseConfig};
    use crate::llm::testing::ScriptedModel;

    fn classicmodels() -> SqlDatabase {
        let db = SqlDatabase::connect(&DatabaseConfig {
            connection_string: ":memory:".to_string(),
            pool_size: 2,
            init_script: None,
        })
        .unwrap();
        db.execute_batch(
            "CREATE TABLE Employees (
                 employeeNumber INTEGER NOT NULL,
                 firstName VARCHAR,
                 lastName VARCHAR,
                 reportsTo INTEGER
             );
             INSERT INTO Employees VALUES
                 (1088, 'William', 'Patterson', NULL),
                 (1611, 'Andy', 'Fixter', 1088),
                 (1612, 'Peter', 'Marsh', 1088),
                 (1619, 'Tom', 'King', 1088);",
        )
        .unwrap();
        db
    }

    fn factory(replies: Vec<Result<String, LlmError>>) -> (FewShotDbChainFactory, Arc<std::sync::Mutex<Vec<String>>>) {
        let model = ScriptedModel::new(replies);
        let prompts = Arc::clone(&model.prompts);
        let llm = LlmManager::from_model("scripted", Box::new(model));
        let factory =
            FewShotDbChainFactory::new(llm, classicmodels(), &AppConfig::default().chain)
                .unwrap();
        (factory, prompts)
    }

    #[tokio::test]
    async fn answers_from_query_result() {
        let (factory, prompts) = factory(vec![
            Ok(" SELECT firstName || ' ' || lastName AS Employee FROM Employees WHERE reportsTo = 1088 ORDER BY lastName;\nSQLResult: made up".to_string()),
            Ok(" Andy Fixter, Tom King and Peter Marsh\n".to_string()),
        ]);

        let chain = factory.create_chain().unwrap();
        let exchange = chain
            .run_detailed("Who reports to William Patterson?")
            .await
            .unwrap();

        assert_eq!(exchange.answer, "Andy Fixter, Tom King and Peter Marsh");
        assert!(exchange.sql.starts_with("SELECT firstName"));
        assert_eq!(
            exchange.sql_result,
            "[('Andy Fixter',), ('Tom King',), ('Peter Marsh',)]"
        );
        assert_eq!(exchange.examples.len(), 2);
        assert_eq!(exchange.examples[0], "Who reports to William Patterson?");

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("CREATE TABLE Employees ("));
        assert!(prompts[0].ends_with("Question: Who reports to William Patterson?\nSQLQuery:"));
        assert!(prompts[1].starts_with(prompts[0].as_str()));
        assert!(prompts[1].ends_with(
            "\nSQLResult: [('Andy Fixter',), ('Tom King',), ('Peter Marsh',)]\nAnswer:"
        ));
    }

    #[tokio::test]
    async fn run_returns_only_the_answer() {
        let (factory, _) = factory(vec![
            Ok("SELECT COUNT(*) FROM Employees;".to_string()),
            Ok("There are 4 employees.".to_string()),
        ]);
        let answer = factory
            .create_chain()
            .unwrap()
            .run("How many employees are there?")
            .await
            .unwrap();
        assert_eq!(answer, "There are 4 employees.");
    }

    #[tokio::test]
    async fn empty_sql_stops_the_chain() {
        let (factory, prompts) = factory(vec![Ok("   ".to_string())]);
        let err = factory.create_chain().unwrap().run("?").await.unwrap_err();
        assert!(matches!(err, ChainError::EmptySql));
        assert_eq!(prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bad_sql_surfaces_database_error() {
        let (factory, _) = factory(vec![Ok("SELECT * FROM Nowhere;".to_string())]);
        let err = factory.create_chain().unwrap().run("?").await.unwrap_err();
        assert!(matches!(err, ChainError::Database(_)));
    }

    #[tokio::test]
    async fn llm_failure_surfaces_llm_error() {
        let (factory, _) = factory(vec![Err(LlmError::ConnectionError("refused".into()))]);
        let err = factory.create_chain().unwrap().run("?").await.unwrap_err();
        assert!(matches!(err, ChainError::Llm(LlmError::ConnectionError(_))));
        assert_eq!(err.to_string(), "LLM connection error: refused");
    }

    #[test]
    fn factory_rejects_unknown_selector() {
        let mut config = AppConfig::default().chain;
        config.example_selector = "al".to_string();
        let llm = LlmManager::from_model("scripted", Box::new(ScriptedModel::new(vec![])));

        let err = FewShotDbChainFactory::new(llm, classicmodels(), &config)
            .err()
            .unwrap();
        assert!(matches!(err, ChainError::Config(_)));
    }

    #[test]
    fn factory_reports_backend() {
        let (factory, _) = factory(vec![]);
        assert_eq!(factory.backend(), "scripted");
    }
}
