use crate::few_shots::FewShotExample;
use minijinja::{context, Environment};

const FEW_SHOT_TEMPLATE: &str = r#"You are a {{ dialect }} expert. Given an input question, first create a syntactically correct {{ dialect }} query to run, then look at the results of the query and return the answer to the input question.
Unless the user specifies in the question a specific number of examples to obtain, query for at most {{ top_k }} results using the LIMIT clause as per {{ dialect }}. You can order the results to return the most informative data in the database.
Never query for all columns from a table. You must query only the columns that are needed to answer the question. Wrap each column name in double quotes (") to denote them as delimited identifiers.
Pay attention to use only the column names you can see in the tables below. Be careful to not query for columns that do not exist. Also, pay attention to which column is in which table.
Pay attention to use current_date to get the current date, if the question involves "today".

Use the following format:

Question: Question here
SQLQuery: SQL Query to run
SQLResult: Result of the SQLQuery
Answer: Final answer here

No pre-amble.
{% for ex in examples %}

Question: {{ ex.question }}
SQLQuery: {{ ex.sql_query }}
SQLResult: {{ ex.sql_result }}
Answer: {{ ex.answer }}
{% endfor %}

Only use the following tables:
{{ table_info }}

Question: {{ input }}
SQLQuery:"#;

/// Marker the model emits after the query; used as the stop sequence.
pub const SQL_RESULT_STOP: &str = "\nSQLResult:";

pub struct FewShotPrompt {
    env: Environment<'static>,
    dialect: String,
    top_k: usize,
}

impl FewShotPrompt {
    pub fn new(dialect: impl Into<String>, top_k: usize) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.add_template("few_shot.txt", FEW_SHOT_TEMPLATE)
            .expect("few-shot template parses");

        Self {
            env,
            dialect: dialect.into(),
            top_k,
        }
    }

    /// Prompt for the first completion; ends right after `SQLQuery:`.
    pub fn render(
        &self,
        examples: &[&FewShotExample],
        table_info: &str,
        question: &str,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("few_shot.txt")?;
        tmpl.render(context! {
            dialect => self.dialect,
            top_k => self.top_k,
            examples => examples,
            table_info => table_info,
            input => question,
        })
    }
}

/// Prompt for the second completion: the first prompt with the query and its
/// real result filled in, ending at `Answer:`.
pub fn with_result(prompt: &str, sql: &str, sql_result: &str) -> String {
    format!("{} {}\nSQLResult: {}\nAnswer:", prompt, sql, sql_result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::few_shots::few_shots;

    #[test]
    fn renders_examples_tables_and_question() {
        let prompt = FewShotPrompt::new("DuckDB", 5);
        let examples: Vec<_> = few_shots().iter().take(2).collect();
        let text = prompt
            .render(&examples, "CREATE TABLE employees (...)", "Who is the president?")
            .unwrap();

        assert!(text.starts_with("You are a DuckDB expert."));
        assert!(text.contains("at most 5 results"));
        assert!(text.contains(
            "Question: Who reports to William Patterson?\nSQLQuery: SELECT CONCAT(reports.firstname"
        ));
        assert!(text.contains(
            "SQLResult: Result of the SQL query\nAnswer: 'Andy Fixter', 'Peter Marsh', 'Tom King'\n\nQuestion: Compute the commission"
        ));
        assert!(text.contains("Only use the following tables:\nCREATE TABLE employees (...)"));
        assert!(text.ends_with("Question: Who is the president?\nSQLQuery:"));
    }

    #[test]
    fn examples_are_not_escaped() {
        let prompt = FewShotPrompt::new("DuckDB", 5);
        let examples: Vec<_> = few_shots().iter().collect();
        let text = prompt.render(&examples, "", "q").unwrap();
        assert!(text.contains("'On Hold'"));
        assert!(text.contains("`Quantity in stock`"));
        assert_eq!(text.matches("\nSQLResult: Result of the SQL query\n").count(), 5);
    }

    #[test]
    fn renders_without_examples() {
        let prompt = FewShotPrompt::new("DuckDB", 3);
        let text = prompt.render(&[], "t", "q").unwrap();
        assert!(text.contains("No pre-amble.\n\nOnly use the following tables:"));
    }

    #[test]
    fn continuation_appends_result() {
        let text = with_result("...SQLQuery:", "SELECT 1;", "[(1,)]");
        assert_eq!(text, "...SQLQuery: SELECT 1;\nSQLResult: [(1,)]\nAnswer:");
    }
}
