use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static BACKTICK_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("backtick pattern is valid"));

/// Pulls the statement out of a model completion.
///
/// Handles fenced code blocks, a leading `SQLQuery:` marker and trailing
/// `SQLResult:` / `Answer:` sections. Backtick-quoted identifiers become
/// double-quoted so MySQL-style output still runs on DuckDB.
pub fn extract_sql(content: &str) -> String {
    let mut sql = content.trim();

    if let Some(start) = sql.find("```") {
        let after_fence = &sql[start + 3..];
        // skip the language tag, if any
        let body = match after_fence.split_once('\n') {
            Some((tag, rest)) if !tag.contains(' ') && !tag.contains("```") => rest,
            _ => after_fence,
        };
        sql = match body.find("```") {
            Some(end) => &body[..end],
            None => body,
        };
        debug!("Extracted SQL from code block");
    }

    if let Some(start) = sql.find("SQLQuery:") {
        sql = &sql[start + "SQLQuery:".len()..];
    }

    let end = ["SQLResult:", "Answer:"]
        .iter()
        .filter_map(|marker| sql.find(marker))
        .min()
        .unwrap_or(sql.len());
    let sql = sql[..end].trim();

    BACKTICK_IDENT.replace_all(sql, "\"$1\"").into_owned()
}
