use crate::chain::ChainError;
use crate::few_shots::FewShotExample;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("word pattern is valid"));

/// Picks which examples go into the prompt for a given question.
pub trait ExampleSelector: Send + Sync {
    fn select(
        &self,
        question: &str,
        examples: &'static [FewShotExample],
    ) -> Vec<&'static FewShotExample>;
}

/// Every example, in corpus order.
pub struct AllExamples;

impl ExampleSelector for AllExamples {
    fn select(
        &self,
        _question: &str,
        examples: &'static [FewShotExample],
    ) -> Vec<&'static FewShotExample> {
        examples.iter().collect()
    }
}

/// The `k` examples whose questions share the most words with the input,
/// scored by Jaccard overlap. Ties keep corpus order.
pub struct OverlapSelector {
    k: usize,
}

impl OverlapSelector {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

fn words(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn overlap(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

impl ExampleSelector for OverlapSelector {
    fn select(
        &self,
        question: &str,
        examples: &'static [FewShotExample],
    ) -> Vec<&'static FewShotExample> {
        let query = words(question);

        let mut scored: Vec<(f64, &'static FewShotExample)> = examples
            .iter()
            .map(|ex| (overlap(&query, &words(ex.question)), ex))
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().take(self.k).map(|(_, ex)| ex).collect()
    }
}

/// Builds the selector named in configuration: `all` or `similarity`.
pub fn from_config(name: &str, k: usize) -> Result<Box<dyn ExampleSelector>, ChainError> {
    match name {
        "all" => Ok(Box::new(AllExamples)),
        "similarity" => Ok(Box::new(OverlapSelector::new(k))),
        _ => Err(ChainError::Config(format!(
            "Unsupported example selector: {}",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::few_shots::few_shots;

    #[test]
    fn all_keeps_corpus_order() {
        let picked = AllExamples.select("anything", few_shots());
        assert_eq!(picked.len(), 5);
        assert_eq!(picked[0].question, few_shots()[0].question);
    }

    #[test]
    fn overlap_ranks_closest_question_first() {
        let picked = OverlapSelector::new(2).select("Who reports to Mary Patterson?", few_shots());
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].question, "Who reports to William Patterson?");
    }

    #[test]
    fn overlap_finds_payments_example() {
        let picked = OverlapSelector::new(1)
            .select("Difference in amount received in 2005 compared to 2004", few_shots());
        assert!(picked[0].question.starts_with("What is the difference"));
    }

    #[test]
    fn k_larger_than_corpus_returns_everything() {
        assert_eq!(OverlapSelector::new(10).select("x", few_shots()).len(), 5);
    }

    #[test]
    fn k_zero_returns_nothing() {
        assert!(OverlapSelector::new(0).select("orders", few_shots()).is_empty());
    }

    #[test]
    fn config_names() {
        assert_eq!(from_config("all", 1).unwrap().select("q", few_shots()).len(), 5);
        assert_eq!(
            from_config("similarity", 1).unwrap().select("q", few_shots()).len(),
            1
        );
    }

    #[test]
    fn misspelled_selector_is_rejected() {
        let err = from_config("al", 2).err().unwrap();
        assert!(matches!(err, ChainError::Config(_)));
        assert!(err.to_string().contains("al"));
    }
}
