//! Suggested follow-up prompts.

/// Source of follow-up prompt suggestions shown after each answer.
pub trait PromptSuggester: Send + Sync {
    /// At most five suggestions drawn from the general, subject and action catalogs.
    fn suggest(&self, subject: Option<&str>, action_type: Option<&str>) -> Vec<String>;

    /// Add an educator-supplied prompt under a category (case-insensitive).
    fn add_custom(&self, category: &str, prompt: &str);

    /// All prompts stored under a category.
    fn prompts_by_category(&self, category: &str) -> Vec<String>;
}
