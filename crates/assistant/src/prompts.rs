//! Built-in catalog of follow-up prompt suggestions.

use std::collections::HashMap;
use std::sync::RwLock;

use eduassist_core::PromptSuggester;
use rand::seq::SliceRandom;
use tracing::{info, warn};

pub const MAX_SUGGESTIONS: usize = 5;

const GENERAL: &[&str] = &[
    "Create a lesson plan for today's topic",
    "Generate discussion questions for class engagement",
    "Design an assessment rubric",
    "Suggest classroom management strategies",
    "Create homework assignments that reinforce learning",
    "Develop differentiated instruction approaches",
    "Generate parent communication templates",
    "Design interactive learning activities",
    "Create a quiz for this lesson",
    "Suggest ways to make this topic more engaging",
    "Help me plan a group project",
    "Generate ice-breaker activities for class",
];

const MATH: &[&str] = &[
    "Create word problems for algebra practice",
    "Generate step-by-step problem solutions",
    "Design math games for concept reinforcement",
    "Create visual aids for geometric concepts",
    "Develop real-world math applications",
    "Make practice worksheets for this concept",
    "Create math center activities",
];

const ENGLISH: &[&str] = &[
    "Create creative writing prompts",
    "Generate reading comprehension questions",
    "Design vocabulary building exercises",
    "Create grammar practice activities",
    "Develop literature analysis guides",
    "Plan a book club discussion",
    "Create writing rubrics",
];

const SCIENCE: &[&str] = &[
    "Design hands-on science experiments",
    "Create lab safety protocols",
    "Generate hypothesis testing activities",
    "Develop science fair project ideas",
    "Create concept mapping exercises",
    "Plan field trip connections",
    "Design STEM challenges",
];

const SOCIAL_STUDIES: &[&str] = &[
    "Create timeline activities",
    "Design role-playing scenarios",
    "Generate current events discussions",
    "Create map-based activities",
    "Develop cultural comparison projects",
];

const TRANSLATE: &[&str] = &[
    "Translate this lesson content to Spanish for ELL students",
    "Convert technical terms to simple language",
    "Translate parent communication letters",
    "Create multilingual classroom resources",
    "Make vocabulary cards in multiple languages",
];

const SUMMARIZE: &[&str] = &[
    "Summarize this chapter in bullet points",
    "Create a one-paragraph summary for students",
    "Extract key concepts from this text",
    "Generate executive summary for administrators",
    "Make student-friendly chapter highlights",
];

const REWRITE: &[&str] = &[
    "Rewrite this for elementary students",
    "Make this more engaging and interactive",
    "Convert to formal academic language",
    "Simplify this explanation for struggling learners",
    "Adapt this content for different grade levels",
];

const QUESTION_GENERATION: &[&str] = &[
    "Create quiz questions from this content",
    "Generate discussion starters",
    "Make multiple choice questions",
    "Create open-ended reflection questions",
    "Design critical thinking questions",
];

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Category and action catalogs, with educator-added prompts kept in memory.
pub struct CatalogSuggester {
    categories: RwLock<HashMap<String, Vec<String>>>,
    actions: HashMap<String, Vec<String>>,
}

impl CatalogSuggester {
    pub fn new() -> Self {
        let categories = HashMap::from([
            ("general".to_string(), owned(GENERAL)),
            ("math".to_string(), owned(MATH)),
            ("english".to_string(), owned(ENGLISH)),
            ("science".to_string(), owned(SCIENCE)),
            ("social studies".to_string(), owned(SOCIAL_STUDIES)),
        ]);
        let actions = HashMap::from([
            ("translate".to_string(), owned(TRANSLATE)),
            ("summarize".to_string(), owned(SUMMARIZE)),
            ("rewrite".to_string(), owned(REWRITE)),
            ("question_generation".to_string(), owned(QUESTION_GENERATION)),
        ]);
        Self {
            categories: RwLock::new(categories),
            actions,
        }
    }

    /// Unshuffled candidate pool: general, then subject, then action prompts.
    pub fn candidates(&self, subject: Option<&str>, action_type: Option<&str>) -> Vec<String> {
        let mut pool = Vec::new();
        match self.categories.read() {
            Ok(categories) => {
                if let Some(general) = categories.get("general") {
                    pool.extend(general.iter().cloned());
                }
                if let Some(subject) = subject.filter(|s| !s.is_empty()) {
                    if let Some(list) = categories.get(&subject.to_lowercase()) {
                        pool.extend(list.iter().cloned());
                    }
                }
            }
            Err(_) => warn!("Prompt catalog lock poisoned; skipping category prompts"),
        }
        if let Some(action) = action_type.filter(|s| !s.is_empty()) {
            if let Some(list) = self.actions.get(&action.to_lowercase()) {
                pool.extend(list.iter().cloned());
            }
        }
        pool
    }
}

impl Default for CatalogSuggester {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptSuggester for CatalogSuggester {
    fn suggest(&self, subject: Option<&str>, action_type: Option<&str>) -> Vec<String> {
        let mut pool = self.candidates(subject, action_type);
        pool.shuffle(&mut rand::rng());
        pool.truncate(MAX_SUGGESTIONS);
        pool
    }

    fn add_custom(&self, category: &str, prompt: &str) {
        match self.categories.write() {
            Ok(mut categories) => {
                categories
                    .entry(category.to_lowercase())
                    .or_default()
                    .push(prompt.to_string());
                info!(category, "Added custom educator prompt");
            }
            Err(_) => warn!(category, "Prompt catalog lock poisoned; custom prompt dropped"),
        }
    }

    fn prompts_by_category(&self, category: &str) -> Vec<String> {
        self.categories
            .read()
            .ok()
            .and_then(|c| c.get(&category.to_lowercase()).cloned())
            .unwrap_or_default()
    }
}
