// src/pipeline/classify.rs

//! Role relevance classification.
//!
//! Decides whether a posting belongs to the L&D role family using the
//! keyword lists from `[classifier]`. Rules, in order:
//!
//! 1. A deny keyword in the title rejects the posting.
//! 2. A guarded term in the title (e.g. "enablement") rejects the posting when
//!    the title also holds an ops/admin term ("salesforce", "quota", ...), and
//!    otherwise requires a learning keyword in the title or description. This
//!    keeps sales/revenue enablement roles out.
//! 3. Otherwise the posting is relevant iff an allow keyword appears in the
//!    title or description.
//!
//! Matching is case-insensitive substring matching.

use crate::models::{ClassifierConfig, Posting};
use crate::utils::{contains_any, lowercase_all};

/// Keyword-list classifier. Lists are lowercased once on construction.
#[derive(Debug, Clone)]
pub struct RoleClassifier {
    allow: Vec<String>,
    deny_title: Vec<String>,
    guarded: Vec<String>,
    guarded_deny: Vec<String>,
    guarded_require: Vec<String>,
}

/// Why a posting was accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Relevant,
    DeniedTitle,
    GuardedWithoutLearning,
    NoAllowKeyword,
}

impl RoleClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            allow: lowercase_all(&config.allow_keywords),
            deny_title: lowercase_all(&config.deny_title_keywords),
            guarded: lowercase_all(&config.guarded_terms),
            guarded_deny: lowercase_all(&config.guarded_deny_title),
            guarded_require: lowercase_all(&config.guarded_require_any),
        }
    }

    /// Whether the posting is an L&D role.
    pub fn is_relevant(&self, posting: &Posting) -> bool {
        self.verdict(&posting.title, &posting.description) == Verdict::Relevant
    }

    /// Classify from title and description alone.
    pub fn verdict(&self, title: &str, description: &str) -> Verdict {
        let title = title.to_lowercase();
        let description = description.to_lowercase();

        if contains_any(&title, &self.deny_title) {
            return Verdict::DeniedTitle;
        }

        let in_either = |needles: &[String]| {
            contains_any(&title, needles) || contains_any(&description, needles)
        };

        if contains_any(&title, &self.guarded) {
            if contains_any(&title, &self.guarded_deny) {
                return Verdict::DeniedTitle;
            }
            if !in_either(self.guarded_require.as_slice()) {
                return Verdict::GuardedWithoutLearning;
            }
        }

        if in_either(self.allow.as_slice()) {
            Verdict::Relevant
        } else {
            Verdict::NoAllowKeyword
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RoleClassifier {
        RoleClassifier::new(&ClassifierConfig::default())
    }

    #[test]
    fn test_role_family_titles_are_relevant() {
        let c = classifier();
        assert_eq!(c.verdict("Instructional Designer", ""), Verdict::Relevant);
        assert_eq!(c.verdict("Corporate Trainer", ""), Verdict::Relevant);
        assert_eq!(c.verdict("L&D Coordinator", ""), Verdict::Relevant);
    }

    #[test]
    fn test_custom_deny_list_rejects_sales_enablement() {
        let mut config = ClassifierConfig::default();
        config.deny_title_keywords = vec!["Sales".to_string()];
        let c = RoleClassifier::new(&config);

        assert_eq!(
            c.verdict("Sales Enablement Manager", "Design onboarding and training"),
            Verdict::DeniedTitle
        );
    }

    #[test]
    fn test_ops_terms_only_reject_enablement_titles() {
        let c = classifier();
        assert_eq!(
            c.verdict("Salesforce Enablement Manager", "Run training for new hires"),
            Verdict::DeniedTitle
        );
        assert_eq!(
            c.verdict("RevOps Enablement Lead", "learning programs"),
            Verdict::DeniedTitle
        );
        assert_eq!(c.verdict("Salesforce Trainer", ""), Verdict::Relevant);
        assert_eq!(
            c.verdict("RevOps Training Lead", "learning programs"),
            Verdict::Relevant
        );
    }

    #[test]
    fn test_enablement_needs_learning_context() {
        let c = classifier();
        assert_eq!(
            c.verdict("Enablement Manager", "Own quarterly business reviews"),
            Verdict::GuardedWithoutLearning
        );
        assert_eq!(
            c.verdict("Enablement Manager", "Build onboarding curriculum for new hires"),
            Verdict::Relevant
        );
        assert_eq!(c.verdict("Learning Enablement Partner", ""), Verdict::Relevant);
    }

    #[test]
    fn test_description_can_carry_allow_keyword() {
        let c = classifier();
        assert_eq!(
            c.verdict("Program Specialist", "Facilitate Learning sessions"),
            Verdict::Relevant
        );
        assert_eq!(
            c.verdict("Accountant", "Reconcile ledgers"),
            Verdict::NoAllowKeyword
        );
    }

    #[test]
    fn test_is_relevant_is_deterministic() {
        let c = classifier();
        let posting = Posting {
            title: "Instructional Designer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            salary: None,
            url: "https://x.io/1".to_string(),
            source: "indeed".to_string(),
            description: String::new(),
            level: None,
            category: crate::models::Category::InstructionalDesign,
            posted: None,
        };
        let first = c.is_relevant(&posting);
        for _ in 0..10 {
            assert_eq!(c.is_relevant(&posting), first);
        }
        assert!(first);
    }
}
