//! L&D specialty buckets used for landing-page counts.

use serde::Serialize;

use crate::models::Posting;

/// A specialty and the phrases that place a posting in it.
#[derive(Debug, Clone, Copy)]
pub struct Specialty {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

pub const SPECIALTIES: &[Specialty] = &[
    Specialty {
        name: "Instructional Design",
        keywords: &["instructional design", "curriculum design"],
    },
    Specialty {
        name: "E-Learning Development",
        keywords: &["e-learning", "elearning", "digital learning", "online learning"],
    },
    Specialty {
        name: "Training & Facilitation",
        keywords: &["training", "facilitator", "trainer", "facilitation"],
    },
    Specialty {
        name: "Learning Management",
        keywords: &["learning management", "lms", "learning admin"],
    },
    Specialty {
        name: "Curriculum Development",
        keywords: &["curriculum", "course design", "content develop"],
    },
    Specialty {
        name: "Corporate Training",
        keywords: &["corporate training", "corporate learning", "workplace learning"],
    },
    Specialty {
        name: "Learning Technology",
        keywords: &["learning tech", "edtech", "learning system", "learning platform"],
    },
    Specialty {
        name: "Talent Development",
        keywords: &["talent develop", "talent management", "l&d manager", "learning director"],
    },
];

/// Number of postings matching one specialty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialtyCount {
    pub name: &'static str,
    pub count: usize,
}

impl Specialty {
    /// Whether any keyword appears in the title or description.
    pub fn matches(&self, posting: &Posting) -> bool {
        let title = posting.title.to_lowercase();
        let description = posting.description.to_lowercase();
        self.keywords
            .iter()
            .any(|kw| title.contains(kw) || description.contains(kw))
    }
}

/// Count postings per specialty. A posting may land in several buckets.
pub fn count_specialties<'a>(postings: impl IntoIterator<Item = &'a Posting>) -> Vec<SpecialtyCount> {
    let mut counts: Vec<SpecialtyCount> = SPECIALTIES
        .iter()
        .map(|s| SpecialtyCount {
            name: s.name,
            count: 0,
        })
        .collect();

    for posting in postings {
        for (specialty, count) in SPECIALTIES.iter().zip(counts.iter_mut()) {
            if specialty.matches(posting) {
                count.count += 1;
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Level};

    fn posting(title: &str, description: &str) -> Posting {
        Posting {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            salary: None,
            url: format!("https://example.com/{}", title.len()),
            source: "indeed".to_string(),
            description: description.to_string(),
            level: Level::infer(title),
            category: Category::infer(title),
            posted: None,
        }
    }

    #[test]
    fn counts_overlapping_specialties() {
        let postings = vec![
            posting("Corporate Trainer", "Deliver corporate training sessions"),
            posting("Instructional Designer", "Instructional design for eLearning"),
            posting("LMS Administrator", ""),
        ];
        let counts = count_specialties(&postings);
        let get = |name: &str| counts.iter().find(|c| c.name == name).unwrap().count;

        assert_eq!(counts.len(), SPECIALTIES.len());
        assert_eq!(get("Training & Facilitation"), 1);
        assert_eq!(get("Corporate Training"), 1);
        assert_eq!(get("Instructional Design"), 1);
        assert_eq!(get("E-Learning Development"), 1);
        assert_eq!(get("Learning Management"), 1);
        assert_eq!(get("Talent Development"), 0);
    }
}
