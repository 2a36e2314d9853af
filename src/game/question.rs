//! # Static question catalog.
//!
//! A [`Catalog`] is fixed at startup and never changes. Every [`Question`]
//! carries at least two options; validation happens once, at construction,
//! so the rest of the pipeline never has to re-check it.

use std::sync::Arc;

use rand::Rng;

use crate::error::CatalogError;

/// A validated question with its ordered answer options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<String>,
}

impl Question {
    /// Creates a question, rejecting fewer than two options.
    pub fn new<I, S>(text: impl Into<String>, options: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let text = text.into();
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        if options.len() < 2 {
            return Err(CatalogError::TooFewOptions {
                question: text,
                count: options.len(),
            });
        }
        Ok(Self { text, options })
    }

    /// Question text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Ordered answer options; indices are the only legal answers.
    pub fn options(&self) -> &[String] {
        &self.options
    }
}

/// Fixed, ordered, non-empty list of questions.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<Arc<Question>>,
}

impl Catalog {
    /// Builds a catalog from validated questions.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self {
            questions: questions.into_iter().map(Arc::new).collect(),
        })
    }

    /// Builds a catalog from `(question, options)` pairs.
    ///
    /// # Example
    /// ```
    /// use triviavisor::Catalog;
    ///
    /// let catalog = Catalog::from_pairs([("2+2?", vec!["3", "4", "5", "6"])]).unwrap();
    /// assert_eq!(catalog.len(), 1);
    /// ```
    pub fn from_pairs<I, Q, O, S>(pairs: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (Q, O)>,
        Q: Into<String>,
        O: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let questions = pairs
            .into_iter()
            .map(|(q, opts)| Question::new(q, opts))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(questions)
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// True if the catalog holds no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions in catalog order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().map(AsRef::as_ref)
    }

    /// Picks one question uniformly at random.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Arc<Question> {
        let idx = rng.random_range(0..self.questions.len());
        Arc::clone(&self.questions[idx])
    }
}

impl Default for Catalog {
    /// The three-question baseline catalog.
    fn default() -> Self {
        let q = |text: &str, options: [&str; 4]| Question {
            text: text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        };
        Self {
            questions: vec![
                Arc::new(q(
                    "What is the capital of France?",
                    ["Paris", "London", "Rome", "Berlin"],
                )),
                Arc::new(q("What is 2 + 2?", ["3", "4", "5", "6"])),
                Arc::new(q(
                    "What is the capital of Spain?",
                    ["Madrid", "Lisbon", "Barcelona", "Seville"],
                )),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn rejects_single_option_questions() {
        let err = Question::new("Only one?", ["yes"]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::TooFewOptions {
                question: "Only one?".into(),
                count: 1,
            }
        );
    }

    #[test]
    fn rejects_empty_catalog() {
        assert_eq!(Catalog::new(Vec::new()).unwrap_err(), CatalogError::Empty);
    }

    #[test]
    fn default_catalog_has_three_questions() {
        let catalog = Catalog::default();
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());
        assert!(catalog.questions().all(|q| q.options().len() == 4));
    }

    #[test]
    fn pick_stays_inside_the_catalog() {
        let catalog = Catalog::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let q = catalog.pick(&mut rng);
            assert!(catalog.questions().any(|c| c == q.as_ref()));
        }
    }

    #[test]
    fn single_entry_catalog_is_deterministic() {
        let catalog = Catalog::from_pairs([("2+2?", ["3", "4", "5", "6"])]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(catalog.pick(&mut rng).text(), "2+2?");
    }
}
