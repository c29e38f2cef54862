//! Suggested questions offered next to the input field
//!
//! Two pools exist per session: a static one sampled from a fixed seed list
//! at session start, and a dynamic one replaced by each service reply.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// Ordered set of candidate questions
///
/// Entries are non-empty and unique; selecting one removes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SuggestionPool {
    questions: Vec<String>,
}

impl SuggestionPool {
    /// Build a pool, dropping blank and repeated questions (first one wins)
    pub fn from_questions<I, S>(questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pool = Self::default();
        pool.replace(questions);
        pool
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn contains(&self, question: &str) -> bool {
        self.questions.iter().any(|q| q == question)
    }

    /// Remove `question` from the pool; returns false if it wasn't there
    pub fn take(&mut self, question: &str) -> bool {
        let before = self.questions.len();
        self.questions.retain(|q| q != question);
        self.questions.len() != before
    }

    /// Replace the whole pool, keeping the given order
    pub fn replace<I, S>(&mut self, questions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.questions.clear();
        for question in questions {
            let question = question.into();
            if !question.trim().is_empty() && !self.contains(&question) {
                self.questions.push(question);
            }
        }
    }

    pub fn clear(&mut self) {
        self.questions.clear();
    }
}

/// Return a uniformly shuffled copy of `items`
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

/// Sample up to `count` distinct questions from `seed`
pub fn sample_pool<R: Rng + ?Sized>(seed: &[String], count: usize, rng: &mut R) -> SuggestionPool {
    let candidates = SuggestionPool::from_questions(seed.iter().cloned());
    SuggestionPool::from_questions(shuffle(candidates.questions(), rng).into_iter().take(count))
}
