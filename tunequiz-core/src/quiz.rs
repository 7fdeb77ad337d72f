//! The three-question quiz.
//!
//! Answers are validated against a fixed catalogue and turned into the free
//! text used by the search proxy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for quiz answers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuizError {
    /// The value is not one of the question's options.
    #[error("`{value}` is not a valid answer to `{question}`")]
    UnknownOption { question: &'static str, value: String },
}

/// One multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub text: &'static str,
    pub options: &'static [&'static str],
}

pub const GENRE: Question = Question {
    id: "genre",
    text: "What genre do you prefer?",
    options: &["Rock", "Pop", "Hip Hop", "Electronic", "Metal", "Jazz", "Classical"],
};

pub const MOOD: Question = Question {
    id: "mood",
    text: "What mood are you in?",
    options: &["Energetic", "Relaxed", "Happy", "Melancholic", "Focus", "Party"],
};

pub const ERA: Question = Question {
    id: "era",
    text: "Which era do you prefer?",
    options: &["60s", "70s", "80s", "90s", "2000s", "Modern"],
};

/// The questions in the order the wizard asks them.
pub fn questions() -> [Question; 3] {
    [GENRE, MOOD, ERA]
}

impl Question {
    /// Find the canonical spelling of an option, ignoring case.
    pub fn canonical(&self, value: &str) -> Option<&'static str> {
        let value = value.trim();
        self.options
            .iter()
            .copied()
            .find(|option| option.eq_ignore_ascii_case(value))
    }

    fn require(&self, value: &str) -> Result<String, QuizError> {
        self.canonical(value)
            .map(str::to_string)
            .ok_or_else(|| QuizError::UnknownOption {
                question: self.id,
                value: value.to_string(),
            })
    }

    /// Match the longest option that prefixes `words`, returning it and the
    /// number of words consumed.
    fn match_prefix(&self, words: &[&str]) -> Option<(&'static str, usize)> {
        self.options
            .iter()
            .copied()
            .filter_map(|option| {
                let parts: Vec<&str> = option.split_whitespace().collect();
                let matches = parts.len() <= words.len()
                    && parts
                        .iter()
                        .zip(words)
                        .all(|(a, b)| a.eq_ignore_ascii_case(b));
                matches.then_some((option, parts.len()))
            })
            .max_by_key(|(_, len)| *len)
    }
}

/// A complete, validated set of answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswers {
    pub genre: String,
    pub mood: String,
    pub era: String,
}

impl QuizAnswers {
    /// Validate answers, normalising them to the catalogue spelling.
    pub fn new(genre: &str, mood: &str, era: &str) -> Result<Self, QuizError> {
        Ok(Self {
            genre: GENRE.require(genre)?,
            mood: MOOD.require(mood)?,
            era: ERA.require(era)?,
        })
    }

    /// Recognise `"{genre} {mood} {era}"` as sent by the wizard.
    ///
    /// Multi-word options such as `Hip Hop` are matched greedily. Returns
    /// `None` unless the whole query is consumed.
    pub fn from_query(query: &str) -> Option<Self> {
        let words: Vec<&str> = query.split_whitespace().collect();
        let mut rest = words.as_slice();
        let mut picked = Vec::with_capacity(3);

        for question in questions() {
            let (option, used) = question.match_prefix(rest)?;
            picked.push(option.to_string());
            rest = &rest[used..];
        }

        if !rest.is_empty() {
            return None;
        }

        let era = picked.pop()?;
        let mood = picked.pop()?;
        let genre = picked.pop()?;
        Some(Self { genre, mood, era })
    }

    /// Free text sent to the search surface.
    pub fn search_text(&self) -> String {
        format!("{} {} music {}", self.genre, self.mood, self.era)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_questions_order() {
        let ids: Vec<&str> = questions().iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["genre", "mood", "era"]);
    }

    #[test]
    fn test_answers_are_normalised() {
        let answers = QuizAnswers::new("hip hop", "PARTY", "90s").unwrap();
        assert_eq!(answers.genre, "Hip Hop");
        assert_eq!(answers.mood, "Party");
        assert_eq!(answers.search_text(), "Hip Hop Party music 90s");
    }

    #[test]
    fn test_unknown_answer_rejected() {
        let err = QuizAnswers::new("Polka", "Happy", "80s").unwrap_err();
        assert_eq!(
            err,
            QuizError::UnknownOption {
                question: "genre",
                value: "Polka".to_string()
            }
        );
    }

    #[test]
    fn test_from_query_handles_multi_word_genre() {
        let answers = QuizAnswers::from_query("Hip Hop Relaxed 2000s").unwrap();
        assert_eq!(answers, QuizAnswers::new("Hip Hop", "Relaxed", "2000s").unwrap());
    }

    #[test]
    fn test_from_query_rejects_free_text() {
        assert!(QuizAnswers::from_query("lofi beats to study to").is_none());
        assert!(QuizAnswers::from_query("Rock Happy 80s extra").is_none());
        assert!(QuizAnswers::from_query("Rock Happy").is_none());
    }
}
