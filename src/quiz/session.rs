//! Per-play quiz state
//!
//! Intro → Answering(0..N) → Results. Results is terminal; the session is
//! dropped when the dialog closes.

use thiserror::Error;

use super::stats::{QuizStatsStore, SubjectStats};

/// A question as shown in one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuestion {
    pub prompt: String,
    /// Shuffled copy of the pool options
    pub options: Vec<String>,
    /// Where the pool's option 0 landed
    pub correct_option_index: usize,
    pub background: Option<String>,
}

/// Where the quiz dialog is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Intro,
    Answering(usize),
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("Question {0} does not exist")]
    NoSuchQuestion(usize),
    #[error("Option {option} is not valid for question {question}")]
    NoSuchOption { question: usize, option: usize },
    #[error("Answer every question before submitting")]
    NotAllAnswered,
    #[error("This quiz was already submitted")]
    AlreadySubmitted,
    #[error("No question is showing")]
    NotAnswering,
}

/// Outcome of a submitted quiz
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub subject: String,
    pub question_count: usize,
    pub correct_count: usize,
    /// Running totals for the subject after this submission
    pub stats: SubjectStats,
}

impl QuizResult {
    pub fn percent_correct(&self) -> u32 {
        if self.question_count == 0 {
            return 0;
        }
        (self.correct_count * 100 / self.question_count) as u32
    }
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    subject: String,
    questions: Vec<SessionQuestion>,
    /// One slot per question
    selected: Vec<Option<usize>>,
    current: usize,
    phase: QuizPhase,
}

impl QuizSession {
    pub(crate) fn new(subject: String, questions: Vec<SessionQuestion>) -> Self {
        let selected = vec![None; questions.len()];
        Self {
            subject,
            questions,
            selected,
            current: 0,
            phase: QuizPhase::Intro,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn questions(&self) -> &[SessionQuestion] {
        &self.questions
    }

    pub fn selected_option_indexes(&self) -> &[Option<usize>] {
        &self.selected
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&SessionQuestion> {
        match self.phase {
            QuizPhase::Answering(i) => self.questions.get(i),
            _ => None,
        }
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn all_answered(&self) -> bool {
        self.selected.iter().all(Option::is_some)
    }

    /// True on the last question with every slot filled
    pub fn can_submit(&self) -> bool {
        self.phase == QuizPhase::Answering(self.questions.len().saturating_sub(1))
            && self.all_answered()
    }

    /// Leave the intro pane
    pub fn start(&mut self) {
        if self.phase == QuizPhase::Intro {
            self.current = 0;
            self.phase = QuizPhase::Answering(0);
        }
    }

    /// Pick an option for the question on screen. Re-selecting overwrites.
    pub fn select(&mut self, option: usize) -> Result<(), QuizError> {
        let QuizPhase::Answering(i) = self.phase else {
            return Err(QuizError::NotAnswering);
        };
        self.answer(i, option)
    }

    /// Record an answer for any question without moving the cursor
    pub fn answer(&mut self, question: usize, option: usize) -> Result<(), QuizError> {
        if self.phase == QuizPhase::Results {
            return Err(QuizError::AlreadySubmitted);
        }
        let q = self
            .questions
            .get(question)
            .ok_or(QuizError::NoSuchQuestion(question))?;
        if option >= q.options.len() {
            return Err(QuizError::NoSuchOption { question, option });
        }
        self.selected[question] = Some(option);
        Ok(())
    }

    /// Move forward; stays on the last question
    pub fn next(&mut self) -> QuizPhase {
        match self.phase {
            QuizPhase::Intro => self.start(),
            QuizPhase::Answering(i) if i + 1 < self.questions.len() => {
                self.current = i + 1;
                self.phase = QuizPhase::Answering(i + 1);
            }
            _ => {}
        }
        self.phase
    }

    /// Move back; from the first question returns to the intro
    pub fn previous(&mut self) -> QuizPhase {
        if let QuizPhase::Answering(i) = self.phase {
            if i == 0 {
                self.phase = QuizPhase::Intro;
            } else {
                self.current = i - 1;
                self.phase = QuizPhase::Answering(i - 1);
            }
        }
        self.phase
    }

    pub fn correct_answer_count(&self) -> usize {
        self.questions
            .iter()
            .zip(&self.selected)
            .filter(|(q, s)| **s == Some(q.correct_option_index))
            .count()
    }

    /// Score the quiz, fold it into `stats`, and move to Results
    pub fn submit(&mut self, stats: &mut QuizStatsStore) -> Result<QuizResult, QuizError> {
        if self.phase == QuizPhase::Results {
            return Err(QuizError::AlreadySubmitted);
        }
        if !self.all_answered() {
            return Err(QuizError::NotAllAnswered);
        }

        let correct_count = self.correct_answer_count();
        let stats = stats.record(&self.subject, self.questions.len() as u64, correct_count as u64);
        self.phase = QuizPhase::Results;
        log::info!(
            "Quiz '{}' submitted: {}/{} correct",
            self.subject,
            correct_count,
            self.questions.len()
        );

        Ok(QuizResult {
            subject: self.subject.clone(),
            question_count: self.questions.len(),
            correct_count,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(n: usize) -> QuizSession {
        let questions = (0..n)
            .map(|i| SessionQuestion {
                prompt: format!("q{i}"),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_option_index: i % 4,
                background: None,
            })
            .collect();
        QuizSession::new("Mathematics".into(), questions)
    }

    /// Answer the first `right` questions correctly and the rest wrong
    fn answer_with(session: &mut QuizSession, right: usize) {
        for i in 0..session.questions().len() {
            let correct = session.questions()[i].correct_option_index;
            let pick = if i < right { correct } else { (correct + 1) % 4 };
            session.answer(i, pick).unwrap();
        }
    }

    #[test]
    fn test_navigation() {
        let mut s = session(3);
        assert_eq!(s.phase(), QuizPhase::Intro);
        assert_eq!(s.select(0), Err(QuizError::NotAnswering));
        assert_eq!(s.next(), QuizPhase::Answering(0));
        assert_eq!(s.next(), QuizPhase::Answering(1));
        assert_eq!(s.next(), QuizPhase::Answering(2));
        assert_eq!(s.next(), QuizPhase::Answering(2));
        assert_eq!(s.current_index(), 2);
        assert_eq!(s.previous(), QuizPhase::Answering(1));
        assert_eq!(s.previous(), QuizPhase::Answering(0));
        assert_eq!(s.previous(), QuizPhase::Intro);
    }

    #[test]
    fn test_select_overwrites_and_keeps_cursor() {
        let mut s = session(2);
        s.start();
        s.select(1).unwrap();
        s.select(3).unwrap();
        assert_eq!(s.selected_option_indexes(), &[Some(3), None]);
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.select(4), Err(QuizError::NoSuchOption { question: 0, option: 4 }));
    }

    #[test]
    fn test_submit_requires_all_answers() {
        let mut s = session(2);
        let mut stats = QuizStatsStore::default();
        s.start();
        s.select(0).unwrap();
        assert_eq!(s.submit(&mut stats), Err(QuizError::NotAllAnswered));
        assert_eq!(stats.get("Mathematics"), SubjectStats::default());
    }

    #[test]
    fn test_two_submissions_accumulate() {
        let mut stats = QuizStatsStore::default();

        let mut first = session(5);
        first.start();
        answer_with(&mut first, 3);
        let result = first.submit(&mut stats).unwrap();
        assert_eq!(result.correct_count, 3);
        assert_eq!(result.percent_correct(), 60);
        assert_eq!(stats.get("Mathematics"), SubjectStats { answered: 5, correct: 3 });
        assert_eq!(first.phase(), QuizPhase::Results);
        assert_eq!(first.submit(&mut stats), Err(QuizError::AlreadySubmitted));

        let mut second = session(5);
        answer_with(&mut second, 2);
        second.submit(&mut stats).unwrap();
        assert_eq!(stats.get("Mathematics"), SubjectStats { answered: 10, correct: 5 });
    }

    #[test]
    fn test_can_submit_only_on_last_question() {
        let mut s = session(2);
        answer_with(&mut s, 2);
        s.start();
        assert!(!s.can_submit());
        s.next();
        assert!(s.can_submit());
    }
}
