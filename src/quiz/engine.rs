//! Session construction: sample, shuffle, remap the correct answer

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::bank::QuizQuestion;
use super::session::{QuizSession, SessionQuestion};

/// Build a session of exactly `question_count` distinct questions on `subject`.
///
/// Returns `None` when the count is zero or the pool has too few matching
/// questions; partial sessions are never built.
pub fn make_session<R: Rng + ?Sized>(
    subject: &str,
    pool: &[QuizQuestion],
    question_count: usize,
    rng: &mut R,
) -> Option<QuizSession> {
    if question_count == 0 {
        return None;
    }

    let matching: Vec<&QuizQuestion> = pool
        .iter()
        .filter(|q| q.subject == subject && !q.options.is_empty())
        .collect();
    if matching.len() < question_count {
        log::warn!(
            "Quiz '{}' needs {} questions, pool has {}",
            subject,
            question_count,
            matching.len()
        );
        return None;
    }

    let mut sampled: Vec<&QuizQuestion> = matching
        .choose_multiple(rng, question_count)
        .copied()
        .collect();
    sampled.shuffle(rng);

    let questions = sampled
        .into_iter()
        .map(|q| shuffle_options(q, rng))
        .collect();

    Some(QuizSession::new(subject.to_string(), questions))
}

/// Shuffle a question's options, tracking where option 0 ends up
fn shuffle_options<R: Rng + ?Sized>(question: &QuizQuestion, rng: &mut R) -> SessionQuestion {
    let mut order: Vec<usize> = (0..question.options.len()).collect();
    order.shuffle(rng);

    let correct_option_index = order.iter().position(|&i| i == 0).unwrap_or(0);
    let options = order.iter().map(|&i| question.options[i].clone()).collect();

    SessionQuestion {
        prompt: question.prompt.clone(),
        options,
        correct_option_index,
        background: question.background.clone(),
    }
}
