//! Quizzes
//!
//! A static pool of questions, sessions sampled from it, and running
//! per-subject totals.

pub mod bank;
pub mod engine;
pub mod session;
pub mod stats;

pub use bank::{QuizBank, QuizQuestion};
pub use engine::make_session;
pub use session::{QuizError, QuizPhase, QuizResult, QuizSession, SessionQuestion};
pub use stats::{QuizStatsStore, SubjectStats};
