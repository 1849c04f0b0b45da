//! Question pool
//!
//! In every pool entry option 0 is the correct answer. Sessions shuffle the
//! options and remember where that answer landed.

use serde::{Deserialize, Serialize};

/// A pool question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub subject: String,
    pub prompt: String,
    /// Option 0 is correct
    pub options: Vec<String>,
    /// Optional explanation shown after answering
    #[serde(default)]
    pub background: Option<String>,
}

impl QuizQuestion {
    pub fn new(subject: &str, prompt: &str, options: &[&str]) -> Self {
        Self {
            subject: subject.to_string(),
            prompt: prompt.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            background: None,
        }
    }

    pub fn with_background(mut self, text: &str) -> Self {
        self.background = Some(text.to_string());
        self
    }

    pub fn correct_answer(&self) -> Option<&str> {
        self.options.first().map(String::as_str)
    }
}

/// Read-only question pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizBank {
    questions: Vec<QuizQuestion>,
}

impl QuizBank {
    /// Build a pool, dropping questions without options
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        let before = questions.len();
        let questions: Vec<_> = questions.into_iter().filter(|q| !q.options.is_empty()).collect();
        if questions.len() != before {
            log::warn!("Dropped {} quiz questions with no options", before - questions.len());
        }
        Self { questions }
    }

    /// The compiled-in pool
    pub fn builtin() -> Self {
        let questions = BUILTIN
            .iter()
            .map(|(subject, prompt, options, background)| {
                let q = QuizQuestion::new(subject, prompt, options);
                match background {
                    Some(text) => q.with_background(text),
                    None => q,
                }
            })
            .collect();
        Self::new(questions)
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Distinct subjects in pool order
    pub fn subjects(&self) -> Vec<&str> {
        let mut subjects: Vec<&str> = Vec::new();
        for q in &self.questions {
            if !subjects.contains(&q.subject.as_str()) {
                subjects.push(&q.subject);
            }
        }
        subjects
    }

    pub fn count_for(&self, subject: &str) -> usize {
        self.questions.iter().filter(|q| q.subject == subject).count()
    }
}

type Entry = (&'static str, &'static str, [&'static str; 4], Option<&'static str>);

const MATH: &str = "Mathematics";
const GEO: &str = "Geography";
const FARM: &str = "Farm Life";

#[rustfmt::skip]
const BUILTIN: &[Entry] = &[
    (MATH, "What is 7 × 8?", ["56", "54", "64", "48"], None),
    (MATH, "What is 144 ÷ 12?", ["12", "11", "14", "10"], None),
    (MATH, "What is 15% of 200?", ["30", "15", "20", "35"], None),
    (MATH, "What is the square root of 81?", ["9", "8", "7", "18"], None),
    (MATH, "What is 2 to the power of 10?", ["1024", "512", "2048", "100"], None),
    (MATH, "How many degrees are in a right angle?", ["90", "180", "45", "360"], None),
    (MATH, "What is 3/4 as a decimal?", ["0.75", "0.34", "0.25", "0.7"], None),
    (MATH, "What is the next prime after 7?", ["11", "9", "13", "10"], Some("9 = 3 × 3, so it is not prime.")),
    (MATH, "What is 9 + 6 × 2?", ["21", "30", "27", "17"], Some("Multiplication comes before addition.")),
    (MATH, "How many sides does a hexagon have?", ["6", "5", "8", "7"], None),
    (MATH, "What is 1000 − 387?", ["613", "623", "713", "687"], None),
    (MATH, "What is the perimeter of a 3 × 5 rectangle?", ["16", "15", "8", "30"], None),
    (MATH, "What is the area of a 4 × 6 rectangle?", ["24", "20", "10", "26"], None),
    (MATH, "What is 0.5 × 0.5?", ["0.25", "1", "0.5", "2.5"], None),
    (MATH, "What is 11 squared?", ["121", "111", "112", "1111"], None),
    (MATH, "How many minutes are in 2.5 hours?", ["150", "125", "250", "130"], None),
    (MATH, "What is −3 × −4?", ["12", "−12", "7", "−7"], Some("Two negatives multiply to a positive.")),
    (MATH, "What is the sum of the angles of a triangle?", ["180°", "360°", "90°", "270°"], None),
    (MATH, "What is 5! (five factorial)?", ["120", "25", "60", "720"], None),
    (MATH, "Which is the smallest: 1/2, 1/3, 2/5, 3/8?", ["1/3", "1/2", "2/5", "3/8"], None),
    (MATH, "What is 20% of 45?", ["9", "4.5", "20", "11"], None),
    (MATH, "What is the median of 3, 9, 4, 7, 1?", ["4", "7", "3", "4.8"], Some("Sort first: 1, 3, 4, 7, 9.")),

    (GEO, "What is the capital of Norway?", ["Oslo", "Bergen", "Stockholm", "Helsinki"], None),
    (GEO, "Which is the longest river in Africa?", ["Nile", "Congo", "Niger", "Zambezi"], None),
    (GEO, "Which ocean lies between Africa and Australia?", ["Indian", "Pacific", "Atlantic", "Arctic"], None),
    (GEO, "What is the largest country by area?", ["Russia", "Canada", "China", "USA"], None),
    (GEO, "Mount Everest sits on the border of Nepal and…?", ["China", "India", "Bhutan", "Pakistan"], None),
    (GEO, "What is the capital of Canada?", ["Ottawa", "Toronto", "Vancouver", "Montreal"], None),
    (GEO, "Which desert is the largest hot desert?", ["Sahara", "Gobi", "Kalahari", "Mojave"], None),

    (FARM, "What are potato chips fried in?", ["Oil", "Water", "Milk", "Vinegar"], None),
    (FARM, "What is a young goat called?", ["Kid", "Calf", "Foal", "Lamb"], None),
    (FARM, "Which part of the potato plant do we eat?", ["Tuber", "Root hair", "Flower", "Leaf"], Some("A tuber is a swollen underground stem.")),
    (FARM, "What does a septic tank treat?", ["Household wastewater", "Drinking water", "Rainwater", "Fuel"], None),
    (FARM, "Bats mostly hunt using…?", ["Echolocation", "Smell", "Heat vision", "Magnetism"], None),
    (FARM, "What do goats have instead of upper front teeth?", ["A dental pad", "Tusks", "Baleen", "Nothing"], None),
];
