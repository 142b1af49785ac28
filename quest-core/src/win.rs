use crate::scoring::accuracy;

/// Win condition applied when a session finishes. The two modes are
/// intentionally distinct: classic sessions count a simple correctness
/// majority, vocabulary-only sessions require a minimum accuracy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WinPolicy {
    /// More correct than wrong answers.
    Classic,
    /// Accuracy at or above the given percentage.
    AccuracyThreshold(f64),
}

impl WinPolicy {
    pub fn is_win(&self, correct_answers: i32, wrong_answers: i32) -> bool {
        match self {
            WinPolicy::Classic => correct_answers > wrong_answers,
            WinPolicy::AccuracyThreshold(threshold) => {
                accuracy(correct_answers, wrong_answers) >= *threshold
            }
        }
    }
}
