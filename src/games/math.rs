use crossterm::event::KeyCode;
use rand::Rng;

use crate::core::game::{InitResult, ScoreReporter};
use crate::core::host::HostContext;
use crate::core::prefs::Tone;
use crate::games::session::{Screen, Session};

const QUESTIONS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub a: i32,
    pub b: i32,
    pub op: char,
}

impl Question {
    pub fn random(rng: &mut impl Rng) -> Self {
        let op = ['+', '-', 'x'][rng.random_range(0..3)];
        Self {
            a: rng.random_range(1..=10),
            b: rng.random_range(1..=10),
            op,
        }
    }

    pub fn answer(&self) -> i32 {
        match self.op {
            '+' => self.a + self.b,
            '-' => self.a - self.b,
            _ => self.a * self.b,
        }
    }
}

pub struct MathQuiz {
    score: u32,
    /// 1-based number of the question on screen.
    asked: u32,
    question: Question,
    input: String,
    done: bool,
}

impl MathQuiz {
    pub fn new() -> Self {
        Self {
            score: 0,
            asked: 1,
            question: Question::random(&mut rand::rng()),
            input: String::new(),
            done: false,
        }
    }

    /// Grades the typed answer and moves on. Returns whether it was right,
    /// or `None` when nothing was typed.
    pub fn submit(&mut self, next: Question) -> Option<bool> {
        if self.done {
            return None;
        }
        let value: i32 = self.input.parse().ok()?;
        self.input.clear();
        let correct = value == self.question.answer();
        if correct {
            self.score += 1;
        }
        if self.asked == QUESTIONS {
            self.done = true;
        } else {
            self.asked += 1;
            self.question = next;
        }
        Some(correct)
    }
}

impl Default for MathQuiz {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for MathQuiz {
    fn render(&self) -> Vec<String> {
        if self.done {
            return vec![format!("Done! Score: {}/{QUESTIONS}", self.score)];
        }
        let q = &self.question;
        vec![
            format!("Q{}: {} {} {} = ?", self.asked, q.a, q.op, q.b),
            String::new(),
            format!("> {}_", self.input),
            String::new(),
            format!("Score: {}", self.score),
            String::new(),
            "Type the answer, [Enter] to submit".into(),
        ]
    }
}

pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult {
    let session = Session::start(ctx, MathQuiz::new());

    session.on_key(move |s, key| match key.code {
        KeyCode::Char(ch) if ch.is_ascii_digit() || (ch == '-') => s.update(|quiz| {
            if quiz.input.len() < 4 && (ch != '-' || quiz.input.is_empty()) {
                quiz.input.push(ch);
            }
        }),
        KeyCode::Backspace => s.update(|quiz| {
            quiz.input.pop();
        }),
        KeyCode::Enter => {
            let next = Question::random(&mut rand::rng());
            let Some((correct, done, score)) =
                s.update(|quiz| quiz.submit(next).map(|c| (c, quiz.done, quiz.score)))
            else {
                return;
            };
            s.ctx().sound.beep(if correct { Tone::Win } else { Tone::Lose });
            if done {
                report.report(score);
            }
        }
        _ => {}
    });
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers() {
        assert_eq!(Question { a: 3, b: 7, op: '-' }.answer(), -4);
        assert_eq!(Question { a: 3, b: 7, op: 'x' }.answer(), 21);
    }

    #[test]
    fn ten_questions_then_done() {
        let mut quiz = MathQuiz::new();
        let easy = Question { a: 1, b: 1, op: '+' };
        quiz.question = easy;
        for i in 0..QUESTIONS {
            quiz.input = if i % 2 == 0 { "2".into() } else { "0".into() };
            assert_eq!(quiz.submit(easy), Some(i % 2 == 0));
        }
        assert!(quiz.done);
        assert_eq!(quiz.score, 5);
        quiz.input = "2".into();
        assert_eq!(quiz.submit(easy), None);
    }
}
