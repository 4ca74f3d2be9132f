use std::cmp::Ordering;

use crossterm::event::KeyCode;
use rand::Rng;

use crate::core::game::{InitResult, ScoreReporter};
use crate::core::host::HostContext;
use crate::core::prefs::Tone;
use crate::games::session::{Screen, Session};

pub struct NumberGuess {
    secret: u32,
    tries: u32,
    input: String,
    feedback: String,
    solved: bool,
}

impl NumberGuess {
    pub fn new(secret: u32) -> Self {
        Self {
            secret,
            tries: 0,
            input: String::new(),
            feedback: String::new(),
            solved: false,
        }
    }

    pub fn random() -> Self {
        Self::new(rand::rng().random_range(1..=100))
    }

    /// Checks the typed guess against the secret. `None` when nothing
    /// usable was typed.
    pub fn submit(&mut self) -> Option<Ordering> {
        let guess = self.input.parse::<u32>().ok().filter(|&g| g > 0)?;
        self.input.clear();
        self.tries += 1;
        let ordering = guess.cmp(&self.secret);
        self.feedback = match ordering {
            Ordering::Less => "Too low!".into(),
            Ordering::Greater => "Too high!".into(),
            Ordering::Equal => {
                self.solved = true;
                format!("Correct in {} tries!", self.tries)
            }
        };
        Some(ordering)
    }

    pub fn score(&self) -> i64 {
        101 - i64::from(self.tries)
    }
}

impl Screen for NumberGuess {
    fn render(&self) -> Vec<String> {
        vec![
            "I'm thinking of a number between 1 and 100.".into(),
            String::new(),
            format!("Guess: {}_", self.input),
            String::new(),
            self.feedback.clone(),
            String::new(),
            if self.solved {
                "[n] new number".into()
            } else {
                "Type digits, [Enter] to guess".into()
            },
        ]
    }
}

pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult {
    let session = Session::start(ctx, NumberGuess::random());

    session.on_key(move |s, key| match key.code {
        KeyCode::Char(ch) if ch.is_ascii_digit() => s.update(|game| {
            if !game.solved && game.input.len() < 3 {
                game.input.push(ch);
            }
        }),
        KeyCode::Backspace => s.update(|game| {
            game.input.pop();
        }),
        KeyCode::Enter => {
            let outcome = s.update(|game| {
                if game.solved {
                    return None;
                }
                game.submit().map(|ordering| (ordering, game.score()))
            });
            match outcome {
                Some((Ordering::Equal, score)) => {
                    s.ctx().sound.beep(Tone::Win);
                    report.report(score);
                }
                Some(_) => s.ctx().sound.beep(Tone::Click),
                None => {}
            }
        }
        KeyCode::Char('n') => s.update(|game| {
            if game.solved {
                *game = NumberGuess::random();
            }
        }),
        _ => {}
    });
    Ok(None)
}
