use crossterm::event::KeyCode;
use rand::seq::IndexedRandom;

use crate::core::game::{InitResult, ScoreReporter};
use crate::core::host::HostContext;
use crate::core::prefs::Tone;
use crate::games::session::{grid_cell, Screen, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Rock,
    Paper,
    Scissors,
}

impl Hand {
    pub const ALL: [Hand; 3] = [Hand::Rock, Hand::Paper, Hand::Scissors];

    pub fn beats(self, other: Hand) -> bool {
        matches!(
            (self, other),
            (Hand::Rock, Hand::Scissors) | (Hand::Paper, Hand::Rock) | (Hand::Scissors, Hand::Paper)
        )
    }

    fn name(self) -> &'static str {
        match self {
            Hand::Rock => "rock",
            Hand::Paper => "paper",
            Hand::Scissors => "scissors",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
    Tie,
}

pub fn judge(me: Hand, computer: Hand) -> Outcome {
    if me == computer {
        Outcome::Tie
    } else if me.beats(computer) {
        Outcome::Win
    } else {
        Outcome::Lose
    }
}

#[derive(Default)]
pub struct Rps {
    last: Option<(Hand, Hand, Outcome)>,
}

impl Screen for Rps {
    fn render(&self) -> Vec<String> {
        let mut lines = vec![
            "Choose your move:".to_string(),
            String::new(),
            "[ Rock ]    [ Paper ]   [Scissors]".to_string(),
            String::new(),
        ];
        if let Some((me, computer, outcome)) = self.last {
            let verdict = match outcome {
                Outcome::Win => "You win!",
                Outcome::Lose => "Computer wins!",
                Outcome::Tie => "Tie!",
            };
            lines.push(format!("You chose {}, computer chose {}. {verdict}", me.name(), computer.name()));
        }
        lines.push(String::new());
        lines.push("[r] rock  [p] paper  [s] scissors".into());
        lines
    }
}

fn play(session: &Session<Rps>, report: &ScoreReporter, me: Hand) {
    let computer = Hand::ALL.choose(&mut rand::rng()).copied().unwrap_or(Hand::Rock);
    let outcome = judge(me, computer);
    session.update(|rps| rps.last = Some((me, computer, outcome)));
    match outcome {
        Outcome::Win => {
            session.ctx().sound.beep(Tone::Win);
            report.report("Win");
        }
        Outcome::Lose => session.ctx().sound.beep(Tone::Lose),
        Outcome::Tie => {}
    }
}

pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult {
    let session = Session::start(ctx, Rps::default());

    let pointer_report = report.clone();
    session.on_pointer(move |s, col, row| {
        if let Some((_, i)) = grid_cell(col, row, 2, (12, 1), (3, 1)) {
            play(s, &pointer_report, Hand::ALL[i]);
        }
    });
    session.on_key(move |s, key| {
        let hand = match key.code {
            KeyCode::Char('r') | KeyCode::Char('1') => Hand::Rock,
            KeyCode::Char('p') | KeyCode::Char('2') => Hand::Paper,
            KeyCode::Char('s') | KeyCode::Char('3') => Hand::Scissors,
            _ => return,
        };
        play(s, &report, hand);
    });
    Ok(None)
}
