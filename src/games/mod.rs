pub mod macros;
pub mod session;

pub mod clicker;
pub mod flappy;
pub mod guess;
pub mod math;
pub mod memory;
pub mod pong;
pub mod reaction;
pub mod rps;
pub mod sliding;
pub mod snake;
pub mod sudoku;
pub mod tictactoe;
pub mod twenty48;
pub mod whack;

use crate::register_games;

pub use session::{Screen, Session};

// Register all games here - catalog order follows declaration order
register_games! {
    clicker => {
        id: "clicker",
        name: "Click The Button",
        category: Quick,
        description: "Tap to score. Simple & addictive."
    },
    rps => {
        id: "rps",
        name: "Rock Paper Scissors",
        category: Quick,
        description: "Classic luck & strategy."
    },
    tictactoe => {
        id: "tictactoe",
        name: "Tic Tac Toe",
        category: Puzzle,
        description: "Play vs simple computer."
    },
    snake => {
        id: "snake",
        name: "Snake",
        category: Arcade,
        description: "Eat food, avoid walls. (Swipe/D-pad)"
    },
    guess => {
        id: "guess",
        name: "Number Guess",
        category: Puzzle,
        description: "1-100 guessing game."
    },
    memory => {
        id: "memory",
        name: "Memory Match",
        category: Puzzle,
        description: "Match all pairs."
    },
    reaction => {
        id: "reaction",
        name: "Reaction Timer",
        category: Quick,
        description: "How fast can you tap?"
    },
    math => {
        id: "math",
        name: "Math Quiz",
        category: Puzzle,
        description: "Quick mental math."
    },
    flappy => {
        id: "flappy",
        name: "Flappy",
        category: Arcade,
        description: "Dodge the pipes! (Tap/Space)"
    },
    twenty48 => {
        id: "2048",
        name: "2048",
        category: Puzzle,
        description: "Merge tiles to 2048. (Swipe/Arrows)"
    },
    pong => {
        id: "pong",
        name: "Pong",
        category: Arcade,
        description: "Click or use arrows to move your paddle."
    },
    whack => {
        id: "whack",
        name: "Whack-a-Mole",
        category: Quick,
        description: "Tap the moles, beat the timer!"
    },
    sudoku => {
        id: "sudoku",
        name: "Sudoku Mini (4x4)",
        category: Puzzle,
        description: "Small 4x4 Sudoku, fill the grid."
    },
    sliding => {
        id: "sliding",
        name: "Sliding Puzzle (3x3)",
        category: Puzzle,
        description: "Arrange tiles to order."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_games() {
        let registry = create_default_registry().unwrap();
        assert_eq!(registry.len(), 14);
        assert!(registry.has_game("2048"));
        assert_eq!(get_game("snake").map(|g| g.name), Some("Snake"));
    }
}
