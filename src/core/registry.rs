use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::core::error::RegistryError;
use crate::core::game::GameFactory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Quick,
    Puzzle,
    Arcade,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Quick, Category::Puzzle, Category::Arcade];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Quick => "quick",
            Category::Puzzle => "puzzle",
            Category::Arcade => "arcade",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quick" => Ok(Category::Quick),
            "puzzle" => Ok(Category::Puzzle),
            "arcade" => Ok(Category::Arcade),
            other => Err(format!("unknown category '{other}' (expected quick, puzzle or arcade)")),
        }
    }
}

/// Everything the catalog knows about one game.
#[derive(Clone)]
pub struct GameDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub factory: Rc<dyn GameFactory>,
}

impl GameDescriptor {
    /// Case-insensitive substring match against name and description.
    /// An empty query matches everything.
    pub fn matches_text(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

impl fmt::Debug for GameDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Static catalog of games, in declaration order. Never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct GameRegistry {
    games: Vec<GameDescriptor>,
}

impl GameRegistry {
    /// Builds the registry; ids must be unique.
    pub fn new(games: Vec<GameDescriptor>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for game in &games {
            if !seen.insert(game.id) {
                return Err(RegistryError::DuplicateId(game.id.to_string()));
            }
        }
        Ok(Self { games })
    }

    pub fn get(&self, id: &str) -> Option<&GameDescriptor> {
        self.games.iter().find(|g| g.id == id)
    }

    pub fn has_game(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn list_games(&self) -> &[GameDescriptor] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Games in `category` (all when `None`) whose name or description
    /// contains `query`, ignoring case.
    pub fn filter(&self, category: Option<Category>, query: &str) -> Vec<&GameDescriptor> {
        self.games
            .iter()
            .filter(|g| category.map_or(true, |c| g.category == c))
            .filter(|g| g.matches_text(query))
            .collect()
    }
}
