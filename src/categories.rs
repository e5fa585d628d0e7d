//! Category prompts and the supplier that picks them for a game.

use crate::types::{Category, Difficulty};
use rand::Rng;

/// Supplies the ordered prompt list for a game, one per round.
pub trait CategorySource: Send + Sync {
    fn categories_for_game(&self, count: usize) -> Vec<Category>;
}

/// Difficulty of round `n` repeats this pattern
const DIFFICULTY_PATTERN: [Difficulty; 5] = [
    Difficulty::Easy,
    Difficulty::Medium,
    Difficulty::Easy,
    Difficulty::Medium,
    Difficulty::Hard,
];

const BUILTIN: &[(&str, Difficulty, &str)] = &[
    ("Fruits", Difficulty::Easy, "food"),
    ("Animals", Difficulty::Easy, "nature"),
    ("Colors", Difficulty::Easy, "general"),
    ("Countries", Difficulty::Easy, "geography"),
    ("Sports", Difficulty::Easy, "activity"),
    ("Vegetables", Difficulty::Easy, "food"),
    ("Things in a kitchen", Difficulty::Easy, "household"),
    ("Pizza toppings", Difficulty::Easy, "food"),
    ("Farm animals", Difficulty::Easy, "nature"),
    ("Things that are cold", Difficulty::Easy, "general"),
    ("Body parts", Difficulty::Easy, "general"),
    ("Musical instruments", Difficulty::Easy, "music"),
    ("Things at the beach", Difficulty::Medium, "places"),
    ("Breakfast foods", Difficulty::Medium, "food"),
    ("Board games", Difficulty::Medium, "activity"),
    ("Things that fly", Difficulty::Medium, "general"),
    ("Jobs", Difficulty::Medium, "people"),
    ("Things in a bathroom", Difficulty::Medium, "household"),
    ("Capital cities", Difficulty::Medium, "geography"),
    ("Superheroes", Difficulty::Medium, "entertainment"),
    ("Things with wheels", Difficulty::Medium, "general"),
    ("Desserts", Difficulty::Medium, "food"),
    ("Car brands", Difficulty::Medium, "brands"),
    ("Things you wear", Difficulty::Medium, "general"),
    ("Words that rhyme with cat", Difficulty::Hard, "wordplay"),
    ("Things that are sticky", Difficulty::Hard, "general"),
    ("Famous scientists", Difficulty::Hard, "people"),
    ("Things in a hospital", Difficulty::Hard, "places"),
    ("Dog breeds", Difficulty::Hard, "nature"),
    ("Chemical elements", Difficulty::Hard, "science"),
    ("Things you can fold", Difficulty::Hard, "general"),
    ("Cheeses", Difficulty::Hard, "food"),
    ("Words ending in -ology", Difficulty::Hard, "wordplay"),
    ("Things that make noise", Difficulty::Hard, "general"),
];

/// In-memory category pool.
#[derive(Debug, Clone)]
pub struct CategoryPool {
    categories: Vec<Category>,
}

impl CategoryPool {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// The pool the server ships with
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN
                .iter()
                .map(|(text, difficulty, kind)| Category {
                    text: text.to_string(),
                    difficulty: *difficulty,
                    kind: kind.to_string(),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Draw `count` categories following the difficulty pattern.
    ///
    /// Categories do not repeat until the pool runs dry. When a difficulty
    /// has nothing left any unused category is taken instead, and only then
    /// are repeats allowed.
    pub fn draw<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<Category> {
        if self.categories.is_empty() {
            return Vec::new();
        }

        let mut used = vec![false; self.categories.len()];
        let mut picked = Vec::with_capacity(count);

        for round in 0..count {
            let wanted = DIFFICULTY_PATTERN[round % DIFFICULTY_PATTERN.len()];

            let mut candidates: Vec<usize> = (0..self.categories.len())
                .filter(|&i| !used[i] && self.categories[i].difficulty == wanted)
                .collect();
            if candidates.is_empty() {
                candidates = (0..self.categories.len()).filter(|&i| !used[i]).collect();
            }
            if candidates.is_empty() {
                used.iter_mut().for_each(|u| *u = false);
                candidates = (0..self.categories.len()).collect();
            }

            let choice = candidates[rng.random_range(0..candidates.len())];
            used[choice] = true;
            picked.push(self.categories[choice].clone());
        }

        picked
    }
}

impl Default for CategoryPool {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategorySource for CategoryPool {
    fn categories_for_game(&self, count: usize) -> Vec<Category> {
        self.draw(count, &mut rand::rng())
    }
}
