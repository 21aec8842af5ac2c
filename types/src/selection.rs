use serde::{Deserialize, Serialize};

/// Statistic domain of a detail breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Damage,
    Heal,
    Threat,
    Absorb,
    HealAndAbsorb,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Damage,
        Category::Heal,
        Category::Threat,
        Category::Absorb,
        Category::HealAndAbsorb,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Damage => "Damage",
            Category::Heal => "Heal",
            Category::Threat => "Threat",
            Category::Absorb => "Absorb",
            Category::HealAndAbsorb => "Heal and Absorb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealMode {
    Total,
    Effective,
    Overheal,
}

/// Whether the subject is the actor (done) or the recipient (taken).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Done,
    Taken,
}

/// Variant inside a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DetailMode {
    pub direction: Direction,
    /// Only set for [`Category::Heal`]
    pub heal_mode: Option<HealMode>,
}

impl DetailMode {
    pub const fn new(direction: Direction) -> Self {
        Self {
            direction,
            heal_mode: None,
        }
    }

    pub const fn heal(heal_mode: HealMode, direction: Direction) -> Self {
        Self {
            direction,
            heal_mode: Some(heal_mode),
        }
    }

    pub fn is_taken(&self) -> bool {
        self.direction == Direction::Taken
    }
}

/// A resolved selection code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub category: Category,
    pub mode: DetailMode,
}

impl Selection {
    pub const fn new(category: Category, mode: DetailMode) -> Self {
        Self { category, mode }
    }

    pub fn describe(&self) -> String {
        let direction = match self.mode.direction {
            Direction::Done => "done",
            Direction::Taken => "taken",
        };
        match self.mode.heal_mode {
            Some(HealMode::Total) => format!("{} (total, {direction})", self.category.label()),
            Some(HealMode::Effective) => {
                format!("{} (effective, {direction})", self.category.label())
            }
            Some(HealMode::Overheal) => {
                format!("{} (overheal, {direction})", self.category.label())
            }
            None => format!("{} ({direction})", self.category.label()),
        }
    }
}
