//! Selection codes handed in by the detail view.
//!
//! Odd codes are the "done" variant, the following even code the "taken"
//! variant of the same category and heal mode.

use raidlens_types::{Category, DetailMode, Direction, HealMode, Selection};

const DAMAGE_DONE: Selection = Selection::new(Category::Damage, DetailMode::new(Direction::Done));
const DAMAGE_TAKEN: Selection =
    Selection::new(Category::Damage, DetailMode::new(Direction::Taken));
const HEAL_TOTAL_DONE: Selection = Selection::new(
    Category::Heal,
    DetailMode::heal(HealMode::Total, Direction::Done),
);
const HEAL_TOTAL_TAKEN: Selection = Selection::new(
    Category::Heal,
    DetailMode::heal(HealMode::Total, Direction::Taken),
);
const HEAL_EFFECTIVE_DONE: Selection = Selection::new(
    Category::Heal,
    DetailMode::heal(HealMode::Effective, Direction::Done),
);
const HEAL_EFFECTIVE_TAKEN: Selection = Selection::new(
    Category::Heal,
    DetailMode::heal(HealMode::Effective, Direction::Taken),
);
const OVERHEAL_DONE: Selection = Selection::new(
    Category::Heal,
    DetailMode::heal(HealMode::Overheal, Direction::Done),
);
const OVERHEAL_TAKEN: Selection = Selection::new(
    Category::Heal,
    DetailMode::heal(HealMode::Overheal, Direction::Taken),
);
const THREAT_DONE: Selection = Selection::new(Category::Threat, DetailMode::new(Direction::Done));
const THREAT_TAKEN: Selection =
    Selection::new(Category::Threat, DetailMode::new(Direction::Taken));
const ABSORB_DONE: Selection = Selection::new(Category::Absorb, DetailMode::new(Direction::Done));
const ABSORB_TAKEN: Selection =
    Selection::new(Category::Absorb, DetailMode::new(Direction::Taken));
const HEAL_AND_ABSORB_DONE: Selection = Selection::new(
    Category::HealAndAbsorb,
    DetailMode::new(Direction::Done),
);
const HEAL_AND_ABSORB_TAKEN: Selection = Selection::new(
    Category::HealAndAbsorb,
    DetailMode::new(Direction::Taken),
);

static SELECTION_CODES: phf::Map<u32, Selection> = phf::phf_map! {
    1u32 => DAMAGE_DONE,
    2u32 => DAMAGE_TAKEN,
    3u32 => HEAL_TOTAL_DONE,
    4u32 => HEAL_TOTAL_TAKEN,
    5u32 => HEAL_EFFECTIVE_DONE,
    6u32 => HEAL_EFFECTIVE_TAKEN,
    7u32 => OVERHEAL_DONE,
    8u32 => OVERHEAL_TAKEN,
    9u32 => THREAT_DONE,
    10u32 => THREAT_TAKEN,
    21u32 => ABSORB_DONE,
    22u32 => ABSORB_TAKEN,
    23u32 => HEAL_AND_ABSORB_DONE,
    24u32 => HEAL_AND_ABSORB_TAKEN,
};

/// Resolve a selection code; `None` for codes with no mapped category.
pub fn resolve(code: u32) -> Option<Selection> {
    SELECTION_CODES.get(&code).copied()
}

/// All known codes in ascending order.
pub fn known_codes() -> Vec<u32> {
    let mut codes: Vec<u32> = SELECTION_CODES.keys().copied().collect();
    codes.sort_unstable();
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_codes_are_taken() {
        for code in known_codes() {
            let selection = resolve(code).unwrap();
            assert_eq!(selection.mode.is_taken(), code % 2 == 0, "code {code}");
        }
    }

    #[test]
    fn test_heal_codes_carry_heal_mode() {
        assert_eq!(resolve(3).unwrap().mode.heal_mode, Some(HealMode::Total));
        assert_eq!(resolve(6).unwrap().mode.heal_mode, Some(HealMode::Effective));
        assert_eq!(resolve(8).unwrap().mode.heal_mode, Some(HealMode::Overheal));
        assert_eq!(resolve(23).unwrap().mode.heal_mode, None);
        assert_eq!(resolve(23).unwrap().category, Category::HealAndAbsorb);
    }

    #[test]
    fn test_unknown_codes() {
        for code in [0, 11, 20, 25, u32::MAX] {
            assert!(resolve(code).is_none(), "code {code}");
        }
        assert_eq!(known_codes().len(), 14);
    }
}
