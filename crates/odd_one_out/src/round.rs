//! Round generation: which slots are filled, with which icon, and which one is the answer.

use std::collections::HashSet;
use std::iter;

use tracing::debug;

use crate::error::ConfigError;
use crate::layout::CellSlot;

/// Icons shown on level 0, before the per-level increase.
const BASE_ITEMS: usize = 5;
const ITEMS_PER_LEVEL: usize = 4;
/// How many slots in a row get the same decoy before moving to the next one.
const DECOY_REPEAT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub slot: usize,
    pub icon: String,
    pub role: Role,
}

/// What to show this round. Slots with no placement stay hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundAssignment {
    level: u32,
    /// In fill order: decoys first, the correct icon last
    placements: Vec<Placement>,
}

impl RoundAssignment {
    pub const fn level(&self) -> u32 {
        self.level
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn items_shown(&self) -> usize {
        self.placements.len()
    }

    pub fn correct(&self) -> Option<&Placement> {
        self.placements
            .iter()
            .find(|placement| placement.role == Role::Correct)
    }

    pub fn decoys(&self) -> impl Iterator<Item = &Placement> {
        self.placements
            .iter()
            .filter(|placement| placement.role == Role::Wrong)
    }

    pub fn placement_at(&self, slot: usize) -> Option<&Placement> {
        self.placements.iter().find(|placement| placement.slot == slot)
    }

    /// `None` for slots that are hidden this round.
    pub fn role_at(&self, slot: usize) -> Option<Role> {
        self.placement_at(slot).map(|placement| placement.role)
    }
}

/// The set of icons a round draws from. Distinct, at least two of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconCatalog {
    ids: Vec<String>,
}

impl IconCatalog {
    pub fn new<I, S>(ids: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        validate_icons(&ids)?;
        Ok(Self { ids })
    }

    /// For ids that are distinct by construction, such as enum variant names.
    /// [`generate_round`] still validates whatever it is given.
    pub(crate) const fn from_distinct(ids: Vec<String>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn validate_icons<S: AsRef<str>>(icons: &[S]) -> Result<(), ConfigError> {
    if icons.len() < 2 {
        return Err(ConfigError::CatalogTooSmall(icons.len()));
    }
    let mut seen = HashSet::with_capacity(icons.len());
    for icon in icons {
        if !seen.insert(icon.as_ref()) {
            return Err(ConfigError::DuplicateIcon(icon.as_ref().to_owned()));
        }
    }
    Ok(())
}

pub fn items_to_show(level: u32, slot_count: usize) -> usize {
    (level as usize)
        .saturating_mul(ITEMS_PER_LEVEL)
        .saturating_add(BASE_ITEMS)
        .min(slot_count)
}

/// Shuffles the slots and the icons, keeps the last icon as the answer and hands the rest
/// out two slots at a time, wrapping around when the decoys run out.
pub fn generate_round<S: AsRef<str>>(
    level: u32,
    slots: &[CellSlot],
    icons: &[S],
    rng: &mut fastrand::Rng,
) -> Result<RoundAssignment, ConfigError> {
    if level == 0 {
        return Err(ConfigError::InvalidLevel(level));
    }
    if slots.is_empty() {
        return Err(ConfigError::NoSlots);
    }
    validate_icons(icons)?;

    let shown = items_to_show(level, slots.len());

    let mut order: Vec<usize> = slots.iter().map(|slot| slot.index).collect();
    rng.shuffle(&mut order);

    let mut pool: Vec<&str> = icons.iter().map(AsRef::as_ref).collect();
    rng.shuffle(&mut pool);
    let Some(correct) = pool.pop() else {
        return Err(ConfigError::CatalogTooSmall(icons.len()));
    };

    let decoys = pool
        .iter()
        .cycle()
        .flat_map(|icon| iter::repeat_n(*icon, DECOY_REPEAT));

    let (decoy_slots, rest) = order.split_at(shown.saturating_sub(1).min(order.len()));
    let placements: Vec<Placement> = decoy_slots
        .iter()
        .zip(decoys)
        .map(|(&slot, icon)| Placement {
            slot,
            icon: icon.to_owned(),
            role: Role::Wrong,
        })
        .chain(rest.first().map(|&slot| Placement {
            slot,
            icon: correct.to_owned(),
            role: Role::Correct,
        }))
        .collect();

    debug!(
        "Round for level {level}: {} of {} slots, correct icon {correct}",
        placements.len(),
        slots.len()
    );

    Ok(RoundAssignment { level, placements })
}
