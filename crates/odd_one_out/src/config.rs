use bevy::prelude::*;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::layout::LayoutParams;
use crate::round::IconCatalog;
use crate::session::SessionRules;

/// Plugin that installs the game configuration
pub struct GameConfigPlugin;

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>();
    }
}

/// Icons shipped with the game, one `icons/<name>.png` each
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Animal {
    Elephant,
    Giraffe,
    Hippo,
    Monkey,
    Panda,
    Parrot,
    Penguin,
    Pig,
    Rabbit,
    Snake,
}

impl Animal {
    pub fn catalog() -> IconCatalog {
        IconCatalog::from_distinct(Self::iter().map(|animal| animal.to_string()).collect())
    }
}

/// Resource containing every tunable value of the game
#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    // Board
    /// Cell size, gutter and margins of the grid
    pub layout: LayoutParams,
    /// Icons a round draws from
    pub catalog: IconCatalog,
    /// Asset folder holding one `<icon>.png` per catalog entry
    pub icon_dir: &'static str,

    // Rules
    pub session: SessionRules,
    /// Fixed seed for the round generator, random when `None`
    pub rng_seed: Option<u64>,

    // Effects
    /// Fade in/out duration of the icons (seconds)
    pub fade_duration: f32,
    /// Scale reached by the correct icon when found
    pub correct_scale: f32,
    /// Duration of the scale-up on the correct icon (seconds)
    pub correct_scale_duration: f32,
    /// How long the "wrong" marker stays on a tapped decoy (seconds)
    pub wrong_marker_duration: f32,

    // UI
    pub label_font_size: f32,
    pub label_color: Color,
    /// Countdown color once the warning threshold is reached
    pub warning_color: Color,
    /// Width over height of the game over banner
    pub game_over_aspect_ratio: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            layout: LayoutParams::default(),
            catalog: Animal::catalog(),
            icon_dir: "icons",

            session: SessionRules::default(),
            rng_seed: None,

            fade_duration: 0.5,
            correct_scale: 2.0,
            correct_scale_duration: 0.5,
            wrong_marker_duration: 0.5,

            label_font_size: 25.0,
            label_color: Color::WHITE,
            warning_color: Color::srgb(1.0, 0.23, 0.19),
            game_over_aspect_ratio: 1.23,
        }
    }
}

impl GameConfig {
    pub fn icon_path(&self, icon: &str) -> String {
        format!("{}/{icon}.png", self.icon_dir)
    }

    pub fn new_rng(&self) -> fastrand::Rng {
        self.rng_seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let config = GameConfig::default();
        assert_eq!(config.catalog.len(), 10, "ten animals");
        assert_eq!(
            config.catalog.ids().first().map(String::as_str),
            Some("elephant"),
            "lowercase names"
        );
        assert_eq!(config.icon_path("pig"), "icons/pig.png", "icon asset path");
    }

    #[test]
    fn test_animal_catalog_is_valid() {
        let catalog = Animal::catalog();
        assert_eq!(
            IconCatalog::new(catalog.ids().iter().cloned()),
            Ok(catalog),
            "distinct names, more than one"
        );
    }

    #[test]
    fn test_seeded_rng() {
        let config = GameConfig {
            rng_seed: Some(17),
            ..default()
        };
        assert_eq!(
            config.new_rng().u64(..),
            config.new_rng().u64(..),
            "same seed, same sequence"
        );
    }
}
