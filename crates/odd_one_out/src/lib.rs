use bevy::prelude::*;

mod audio;
mod board;
mod config;
mod effects;
mod error;
mod game;
mod hud;
mod layout;
mod ribbit;
mod round;
mod session;

pub use config::{Animal, GameConfig};
pub use error::ConfigError;
pub use layout::{CellSlot, GridLayout, LayoutCache, LayoutParams, Viewport, compute_layout};
pub use round::{IconCatalog, Placement, Role, RoundAssignment, generate_round, items_to_show};
pub use session::{Session, SessionRules, TapOutcome, Transition};

use audio::GameAudioPlugin;
use board::BoardPlugin;
use config::GameConfigPlugin;
use effects::EffectsPlugin;
use game::GamePlugin;
use hud::HudPlugin;

pub fn run() {
    bits_helpers::get_default_app::<ribbit::OddOneOut>(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
    .add_plugins(GameConfigPlugin)
    .add_plugins(GamePlugin)
    .add_plugins(BoardPlugin)
    .add_plugins(EffectsPlugin)
    .add_plugins(HudPlugin)
    .add_plugins(GameAudioPlugin)
    .add_systems(Startup, setup)
    .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
}
