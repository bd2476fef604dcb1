use std::collections::HashMap;

use bevy::prelude::*;
use bevy_asset_loader::prelude::*;

use crate::config::GameConfig;
use crate::effects::{Fade, Lifetime, Pulse};
use crate::game::{GameState, TapResolved};
use crate::layout::{CellSlot, GridLayout, Viewport};
use crate::round::{Placement, RoundAssignment};
use crate::session::TapOutcome;

const BACKGROUND_Z: f32 = -1.0;
const ITEM_Z: f32 = 0.0;
const WRONG_MARKER_Z: f32 = 5.0;

pub struct BoardPlugin;

impl Plugin for BoardPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_icon_textures).add_systems(
            Update,
            show_tap_feedback.run_if(in_state(GameState::Playing)),
        );
    }
}

#[derive(AssetCollection, Resource)]
pub struct BoardAssets {
    #[asset(path = "images/background-leaves.png")]
    pub background: Handle<Image>,
    #[asset(path = "images/wrong.png")]
    pub wrong_marker: Handle<Image>,
    #[asset(path = "images/game-over.png")]
    pub game_over: Handle<Image>,
}

/// One texture per catalog icon
#[derive(Resource, Default)]
pub struct IconTextures(HashMap<String, Handle<Image>>);

impl IconTextures {
    pub fn get(&self, icon: &str) -> Handle<Image> {
        self.0.get(icon).cloned().unwrap_or_default()
    }
}

/// A shown icon, by the slot it sits on
#[derive(Component, Debug)]
pub struct RoundItem {
    pub slot: usize,
}

#[derive(Component)]
pub struct Background;

fn load_icon_textures(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<GameConfig>,
) {
    let textures = config
        .catalog
        .ids()
        .iter()
        .map(|icon| (icon.clone(), asset_server.load(config.icon_path(icon))))
        .collect();
    commands.insert_resource(IconTextures(textures));
}

/// The shown placement under `point`, with its slot. Hidden slots never match.
pub fn hit_test<'a>(
    layout: &'a GridLayout,
    round: &'a RoundAssignment,
    point: Vec2,
) -> Option<(&'a Placement, &'a CellSlot)> {
    round.placements().iter().find_map(|placement| {
        layout
            .slot(placement.slot)
            .filter(|slot| slot.contains(point))
            .map(|slot| (placement, slot))
    })
}

pub fn clear_round(commands: &mut Commands, items: &Query<Entity, With<RoundItem>>) {
    for entity in items.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

pub fn fit_background(
    commands: &mut Commands,
    background: &mut Query<&mut Sprite, With<Background>>,
    assets: &BoardAssets,
    viewport: Viewport,
) {
    let size = Vec2::new(viewport.width, viewport.height);
    if let Ok(mut sprite) = background.get_single_mut() {
        sprite.custom_size = Some(size);
        return;
    }
    commands.spawn((
        Sprite {
            image: assets.background.clone(),
            custom_size: Some(size),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, BACKGROUND_Z),
        Background,
    ));
}

/// Spawns the round's icons, fading in. Slots without a placement get nothing.
pub fn present_round(
    commands: &mut Commands,
    layout: &GridLayout,
    round: &RoundAssignment,
    icons: &IconTextures,
    config: &GameConfig,
) {
    for placement in round.placements() {
        let Some(slot) = layout.slot(placement.slot) else {
            warn!("Slot {} is not part of the layout", placement.slot);
            continue;
        };
        commands.spawn((
            Sprite {
                image: icons.get(&placement.icon),
                custom_size: Some(Vec2::splat(slot.size)),
                color: Color::WHITE.with_alpha(0.0),
                ..default()
            },
            Transform::from_translation(slot.position.extend(ITEM_Z)),
            Fade::fade_in(config.fade_duration),
            RoundItem { slot: slot.index },
        ));
    }
}

fn show_tap_feedback(
    mut commands: Commands,
    mut events: EventReader<TapResolved>,
    config: Res<GameConfig>,
    assets: Res<BoardAssets>,
    items: Query<(Entity, &RoundItem)>,
) {
    for event in events.read() {
        match event.outcome {
            TapOutcome::Correct => {
                for (entity, item) in &items {
                    if item.slot == event.slot {
                        commands.entity(entity).insert(Pulse::new(
                            config.correct_scale_duration,
                            1.0,
                            config.correct_scale,
                        ));
                    } else {
                        commands
                            .entity(entity)
                            .insert(Fade::fade_out(config.fade_duration));
                    }
                }
            }
            TapOutcome::Wrong => {
                commands.spawn((
                    Sprite {
                        image: assets.wrong_marker.clone(),
                        custom_size: Some(Vec2::splat(config.layout.item_size)),
                        ..default()
                    },
                    Transform::from_translation(event.position.extend(WRONG_MARKER_Z)),
                    Lifetime::from_seconds(config.wrong_marker_duration),
                ));
            }
            TapOutcome::Ignored => {}
        }
    }
}
