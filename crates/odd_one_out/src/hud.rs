use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bits_helpers::FONT;

use crate::board::BoardAssets;
use crate::config::GameConfig;
use crate::game::{GameState, HaltReason};
use crate::session::Session;

const BANNER_Z: f32 = 100.0;

#[derive(Component)]
struct ScoreLabel;

#[derive(Component)]
struct TimeLabel;

#[derive(Component)]
struct GameOverBanner;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_labels)
            .add_systems(
                Update,
                (update_score, update_time).run_if(resource_exists::<Session>),
            )
            .add_systems(OnEnter(GameState::GameOver), spawn_game_over_banner)
            .add_systems(OnExit(GameState::GameOver), despawn_all::<GameOverBanner>)
            .add_systems(OnEnter(GameState::Halted), spawn_halt_notice);
    }
}

fn despawn_all<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

fn spawn_labels(mut commands: Commands, asset_server: Res<AssetServer>, config: Res<GameConfig>) {
    let font = TextFont {
        font: asset_server.load(FONT),
        font_size: config.label_font_size,
        ..default()
    };
    let margin = config.layout.side_margin;

    commands.spawn((
        Text::new(""),
        font.clone(),
        TextColor(config.label_color),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(margin.x),
            top: Val::Px(margin.y * 0.5),
            ..default()
        },
        ScoreLabel,
    ));

    commands.spawn((
        Text::new(""),
        font,
        TextColor(config.label_color),
        TextLayout::new_with_justify(JustifyText::Right),
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(margin.x),
            top: Val::Px(margin.y * 0.5),
            ..default()
        },
        TimeLabel,
    ));
}

fn update_score(session: Res<Session>, mut query: Query<&mut Text, With<ScoreLabel>>) {
    if !session.is_changed() {
        return;
    }
    for mut text in &mut query {
        text.0 = format!("SCORE: {}", session.score());
    }
}

fn update_time(
    session: Res<Session>,
    config: Res<GameConfig>,
    mut query: Query<(&mut Text, &mut TextColor, &mut Visibility), With<TimeLabel>>,
) {
    if !session.is_changed() {
        return;
    }
    for (mut text, mut color, mut visibility) in &mut query {
        if !session.is_running() {
            *visibility = Visibility::Hidden;
            continue;
        }
        *visibility = Visibility::Inherited;
        text.0 = format!("TIME: {}", session.remaining_secs());
        color.0 = if session.is_time_warning() {
            config.warning_color
        } else {
            config.label_color
        };
    }
}

fn spawn_game_over_banner(
    mut commands: Commands,
    assets: Res<BoardAssets>,
    config: Res<GameConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let width = window.width() * 0.5;
    commands.spawn((
        Sprite {
            image: assets.game_over.clone(),
            custom_size: Some(Vec2::new(width, width / config.game_over_aspect_ratio)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, BANNER_Z),
        GameOverBanner,
    ));
}

fn spawn_halt_notice(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<GameConfig>,
    reason: Res<HaltReason>,
) {
    let message = reason
        .0
        .as_ref()
        .map_or_else(|| "Something went wrong".to_owned(), ToString::to_string);
    commands.spawn((
        Text2d::new(message),
        TextFont {
            font: asset_server.load(FONT),
            font_size: config.label_font_size,
            ..default()
        },
        TextColor(config.warning_color),
        TextLayout::new_with_justify(JustifyText::Center),
        Transform::from_xyz(0.0, 0.0, BANNER_Z),
    ));
}
