use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_asset_loader::prelude::*;
use bits_helpers::input::just_pressed_world_position;

use crate::audio::AudioAssets;
use crate::board::{self, BoardAssets, IconTextures, RoundItem};
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::layout::{LayoutCache, Viewport};
use crate::round::{RoundAssignment, generate_round};
use crate::session::{Session, TapOutcome, Transition};

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_loading_state(
                LoadingState::new(GameState::Loading)
                    .continue_to_state(GameState::Playing)
                    .load_collection::<BoardAssets>()
                    .load_collection::<AudioAssets>(),
            )
            .init_resource::<LayoutCache>()
            .init_resource::<CurrentRound>()
            .init_resource::<HaltReason>()
            .add_event::<RoundRequested>()
            .add_event::<TapResolved>()
            .add_systems(Startup, (init_session, init_round_rng))
            .add_systems(OnEnter(GameState::Playing), request_first_round)
            .add_systems(OnEnter(GameState::Reset), reset_session)
            .add_systems(OnEnter(GameState::Halted), cancel_transitions)
            .add_systems(
                Update,
                (start_round, handle_taps)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                tick_session
                    .before(start_round)
                    .run_if(in_state(GameState::Playing).or(in_state(GameState::GameOver))),
            );
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Default, States)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    GameOver,
    Reset,
    /// A configuration error stopped the game
    Halted,
}

/// The round on screen, if any. Taps are resolved against it.
#[derive(Resource, Default)]
pub struct CurrentRound(pub Option<RoundAssignment>);

#[derive(Resource)]
pub struct RoundRng(pub fastrand::Rng);

#[derive(Resource, Default)]
pub struct HaltReason(pub Option<ConfigError>);

#[derive(Event)]
pub struct RoundRequested;

#[derive(Event, Debug, Clone, Copy)]
pub struct TapResolved {
    pub slot: usize,
    pub position: Vec2,
    pub outcome: TapOutcome,
}

fn init_session(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(Session::new(config.session.clone()));
}

fn init_round_rng(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(RoundRng(config.new_rng()));
}

fn request_first_round(mut requests: EventWriter<RoundRequested>) {
    requests.send(RoundRequested);
}

fn reset_session(
    mut commands: Commands,
    mut session: ResMut<Session>,
    mut current_round: ResMut<CurrentRound>,
    items: Query<Entity, With<RoundItem>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("Starting a new session");
    session.reset();
    current_round.0 = None;
    board::clear_round(&mut commands, &items);
    next_state.set(GameState::Playing);
}

fn cancel_transitions(mut session: ResMut<Session>) {
    session.end();
}

fn current_viewport(windows: &Query<&Window, With<PrimaryWindow>>) -> Option<Viewport> {
    let window = windows.get_single().ok()?;
    Some(Viewport::new(window.width(), window.height()))
}

fn start_round(
    mut commands: Commands,
    mut requests: EventReader<RoundRequested>,
    windows: Query<&Window, With<PrimaryWindow>>,
    config: Res<GameConfig>,
    assets: Res<BoardAssets>,
    icons: Res<IconTextures>,
    mut cache: ResMut<LayoutCache>,
    mut rng: ResMut<RoundRng>,
    mut session: ResMut<Session>,
    mut current_round: ResMut<CurrentRound>,
    mut halt_reason: ResMut<HaltReason>,
    mut next_state: ResMut<NextState<GameState>>,
    items: Query<Entity, With<RoundItem>>,
    mut background: Query<&mut Sprite, With<board::Background>>,
) {
    if requests.read().count() == 0 {
        return;
    }
    let Some(viewport) = current_viewport(&windows) else {
        warn!("No primary window, round postponed");
        return;
    };

    let generated = cache.layout_for(viewport, &config.layout).and_then(|layout| {
        generate_round(
            session.level(),
            &layout.slots,
            config.catalog.ids(),
            &mut rng.0,
        )
        .map(|round| (layout, round))
    });

    let (layout, round) = match generated {
        Ok(generated) => generated,
        Err(err) => {
            error!("Cannot start a round: {err}");
            halt_reason.0 = Some(err);
            next_state.set(GameState::Halted);
            return;
        }
    };

    board::clear_round(&mut commands, &items);
    board::fit_background(&mut commands, &mut background, &assets, viewport);
    board::present_round(&mut commands, layout, &round, &icons, &config);
    info!(
        "Level {}: {} icons on a {}x{} grid",
        round.level(),
        round.items_shown(),
        layout.cols,
        layout.rows
    );

    current_round.0 = Some(round);
    session.begin_round();
}

fn handle_taps(
    windows: Query<&Window>,
    camera: Query<(&Camera, &GlobalTransform)>,
    mouse_button_input: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    cache: Res<LayoutCache>,
    current_round: Res<CurrentRound>,
    mut session: ResMut<Session>,
    mut resolved: EventWriter<TapResolved>,
) {
    let Some(world_position) =
        just_pressed_world_position(&mouse_button_input, &touch_input, &windows, &camera)
    else {
        return;
    };
    let (Some(layout), Some(round)) = (cache.current(), current_round.0.as_ref()) else {
        return;
    };
    let Some((placement, slot)) = board::hit_test(layout, round, world_position) else {
        return;
    };

    let outcome = session.resolve_tap(Some(placement.role));
    if outcome == TapOutcome::Ignored {
        return;
    }
    debug!("Tapped {} on slot {}: {outcome:?}", placement.icon, slot.index);
    resolved.send(TapResolved {
        slot: slot.index,
        position: slot.position,
        outcome,
    });
}

fn tick_session(
    time: Res<Time>,
    mut session: ResMut<Session>,
    mut requests: EventWriter<RoundRequested>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let update = session.tick(time.delta());
    if update.expired {
        next_state.set(GameState::GameOver);
    }
    for transition in update.fired {
        match transition {
            Transition::NextRound => {
                session.advance_level();
                requests.send(RoundRequested);
            }
            Transition::NewSession => next_state.set(GameState::Reset),
        }
    }
}
