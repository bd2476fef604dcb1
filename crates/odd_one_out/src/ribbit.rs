use bevy::prelude::*;
use bits_helpers::RibbitMessageHandler;
use ribbit_bits::{BitDuration, BitResult};

use crate::game::GameState;
use crate::session::Session;

#[derive(Default, Clone, Copy)]
pub struct OddOneOut;

fn current_state(world: &World) -> Option<GameState> {
    world
        .get_resource::<State<GameState>>()
        .map(|state| state.get().clone())
}

impl RibbitMessageHandler for OddOneOut {
    fn restart(world: &mut World) {
        // Reset needs the loaded assets
        if matches!(current_state(world), None | Some(GameState::Loading)) {
            warn!("Restart requested while loading, ignored");
            return;
        }
        info!("Restarting Odd One Out");

        if let Some(mut session) = world.get_resource_mut::<Session>() {
            session.cancel_pending();
        }

        world
            .resource_mut::<NextState<GameState>>()
            .set(GameState::Reset);
    }

    fn end(world: &mut World) -> BitResult {
        info!("Ending Odd One Out");

        let score = world.get_resource_mut::<Session>().map_or(0, |mut session| {
            session.end();
            session.score()
        });

        // the halt notice stays up, and game over needs the loaded assets
        match current_state(world) {
            None | Some(GameState::Loading | GameState::Halted) => {}
            Some(_) => world
                .resource_mut::<NextState<GameState>>()
                .set(GameState::GameOver),
        }

        BitResult::HighestScore(score.into())
    }

    fn duration(_world: &mut World) -> BitDuration {
        BitDuration::max_duration()
    }
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;

    use super::*;
    use crate::round::Role;
    use crate::session::Transition;

    fn app_in(state: GameState) -> App {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .insert_state(state)
            .insert_resource(Session::default());
        app
    }

    /// One correct tap: score 1, next round pending.
    fn score_one(app: &mut App) {
        let mut session = app.world_mut().resource_mut::<Session>();
        session.begin_round();
        session.resolve_tap(Some(Role::Correct));
        assert!(session.has_pending(Transition::NextRound), "next round pending");
    }

    fn next_state(app: &App) -> Option<GameState> {
        match app.world().resource::<NextState<GameState>>() {
            NextState::Pending(state) => Some(state.clone()),
            NextState::Unchanged => None,
        }
    }

    fn reported_score(result: &BitResult) -> Option<String> {
        match result {
            BitResult::HighestScore(score) => Some(score.to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_restart_cancels_pending_and_resets() {
        let mut app = app_in(GameState::Playing);
        score_one(&mut app);

        OddOneOut::restart(app.world_mut());

        let session = app.world().resource::<Session>();
        assert!(!session.has_pending(Transition::NextRound), "next round cancelled");
        assert_eq!(next_state(&app), Some(GameState::Reset), "goes through reset");

        app.update();
        assert_eq!(
            app.world().resource::<State<GameState>>().get(),
            &GameState::Reset,
            "reset entered"
        );
    }

    #[test]
    fn test_restart_is_ignored_while_loading() {
        let mut app = app_in(GameState::Loading);
        score_one(&mut app);

        OddOneOut::restart(app.world_mut());

        assert_eq!(next_state(&app), None, "no transition");
        assert!(
            app.world()
                .resource::<Session>()
                .has_pending(Transition::NextRound),
            "session untouched"
        );
    }

    #[test]
    fn test_end_reports_score_and_stops() {
        let mut app = app_in(GameState::Playing);
        score_one(&mut app);

        let result = OddOneOut::end(app.world_mut());

        assert_eq!(reported_score(&result).as_deref(), Some("1"), "highest score");
        let session = app.world().resource::<Session>();
        assert!(!session.is_running(), "session stopped");
        assert!(!session.has_pending(Transition::NextRound), "no next round");
        assert!(!session.has_pending(Transition::NewSession), "no new session");
        assert_eq!(next_state(&app), Some(GameState::GameOver), "game over shown");
    }

    #[test]
    fn test_end_after_time_up_schedules_nothing() {
        let mut app = app_in(GameState::GameOver);
        {
            let mut session = app.world_mut().resource_mut::<Session>();
            let duration = session.rules().duration;
            session.tick(duration);
            assert!(session.has_pending(Transition::NewSession), "new session pending");
        }

        OddOneOut::end(app.world_mut());

        assert!(
            !app.world()
                .resource::<Session>()
                .has_pending(Transition::NewSession),
            "new session cancelled"
        );
    }

    #[test]
    fn test_end_keeps_loading_and_halted_states() {
        for state in [GameState::Loading, GameState::Halted] {
            let mut app = app_in(state.clone());
            score_one(&mut app);

            let result = OddOneOut::end(app.world_mut());

            assert_eq!(reported_score(&result).as_deref(), Some("1"), "{state:?} score");
            assert_eq!(next_state(&app), None, "{state:?} kept");
            assert!(
                !app.world().resource::<Session>().is_running(),
                "{state:?} session stopped"
            );
        }
    }

    #[test]
    fn test_end_without_session_reports_zero() {
        let mut app = App::new();
        app.add_plugins(StatesPlugin).insert_state(GameState::Playing);

        let result = OddOneOut::end(app.world_mut());
        assert_eq!(reported_score(&result).as_deref(), Some("0"), "nothing scored");
    }
}
