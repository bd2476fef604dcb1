use bevy::prelude::*;
use bevy_asset_loader::prelude::*;
use bevy_kira_audio::prelude::*;

use crate::game::{GameState, TapResolved};
use crate::session::TapOutcome;

#[derive(AssetCollection, Resource)]
pub struct AudioAssets {
    #[asset(path = "audio/correct-3.ogg")]
    correct: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/wrong-2.ogg")]
    wrong: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/night-cave.ogg")]
    music: Handle<bevy_kira_audio::prelude::AudioSource>,
}

/// Background music, kept apart so it can be restarted without cutting the cues
#[derive(Resource)]
struct MusicChannel;

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(AudioPlugin)
            .add_audio_channel::<MusicChannel>()
            .add_systems(OnEnter(GameState::Playing), start_music)
            .add_systems(Update, tap_audio.run_if(in_state(GameState::Playing)));
    }
}

fn start_music(audio_assets: Res<AudioAssets>, music: Res<AudioChannel<MusicChannel>>) {
    music.stop();
    music.play(audio_assets.music.clone_weak()).looped();
}

fn tap_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    mut events: EventReader<TapResolved>,
) {
    for event in events.read() {
        match event.outcome {
            TapOutcome::Correct => {
                audio.play(audio_assets.correct.clone_weak());
            }
            TapOutcome::Wrong => {
                audio.play(audio_assets.wrong.clone_weak());
            }
            TapOutcome::Ignored => {}
        }
    }
}
