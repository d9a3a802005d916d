use bevy::audio::Volume;
use bevy::prelude::*;

use crate::config::ControllerConfig;
use crate::game_states::{AppState, InGameEntity};
use crate::player::PlayerSystems;
use crate::player::events::SoundCue;

/// The looping footstep sound, paused while the player stands still.
#[derive(Component)]
pub struct Footsteps;

fn spawn_footsteps(mut commands: Commands, asset_server: Res<AssetServer>, config: Res<ControllerConfig>) {
    commands.spawn((
        Name::new("Footsteps"),
        AudioPlayer::new(asset_server.load(config.assets.footstep_sound.clone())),
        PlaybackSettings::LOOP.paused().with_volume(Volume::new(0.6)),
        Footsteps,
        InGameEntity,
    ));
}

fn play_sound_cues(
    mut commands: Commands,
    mut cues: EventReader<SoundCue>,
    asset_server: Res<AssetServer>,
    config: Res<ControllerConfig>,
    footsteps: Query<&AudioSink, With<Footsteps>>,
) {
    for cue in cues.read() {
        match *cue {
            SoundCue::Footsteps(on) => {
                // The sink only exists once the clip has loaded.
                let Ok(sink) = footsteps.get_single() else { continue };
                if on {
                    sink.play();
                } else {
                    sink.pause();
                }
            }
            SoundCue::SpearAttack => {
                commands.spawn((
                    AudioPlayer::new(asset_server.load(config.assets.spear_attack_sound.clone())),
                    PlaybackSettings::DESPAWN,
                ));
            }
        }
    }
}

pub struct SoundPlugin;

impl Plugin for SoundPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::InGame), spawn_footsteps)
            .add_systems(Update, play_sound_cues.after(PlayerSystems::Apply).run_if(in_state(AppState::InGame)));
    }
}
