use std::collections::HashMap;
use std::time::Duration;

use bevy::animation::RepeatAnimation;
use bevy::prelude::*;

use crate::config::{ClipLengths, ControllerConfig};
use crate::game_states::AppState;
use crate::player::Player;
use crate::player::controller::PlayerController;

/// Clips of the character model, in the order they are stored in the glTF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Clip {
    Idle,
    Run,
    Activate,
    Death,
    Jump,
    Hit,
    FightAttack,
    FightIdle,
    FightLeft,
    FightRight,
}

impl Clip {
    pub const ALL: [Clip; 10] = [
        Clip::Idle,
        Clip::Run,
        Clip::Activate,
        Clip::Death,
        Clip::Jump,
        Clip::Hit,
        Clip::FightAttack,
        Clip::FightIdle,
        Clip::FightLeft,
        Clip::FightRight,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum Playback {
    Loop,
    Once,
}

/// What the character should be animating right now.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct AnimationCue {
    pub clip: Clip,
    pub playback: Playback,
    pub rate: f32,
}

/// Playback bookkeeping for the character, independent of the engine's
/// animation player so gating questions ("is Hit playing?") have answers in
/// headless ticks.
#[derive(Debug, Clone)]
pub struct AnimationTrack {
    lengths: ClipLengths,
    cue: Option<AnimationCue>,
    elapsed: f32,
    generation: u32,
}

impl AnimationTrack {
    pub fn new(lengths: ClipLengths) -> Self {
        Self {
            lengths,
            cue: None,
            elapsed: 0.0,
            generation: 0,
        }
    }

    pub fn cue(&self) -> Option<AnimationCue> {
        self.cue
    }

    /// Bumped every time a clip is (re)started.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Length of a one-shot clip at rate 1; looping clips have none.
    pub fn length(&self, clip: Clip) -> Option<f32> {
        match clip {
            Clip::Activate => Some(self.lengths.activate),
            Clip::FightAttack => Some(self.lengths.fight_attack),
            Clip::Hit => Some(self.lengths.hit),
            Clip::Death => Some(self.lengths.death),
            Clip::Jump => Some(self.lengths.jump),
            _ => None,
        }
    }

    pub fn loop_clip(&mut self, clip: Clip, rate: f32) {
        self.start(AnimationCue {
            clip,
            playback: Playback::Loop,
            rate,
        });
    }

    pub fn play_once(&mut self, clip: Clip, rate: f32) {
        self.start(AnimationCue {
            clip,
            playback: Playback::Once,
            rate,
        });
    }

    /// Changes the rate of the running clip without restarting it.
    pub fn set_rate(&mut self, clip: Clip, rate: f32) {
        if let Some(cue) = self.cue.as_mut().filter(|cue| cue.clip == clip) {
            cue.rate = rate;
        }
    }

    pub fn is_playing(&self, clip: Clip) -> bool {
        match self.cue {
            Some(cue) if cue.clip == clip => match cue.playback {
                Playback::Loop => true,
                Playback::Once => self.elapsed < self.play_time(cue),
            },
            _ => false,
        }
    }

    /// Advances the clock. Returns the one-shot clip that finished this tick.
    pub fn advance(&mut self, dt: f32) -> Option<Clip> {
        let cue = self.cue?;
        let was_playing = self.is_playing(cue.clip);
        self.elapsed += dt;
        if cue.playback == Playback::Once && was_playing && !self.is_playing(cue.clip) {
            return Some(cue.clip);
        }
        None
    }

    fn start(&mut self, cue: AnimationCue) {
        self.cue = Some(cue);
        self.elapsed = 0.0;
        self.generation = self.generation.wrapping_add(1);
    }

    fn play_time(&self, cue: AnimationCue) -> f32 {
        let length = self.length(cue.clip).unwrap_or(0.0);
        length / cue.rate.abs().max(f32::EPSILON)
    }
}

/// Animation graph of the character model with one node per [`Clip`].
#[derive(Resource)]
pub struct PlayerAnimations {
    graph: Handle<AnimationGraph>,
    nodes: HashMap<Clip, AnimationNodeIndex>,
}

/// Remembers which cue has been pushed to an [`AnimationPlayer`].
#[derive(Component, Default)]
pub struct AppliedCue {
    generation: Option<u32>,
    rate: f32,
}

fn setup_animations(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    config: Res<ControllerConfig>,
) {
    let model = config.assets.character_model.clone();
    let (graph, node_indices) = AnimationGraph::from_clips(
        (0..Clip::ALL.len()).map(|index| asset_server.load(GltfAssetLabel::Animation(index).from_asset(model.clone()))),
    );
    let nodes = Clip::ALL.into_iter().zip(node_indices).collect();
    commands.insert_resource(PlayerAnimations {
        graph: graphs.add(graph),
        nodes,
    });
}

fn attach_player_model(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<ControllerConfig>,
    players: Query<Entity, Added<Player>>,
) {
    let model = config.assets.character_model.clone();
    for entity in &players {
        commands
            .entity(entity)
            .insert(SceneRoot(asset_server.load(GltfAssetLabel::Scene(0).from_asset(model.clone()))));
    }
}

// The AnimationPlayer appears somewhere under the scene root once the glTF has loaded.
fn attach_animation_graph(
    mut commands: Commands,
    animations: Option<Res<PlayerAnimations>>,
    players: Query<Entity, Added<AnimationPlayer>>,
) {
    let Some(animations) = animations else { return };
    for entity in &players {
        commands.entity(entity).insert((
            AnimationGraphHandle(animations.graph.clone()),
            AnimationTransitions::new(),
            AppliedCue::default(),
        ));
    }
}

/// Pushes the controller's current cue onto the model's animation player.
fn apply_animation_cue(
    animations: Option<Res<PlayerAnimations>>,
    controllers: Query<&PlayerController>,
    mut players: Query<(&mut AnimationPlayer, &mut AnimationTransitions, &mut AppliedCue)>,
) {
    let (Some(animations), Ok(controller)) = (animations, controllers.get_single()) else {
        return;
    };
    let track = controller.animation();
    let Some(cue) = track.cue() else { return };
    let Some(&node) = animations.nodes.get(&cue.clip) else { return };

    for (mut player, mut transitions, mut applied) in &mut players {
        if applied.generation != Some(track.generation()) {
            let active = transitions.play(&mut player, node, Duration::from_millis(150));
            match cue.playback {
                Playback::Loop => active.set_repeat(RepeatAnimation::Forever),
                Playback::Once => active.set_repeat(RepeatAnimation::Never),
            };
            active.set_speed(cue.rate);
            applied.generation = Some(track.generation());
            applied.rate = cue.rate;
        } else if applied.rate != cue.rate {
            if let Some(active) = player.animation_mut(node) {
                active.set_speed(cue.rate);
            }
            applied.rate = cue.rate;
        }
    }
}

pub struct PlayerAnimationPlugin;

impl Plugin for PlayerAnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::InGame), setup_animations)
            .add_systems(
                Update,
                (attach_player_model, attach_animation_graph, apply_animation_cue)
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            );
    }
}
