use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    Loss,
}

/// Notifications the player controller sends to the rest of the game.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    HealthChanged(u8),
    EnterFightMode,
    ExitFightMode,
    GameOver(GameOverReason),
    /// The player used the act button outside of a fight.
    PlayerActivate,
    EnemyHit,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Start (`true`) or stop the looping footstep sound.
    Footsteps(bool),
    SpearAttack,
}

/// Requests other systems make of the player.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    TakeDamage,
    Heal,
    /// Hazard kill, e.g. falling into water. Costs one health point.
    Die,
    EnterFightMode(Entity),
    ExitFightMode,
}
