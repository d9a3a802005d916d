use bevy::prelude::*;

/// The player's animation/behaviour state. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
pub enum PlayerState {
    #[default]
    Idle,
    Run,
    RunReverse,
    Jump,
    Hit,
    Death,
    Action,
    FightIdle,
    FightLeft,
    FightRight,
    FightAttack,
}

impl PlayerState {
    /// `FightIdle` and `FightAttack` are only how Idle and Action look in
    /// Fight mode; requests for them land on the plain state.
    pub fn canonical(self) -> Self {
        match self {
            PlayerState::FightIdle => PlayerState::Idle,
            PlayerState::FightAttack => PlayerState::Action,
            other => other,
        }
    }

    pub fn plays_footsteps(self) -> bool {
        matches!(
            self,
            PlayerState::Run | PlayerState::RunReverse | PlayerState::FightLeft | PlayerState::FightRight
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
pub enum MovementMode {
    #[default]
    Normal,
    Fight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fight_variants_route_to_plain_states() {
        assert_eq!(PlayerState::FightIdle.canonical(), PlayerState::Idle);
        assert_eq!(PlayerState::FightAttack.canonical(), PlayerState::Action);
        assert_eq!(PlayerState::FightLeft.canonical(), PlayerState::FightLeft);
    }
}
