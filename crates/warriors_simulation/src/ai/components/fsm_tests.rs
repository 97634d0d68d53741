//! Tests for combat FSM components.

#[cfg(test)]
mod tests {
    use super::super::fsm::{AttackCooldown, CombatState};

    #[test]
    fn test_combat_state_default() {
        let state = CombatState::default();
        assert!(matches!(state, CombatState::Idle));
    }

    #[test]
    fn test_activate_only_wakes_dormant() {
        let mut boss = CombatState::Dormant;
        assert!(boss.activate(false));
        assert_eq!(boss, CombatState::Idle);
        assert!(!boss.activate(false));

        let mut dead = CombatState::Dead { since: 1.0 };
        assert!(!dead.activate(true));
        assert!(dead.is_dead());
    }

    #[test]
    fn test_rest_state_by_capability() {
        assert_eq!(CombatState::rest(true), CombatState::Patrol);
        assert_eq!(CombatState::rest(false), CombatState::Idle);
    }

    #[test]
    fn test_attack_cooldown_default_ready() {
        let cooldown = AttackCooldown::default();
        assert!(cooldown.0.is_ready(0.0));
    }
}
