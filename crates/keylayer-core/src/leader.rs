// Keylayer Leader Trigger
// Rules that arm and disarm the global leader flag

use crate::compiler::{CompileError, ReservedTrigger};
use crate::effect::Effect;
use crate::key::KeyCode;
use crate::layer::Layers;
use crate::modifier::{FromModifiers, Modifier};
use crate::naming::FlagName;
use crate::rule::{Condition, FromEvent, Manipulator, Rule};

/// How the leader flag gets set and cleared.
///
/// The layer compiler only ever reads and clears the leader; this is the one
/// place that sets it to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderTrigger {
    pub key: KeyCode,
    pub modifiers: Vec<Modifier>,
    /// Keys that disarm the leader without choosing anything
    pub deactivate: Vec<KeyCode>,
}

impl Default for LeaderTrigger {
    /// Meh + Space arms, Caps Lock or Escape disarms
    fn default() -> Self {
        Self {
            key: KeyCode::Spacebar,
            modifiers: Modifier::MEH.to_vec(),
            deactivate: vec![KeyCode::CapsLock, KeyCode::Escape],
        }
    }
}

impl LeaderTrigger {
    fn chord_label(&self) -> String {
        let mut parts: Vec<&str> = self.modifiers.iter().map(|m| m.as_ref()).collect();
        parts.push(self.key.name());
        parts.join("+")
    }

    /// "Activate Leader Key": guard leader == 0 and every sublayer flag == 0,
    /// set leader = 1.
    ///
    /// The leader can't be re-armed while a sublayer is open, so leader-level
    /// commands never fire inside one.
    pub fn activate_rule(&self, sublayer_flags: &[FlagName]) -> Rule {
        let leader = FlagName::leader();
        let mut conditions: Vec<Condition> = sublayer_flags
            .iter()
            .map(|flag| Condition::variable_if(flag.clone(), 0))
            .collect();
        conditions.push(Condition::variable_if(leader.clone(), 0));

        let manipulator = Manipulator::basic(
            FromEvent::with_modifiers(self.key, FromModifiers::mandatory(self.modifiers.iter().copied())),
            vec![Effect::set_variable(leader, 1)],
            conditions,
        )
        .described(Some(format!("{} -> Activate Leader Key", self.chord_label())));

        Rule::new("Activate Leader Key", vec![manipulator])
    }

    /// "Deactivate Leader Key": one manipulator per deactivate key, guard
    /// leader == 1, set leader = 0. `None` when no deactivate keys are set.
    pub fn deactivate_rule(&self) -> Option<Rule> {
        if self.deactivate.is_empty() {
            return None;
        }
        let leader = FlagName::leader();
        let manipulators = self
            .deactivate
            .iter()
            .map(|key| {
                Manipulator::basic(
                    FromEvent::any_modifiers(*key),
                    vec![Effect::set_variable(leader.clone(), 0)],
                    vec![Condition::variable_if(leader.clone(), 1)],
                )
                .described(Some(format!("{} -> Deactivate Leader Key", key)))
            })
            .collect();

        Some(Rule::new("Deactivate Leader Key", manipulators))
    }

    /// Reject leader-level entries bound to a deactivate key.
    ///
    /// Both sides fire on `leader == 1` and the deactivate rule comes first in
    /// the document, so such an entry could never be reached. Deeper entries
    /// are fine: the leader is already cleared once a sublayer is open.
    pub fn check_layers(&self, layers: &Layers) -> Result<(), CompileError> {
        match layers.entries().keys().find(|key| self.deactivate.contains(key)) {
            Some(key) => Err(CompileError::AmbiguousTrigger {
                sublayer: FlagName::leader().to_string(),
                key: *key,
                reserved: ReservedTrigger::LeaderDeactivate,
            }),
            None => Ok(()),
        }
    }

    pub fn rules(&self, sublayer_flags: &[FlagName]) -> Vec<Rule> {
        let mut rules = vec![self.activate_rule(sublayer_flags)];
        rules.extend(self.deactivate_rule());
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::shell;
    use crate::layer::Sublayer;

    #[test]
    fn test_default_activation() {
        let rule = LeaderTrigger::default().activate_rule(&[]);
        let m = &rule.manipulators[0];
        assert_eq!(m.trigger(), KeyCode::Spacebar);
        assert_eq!(
            m.from.modifiers,
            Some(FromModifiers::mandatory(Modifier::MEH))
        );
        assert!(m.requires(&FlagName::leader(), 0));
        assert!(m.sets(&FlagName::leader(), 1));
        assert_eq!(
            m.description.as_deref(),
            Some("left_shift+left_control+left_option+spacebar -> Activate Leader Key")
        );
    }

    #[test]
    fn test_default_deactivation() {
        let rule = LeaderTrigger::default().deactivate_rule().unwrap();
        let keys: Vec<KeyCode> = rule.manipulators.iter().map(|m| m.trigger()).collect();
        assert_eq!(keys, vec![KeyCode::CapsLock, KeyCode::Escape]);
        for m in &rule.manipulators {
            assert!(m.requires(&FlagName::leader(), 1));
            assert!(m.sets(&FlagName::leader(), 0));
        }
    }

    #[test]
    fn test_no_deactivate_keys() {
        let trigger = LeaderTrigger {
            deactivate: vec![],
            ..LeaderTrigger::default()
        };
        assert!(trigger.deactivate_rule().is_none());
        assert_eq!(trigger.rules(&[]).len(), 1);
    }

    #[test]
    fn test_deactivate_key_is_reserved_at_leader_level() {
        let layers = Layers::new().with_command(KeyCode::CapsLock, shell("say hi"));
        assert_eq!(
            LeaderTrigger::default().check_layers(&layers),
            Err(CompileError::AmbiguousTrigger {
                sublayer: "leader".to_string(),
                key: KeyCode::CapsLock,
                reserved: ReservedTrigger::LeaderDeactivate,
            })
        );

        let custom = LeaderTrigger {
            deactivate: vec![KeyCode::F19],
            ..LeaderTrigger::default()
        };
        assert!(custom.check_layers(&layers).is_ok());
    }

    #[test]
    fn test_deactivate_key_allowed_inside_sublayer() {
        let layers = Layers::new().with_sublayer(
            KeyCode::S,
            Sublayer::new().with_command(KeyCode::CapsLock, shell("say hi")),
        );
        assert!(LeaderTrigger::default().check_layers(&layers).is_ok());
    }

    #[test]
    fn test_activation_blocked_by_open_sublayer() {
        let flags = vec![FlagName::new("sublayer_s"), FlagName::new("sublayer_w")];
        let rule = LeaderTrigger::default().activate_rule(&flags);
        let m = &rule.manipulators[0];
        assert_eq!(
            m.conditions,
            vec![
                Condition::variable_if(FlagName::new("sublayer_s"), 0),
                Condition::variable_if(FlagName::new("sublayer_w"), 0),
                Condition::variable_if(FlagName::leader(), 0),
            ]
        );
    }
}
