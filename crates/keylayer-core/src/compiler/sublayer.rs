// Keylayer Sublayer Compiler
// Turns one sublayer into its activate / escape / command manipulators

use crate::command::CommandLeaf;
use crate::effect::Effect;
use crate::key::KeyCode;
use crate::layer::{LayerEntry, Sublayer};
use crate::naming::{display_path, FlagName, VariableNaming};
use crate::rule::{Condition, FromEvent, Manipulator, Rule};

use super::{CompileError, CompileWarning, ReservedTrigger};

/// Key that cancels whichever sublayer is open
pub const ESCAPE_KEY: KeyCode = KeyCode::Escape;

/// Where a sublayer sits in the compilation unit
#[derive(Debug, Clone, Copy)]
pub struct SublayerContext<'a> {
    /// Keys from the top level down to this sublayer (last = its activation key)
    pub path: &'a [KeyCode],
    /// Flag that must be set for this sublayer to open: the leader for
    /// top-level sublayers, the enclosing sublayer's flag otherwise
    pub parent: &'a FlagName,
    /// Every sublayer flag of the compilation unit, in declaration order
    pub all_flags: &'a [FlagName],
}

/// Compile a sublayer and, depth-first, every sublayer nested in it.
///
/// The first returned rule is this sublayer's own group: one activation
/// manipulator, one escape manipulator, then one manipulator per command entry
/// in declaration order. Nested sublayers follow as their own groups.
pub fn compile_sublayer<N: VariableNaming + ?Sized>(
    naming: &N,
    ctx: SublayerContext<'_>,
    node: &Sublayer,
    warnings: &mut Vec<CompileWarning>,
) -> Result<Vec<Rule>, CompileError> {
    let key = *ctx.path.last().ok_or(CompileError::EmptyPath)?;
    let flag = naming.name_for(ctx.path);
    let label = display_path(ctx.path);
    let leader = FlagName::leader();

    if node.is_empty() {
        log::warn!("Sublayer '{}' has no entries", label);
        warnings.push(CompileWarning::EmptySublayer { sublayer: label.clone() });
    }

    let mut manipulators = Vec::with_capacity(2 + node.len());
    manipulators.push(activation(key, &flag, &label, &ctx));
    manipulators.push(
        Manipulator::basic(
            FromEvent::any_modifiers(ESCAPE_KEY),
            vec![Effect::set_variable(flag.clone(), 0)],
            vec![Condition::variable_if(flag.clone(), 1)],
        )
        .described(Some(format!("Disable Leader sublayer {}", label))),
    );

    let mut nested = Vec::new();
    for (entry_key, entry) in node.entries() {
        if *entry_key == key {
            return Err(CompileError::AmbiguousTrigger {
                sublayer: label,
                key: *entry_key,
                reserved: ReservedTrigger::ActivationKey,
            });
        }
        if *entry_key == ESCAPE_KEY {
            return Err(CompileError::AmbiguousTrigger {
                sublayer: label,
                key: *entry_key,
                reserved: ReservedTrigger::EscapeKey,
            });
        }

        let mut child_path = ctx.path.to_vec();
        child_path.push(*entry_key);

        match entry {
            LayerEntry::Command(command) => {
                manipulators.push(command_in_sublayer(
                    *entry_key,
                    command,
                    &flag,
                    &leader,
                    &child_path,
                )?);
            }
            LayerEntry::Sublayer(child) => {
                let child_ctx = SublayerContext {
                    path: &child_path,
                    parent: &flag,
                    all_flags: ctx.all_flags,
                };
                nested.extend(compile_sublayer(naming, child_ctx, child, warnings)?);
            }
        }
    }

    log::debug!(
        "Sublayer '{}' ({}) compiled into {} manipulators",
        label,
        flag,
        manipulators.len()
    );

    let mut rules = Vec::with_capacity(1 + nested.len());
    rules.push(Rule::new(format!("Leader Key sublayer {}", label), manipulators));
    rules.extend(nested);
    Ok(rules)
}

/// Opens the sublayer: sets its flag, clears the parent's.
///
/// Guard: parent set, every other sublayer flag clear. The other-flag clause is
/// what keeps at most one sublayer open at a time.
fn activation(key: KeyCode, flag: &FlagName, label: &str, ctx: &SublayerContext<'_>) -> Manipulator {
    let mut conditions: Vec<Condition> = ctx
        .all_flags
        .iter()
        .filter(|other| *other != flag && *other != ctx.parent)
        .map(|other| Condition::variable_if(other.clone(), 0))
        .collect();
    conditions.push(Condition::variable_if(ctx.parent.clone(), 1));

    Manipulator::basic(
        FromEvent::any_modifiers(key),
        vec![
            Effect::set_variable(flag.clone(), 1),
            Effect::set_variable(ctx.parent.clone(), 0),
        ],
        conditions,
    )
    .described(Some(format!("Enable Leader sublayer {}", label)))
}

fn command_in_sublayer(
    key: KeyCode,
    command: &CommandLeaf,
    flag: &FlagName,
    leader: &FlagName,
    path: &[KeyCode],
) -> Result<Manipulator, CompileError> {
    if command.is_empty() {
        return Err(CompileError::EmptyCommand {
            path: display_path(path),
        });
    }

    let mut to = command.effects().to_vec();
    to.push(Effect::set_variable(flag.clone(), 0));
    to.push(Effect::set_variable(leader.clone(), 0));

    Ok(Manipulator::basic(
        FromEvent::any_modifiers(key),
        to,
        vec![Condition::variable_if(flag.clone(), 1)],
    )
    .described(command.description()))
}
