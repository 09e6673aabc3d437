use std::fmt;
use std::hash::Hash;

use crate::{MachineDefinition, Transition};

/// Outcome of feeding one event into a [`Machine`].
#[derive(Debug)]
pub enum Step<'d, S, E, A> {
    /// A transition matched; the machine has already moved to its target.
    Applied(&'d Transition<S, E, A>),

    /// No transition is defined for the current `(state, event)` pair.
    /// The state is unchanged and the event is consumed without effect.
    Skipped { state: S, event: E },
}

impl<S, E, A> Step<'_, S, E, A> {
    /// Returns true if a transition was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, Step::Applied(_))
    }
}

/// An ephemeral state machine instance.
///
/// Created fresh for every replication call and discarded immediately
/// after. Holds only the current state; it carries no identity beyond the
/// single replay that created it, which is what keeps replay idempotent
/// and lock-free.
pub struct Machine<'d, S, E, A> {
    definition: &'d MachineDefinition<S, E, A>,
    state: S,
}

impl<'d, S, E, A> Machine<'d, S, E, A>
where
    S: Copy + Eq + Hash + fmt::Debug,
    E: Copy + Eq + Hash + fmt::Debug,
{
    /// Creates an instance positioned at the definition's initial state.
    pub fn new(definition: &'d MachineDefinition<S, E, A>) -> Self {
        Self {
            definition,
            state: definition.initial(),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> S {
        self.state
    }

    /// Feeds one event into the machine.
    ///
    /// On a match the machine advances to the target state and the applied
    /// transition is returned so the caller can run its action. On no
    /// match the state is left untouched.
    pub fn fire(&mut self, event: E) -> Step<'d, S, E, A> {
        match self.definition.step(self.state, event) {
            Some(transition) => {
                self.state = transition.target;
                Step::Applied(transition)
            }
            None => Step::Skipped {
                state: self.state,
                event,
            },
        }
    }
}
