use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::DefinitionError;

/// One row of a machine definition's transition table.
#[derive(Debug)]
pub struct Transition<S, E, A> {
    /// State the machine must be in for this transition to apply.
    pub source: S,

    /// Event type that drives the transition.
    pub event: E,

    /// State the machine moves to.
    pub target: S,

    /// Workflow action attached to the transition, if any. Opaque to the
    /// state machine; executed by the replication engine.
    pub action: Option<A>,
}

/// A per-domain transition table with a single initial state.
///
/// The table is a partial function: an event type arriving in a state with
/// no matching row produces no transition. Built once via
/// [`MachineDefinition::builder`] and shared read-only across replications.
#[derive(Debug)]
pub struct MachineDefinition<S, E, A> {
    initial: S,
    transitions: HashMap<(S, E), Transition<S, E, A>>,
}

impl<S, E, A> MachineDefinition<S, E, A>
where
    S: Copy + Eq + Hash + fmt::Debug,
    E: Copy + Eq + Hash + fmt::Debug,
{
    /// Starts building a definition with the given initial state.
    pub fn builder(initial: S) -> DefinitionBuilder<S, E, A> {
        DefinitionBuilder {
            initial,
            transitions: Vec::new(),
        }
    }

    /// Returns the domain's initial state.
    pub fn initial(&self) -> S {
        self.initial
    }

    /// Pure step function: looks up the transition for
    /// `(current state, event type)`.
    ///
    /// Returns `None` when the table defines no transition for the pair;
    /// the caller is expected to leave the state unchanged and skip the
    /// log entry.
    pub fn step(&self, state: S, event: E) -> Option<&Transition<S, E, A>> {
        self.transitions.get(&(state, event))
    }

    /// Returns true if no transition leaves the given state.
    pub fn is_terminal(&self, state: S) -> bool {
        !self.transitions.keys().any(|(source, _)| *source == state)
    }

    /// Number of rows in the table.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }
}

/// Builder enforcing the construction-time invariants of a definition.
pub struct DefinitionBuilder<S, E, A> {
    initial: S,
    transitions: Vec<Transition<S, E, A>>,
}

impl<S, E, A> DefinitionBuilder<S, E, A>
where
    S: Copy + Eq + Hash + fmt::Debug,
    E: Copy + Eq + Hash + fmt::Debug,
{
    /// Adds a transition with an attached action.
    pub fn transition(mut self, source: S, event: E, target: S, action: A) -> Self {
        self.transitions.push(Transition {
            source,
            event,
            target,
            action: Some(action),
        });
        self
    }

    /// Adds a transition with no action.
    pub fn passive_transition(mut self, source: S, event: E, target: S) -> Self {
        self.transitions.push(Transition {
            source,
            event,
            target,
            action: None,
        });
        self
    }

    /// Finalizes the definition, rejecting duplicate
    /// `(source, event)` keys.
    pub fn build(self) -> Result<MachineDefinition<S, E, A>, DefinitionError> {
        let mut table = HashMap::with_capacity(self.transitions.len());
        for transition in self.transitions {
            let key = (transition.source, transition.event);
            if table.contains_key(&key) {
                return Err(DefinitionError::DuplicateTransition {
                    source_state: format!("{:?}", transition.source),
                    event: format!("{:?}", transition.event),
                });
            }
            table.insert(key, transition);
        }

        Ok(MachineDefinition {
            initial: self.initial,
            transitions: table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum State {
        Draft,
        Open,
        Closed,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Event {
        Opened,
        Closed,
    }

    fn definition() -> MachineDefinition<State, Event, &'static str> {
        MachineDefinition::builder(State::Draft)
            .transition(State::Draft, Event::Opened, State::Open, "open")
            .transition(State::Open, Event::Closed, State::Closed, "close")
            .build()
            .unwrap()
    }

    #[test]
    fn step_returns_matching_transition() {
        let def = definition();
        let transition = def.step(State::Draft, Event::Opened).unwrap();
        assert_eq!(transition.target, State::Open);
        assert_eq!(transition.action, Some("open"));
    }

    #[test]
    fn step_is_partial() {
        let def = definition();
        assert!(def.step(State::Draft, Event::Closed).is_none());
        assert!(def.step(State::Closed, Event::Opened).is_none());
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let result = MachineDefinition::builder(State::Draft)
            .transition(State::Draft, Event::Opened, State::Open, "a")
            .transition(State::Draft, Event::Opened, State::Closed, "b")
            .build();

        assert_eq!(
            result.err(),
            Some(DefinitionError::DuplicateTransition {
                source_state: "Draft".to_string(),
                event: "Opened".to_string(),
            })
        );
    }

    #[test]
    fn same_event_from_different_states_is_allowed() {
        let def = MachineDefinition::builder(State::Draft)
            .transition(State::Draft, Event::Closed, State::Closed, "a")
            .transition(State::Open, Event::Closed, State::Closed, "b")
            .build()
            .unwrap();
        assert_eq!(def.transition_count(), 2);
    }

    #[test]
    fn terminal_states_have_no_outgoing_transitions() {
        let def = definition();
        assert!(!def.is_terminal(State::Draft));
        assert!(!def.is_terminal(State::Open));
        assert!(def.is_terminal(State::Closed));
    }

    #[test]
    fn passive_transitions_carry_no_action() {
        let def: MachineDefinition<State, Event, &'static str> =
            MachineDefinition::builder(State::Draft)
                .passive_transition(State::Draft, Event::Opened, State::Open)
                .build()
                .unwrap();
        let transition = def.step(State::Draft, Event::Opened).unwrap();
        assert!(transition.action.is_none());
    }
}
