//! Compiled state machine definitions.
//!
//! A [`Template`] holds the states, the transition table and the hooks of a
//! state machine. It is built through `&mut` methods, then shared as an
//! `Arc<Template<H>>` from which any number of [`Machine`]s are instantiated.

pub mod draw;
pub mod error;
pub mod lint;

pub use error::{Direction, TemplateError};
pub use lint::TemplateViolation;

use crate::builder::{BuildError, TransitionBuilder};
use crate::core::{Action, Condition, Hook, State, StateOptions, Transition};
use crate::engine::{EngineError, Handler, Machine};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Constructor used by [`Template::instantiate`].
pub type MachineFactory<H> =
    Arc<dyn Fn(Arc<Template<H>>) -> Result<Machine<H>, EngineError> + Send + Sync>;

/// Optional settings of [`Template::declare_transition`].
pub struct TransitionOptions<H: Handler> {
    pub condition: Option<Condition<H>>,
    pub negate: bool,
    /// Remove the transitions already declared for the pair instead of
    /// adding one
    pub disable: bool,
    pub description: Option<String>,
}

impl<H: Handler> TransitionOptions<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn condition(mut self, condition: impl Into<Condition<H>>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn negate(mut self) -> Self {
        self.negate = true;
        self
    }

    pub fn disable(mut self) -> Self {
        self.disable = true;
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

impl<H: Handler> Default for TransitionOptions<H> {
    fn default() -> Self {
        Self {
            condition: None,
            negate: false,
            disable: false,
            description: None,
        }
    }
}

/// Transitions grouped by source, then by destination, both in first
/// declaration order.
struct TransitionTable<H: Handler> {
    sources: Vec<(String, Vec<(String, Vec<Transition<H>>)>)>,
}

impl<H: Handler> TransitionTable<H> {
    fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    fn entry(&mut self, from: &str, to: &str) -> &mut Vec<Transition<H>> {
        let index = match self.sources.iter().position(|(name, _)| name == from) {
            Some(index) => index,
            None => {
                self.sources.push((from.to_string(), Vec::new()));
                self.sources.len() - 1
            }
        };
        let targets = &mut self.sources[index].1;
        let index = match targets.iter().position(|(name, _)| name == to) {
            Some(index) => index,
            None => {
                targets.push((to.to_string(), Vec::new()));
                targets.len() - 1
            }
        };
        &mut targets[index].1
    }

    fn leaving(&self, from: &str) -> Vec<&Transition<H>> {
        self.sources
            .iter()
            .filter(|(name, _)| name == from)
            .flat_map(|(_, targets)| targets.iter())
            .flat_map(|(_, transitions)| transitions.iter())
            .collect()
    }

    fn all(&self) -> Vec<&Transition<H>> {
        self.sources
            .iter()
            .flat_map(|(_, targets)| targets.iter())
            .flat_map(|(_, transitions)| transitions.iter())
            .collect()
    }
}

impl<H: Handler> Clone for TransitionTable<H> {
    fn clone(&self) -> Self {
        Self {
            sources: self.sources.clone(),
        }
    }
}

/// Definition of a state machine.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use waypoint::core::StateOptions;
/// use waypoint::engine::Handler;
/// use waypoint::template::Template;
///
/// struct Door {
///     locked: bool,
/// }
///
/// impl Handler for Door {
///     type Event = ();
///
///     fn condition(&self, name: &str, _event: Option<&()>) -> Option<bool> {
///         match name {
///             "locked" => Some(self.locked),
///             _ => None,
///         }
///     }
/// }
///
/// let mut template = Template::<Door>::new();
/// template.declare_state("closed", StateOptions::new().initial());
/// template.declare_state("open", StateOptions::new().final_state());
/// template.define_transitions(|t| {
///     t.from("closed")?.unless("locked").goto("open")?;
///     Ok(())
/// })?;
///
/// let template = Arc::new(template);
/// let mut machine = template.instantiate()?;
/// machine.step(&mut Door { locked: false }, None)?;
/// assert_eq!(machine.current_state().name(), "open");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Template<H: Handler> {
    states: Vec<Arc<State>>,
    transitions: TransitionTable<H>,
    hooks: Vec<Hook<H>>,
    all_states_transient: bool,
    factory: MachineFactory<H>,
}

impl<H: Handler> Template<H> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            transitions: TransitionTable::new(),
            hooks: Vec::new(),
            all_states_transient: false,
            factory: Arc::new(Machine::new),
        }
    }

    /// Derive a template from `parent`.
    ///
    /// The derived template starts with the parent's states, transitions,
    /// hooks, transient toggle and factory. Later changes to either
    /// template do not affect the other.
    pub fn inherit(parent: &Template<H>) -> Self {
        parent.clone()
    }

    /// Declare a state, replacing any state of the same name in place.
    pub fn declare_state(&mut self, name: impl Into<String>, options: StateOptions) -> Arc<State> {
        let mut options = options;
        if self.all_states_transient {
            options.transient = true;
        }
        let state = Arc::new(State::new(name, options));
        debug!(state = %state.name(), ?options, "declared state");

        match self.states.iter_mut().find(|s| s.name() == state.name()) {
            Some(slot) => *slot = Arc::clone(&state),
            None => self.states.push(Arc::clone(&state)),
        }
        state
    }

    /// Declare a transition between two declared states.
    ///
    /// With [`TransitionOptions::disable`] the transitions already declared
    /// for the pair are removed and nothing is added, which lets a derived
    /// template drop an inherited transition.
    pub fn declare_transition(
        &mut self,
        from: &str,
        to: &str,
        options: TransitionOptions<H>,
        action: Option<Action<H>>,
    ) -> Result<(), TemplateError> {
        self.check_endpoints(from, to)?;

        let entry = self.transitions.entry(from, to);
        if options.disable {
            debug!(from, to, "disabled transitions");
            entry.clear();
            return Ok(());
        }

        entry.push(Transition {
            from: from.to_string(),
            to: to.to_string(),
            condition: options.condition,
            negate: options.negate,
            action,
            description: options.description,
        });
        Ok(())
    }

    /// Build transitions with a [`TransitionBuilder`] and register them.
    ///
    /// Nothing is registered when the closure fails or when any built
    /// transition refers to an unknown state.
    pub fn define_transitions<F>(&mut self, f: F) -> Result<(), TemplateError>
    where
        F: FnOnce(&TransitionBuilder<H>) -> Result<(), BuildError>,
    {
        let root = TransitionBuilder::new();
        f(&root)?;
        self.add_transitions(root.build())
    }

    /// Register already built transitions, all of them or none.
    pub fn add_transitions(&mut self, transitions: Vec<Transition<H>>) -> Result<(), TemplateError> {
        for transition in &transitions {
            self.check_endpoints(&transition.from, &transition.to)?;
        }
        debug!(count = transitions.len(), "registering transitions");
        for transition in transitions {
            let from = transition.from.clone();
            let to = transition.to.clone();
            self.transitions.entry(&from, &to).push(transition);
        }
        Ok(())
    }

    /// Append a hook fired before and after every performed transition.
    pub fn register_hook(&mut self, hook: Hook<H>) {
        self.hooks.push(hook);
    }

    /// Make every state declared from now on transient.
    pub fn all_states_transient(&mut self) {
        self.all_states_transient = true;
    }

    pub fn set_factory<F>(&mut self, factory: F)
    where
        F: Fn(Arc<Template<H>>) -> Result<Machine<H>, EngineError> + Send + Sync + 'static,
    {
        self.factory = Arc::new(factory);
    }

    /// Create a machine positioned at the initial state.
    pub fn instantiate(self: &Arc<Self>) -> Result<Machine<H>, EngineError> {
        (self.factory)(Arc::clone(self))
    }

    /// Transitions leaving `from`, grouped by destination in first
    /// declaration order.
    pub fn possible_transitions(&self, from: &str) -> Vec<&Transition<H>> {
        self.transitions.leaving(from)
    }

    pub fn state(&self, name: &str) -> Option<&Arc<State>> {
        self.states.iter().find(|state| state.name() == name)
    }

    pub fn states(&self) -> &[Arc<State>] {
        &self.states
    }

    pub fn hooks(&self) -> &[Hook<H>] {
        &self.hooks
    }

    /// Every declared transition in table order.
    pub fn transitions(&self) -> Vec<&Transition<H>> {
        self.transitions.all()
    }

    fn check_endpoints(&self, from: &str, to: &str) -> Result<(), TemplateError> {
        if self.state(from).is_none() {
            return Err(TemplateError::UnknownStateTransition {
                direction: Direction::From,
                state: from.to_string(),
            });
        }
        if self.state(to).is_none() {
            return Err(TemplateError::UnknownStateTransition {
                direction: Direction::To,
                state: to.to_string(),
            });
        }
        Ok(())
    }
}

impl<H: Handler> Default for Template<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handler> Clone for Template<H> {
    fn clone(&self) -> Self {
        Self {
            states: self.states.clone(),
            transitions: self.transitions.clone(),
            hooks: self.hooks.clone(),
            all_states_transient: self.all_states_transient,
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<H: Handler> fmt::Debug for Template<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("states", &self.states)
            .field("transitions", &self.transitions.all())
            .field("hooks", &self.hooks)
            .field("all_states_transient", &self.all_states_transient)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HookPhase;

    #[derive(Default)]
    struct Job {
        calls: Vec<String>,
    }

    impl Handler for Job {
        type Event = ();
    }

    fn template() -> Template<Job> {
        let mut template = Template::new();
        template.declare_state("a", StateOptions::new().initial());
        template.declare_state("b", StateOptions::new());
        template.declare_state("c", StateOptions::new().final_state());
        template
    }

    fn destinations(transitions: Vec<&Transition<Job>>) -> Vec<&str> {
        transitions.iter().map(|t| t.to.as_str()).collect()
    }

    #[test]
    fn declare_transition_rejects_unknown_source_first() {
        let mut template = template();
        let result = template.declare_transition("x", "y", TransitionOptions::new(), None);

        assert_eq!(
            result.unwrap_err(),
            TemplateError::UnknownStateTransition {
                direction: Direction::From,
                state: "x".into(),
            }
        );
    }

    #[test]
    fn declare_transition_rejects_unknown_target() {
        let mut template = template();
        let result = template.declare_transition("a", "y", TransitionOptions::new(), None);

        assert_eq!(
            result.unwrap_err(),
            TemplateError::UnknownStateTransition {
                direction: Direction::To,
                state: "y".into(),
            }
        );
        assert!(template.possible_transitions("a").is_empty());
    }

    #[test]
    fn possible_transitions_group_by_destination() {
        let mut template = template();
        for to in ["c", "b", "c"] {
            template
                .declare_transition("a", to, TransitionOptions::new(), None)
                .unwrap();
        }
        template
            .declare_transition("b", "c", TransitionOptions::new(), None)
            .unwrap();

        assert_eq!(
            destinations(template.possible_transitions("a")),
            vec!["c", "c", "b"]
        );
        assert_eq!(destinations(template.possible_transitions("b")), vec!["c"]);
        assert!(template.possible_transitions("c").is_empty());
        assert_eq!(template.transitions().len(), 4);
    }

    #[test]
    fn disable_clears_pair_only() {
        let mut template = template();
        template
            .declare_transition("a", "b", TransitionOptions::new(), None)
            .unwrap();
        template
            .declare_transition("a", "c", TransitionOptions::new(), None)
            .unwrap();
        template
            .declare_transition("a", "b", TransitionOptions::new().disable(), None)
            .unwrap();

        assert_eq!(destinations(template.possible_transitions("a")), vec!["c"]);
    }

    #[test]
    fn transition_options_are_carried() {
        let mut template = template();
        template
            .declare_transition(
                "a",
                "b",
                TransitionOptions::new()
                    .condition("ready")
                    .negate()
                    .description("skip when ready"),
                Some(Action::named("go")),
            )
            .unwrap();

        let transition = template.possible_transitions("a")[0];
        assert_eq!(transition.guard_label().as_deref(), Some("!ready"));
        assert_eq!(transition.description.as_deref(), Some("skip when ready"));
        assert_eq!(transition.action.as_ref().map(|a| a.label()), Some("go"));
    }

    #[test]
    fn redeclaring_state_replaces_in_place() {
        let mut template = template();
        template.declare_state("a", StateOptions::new().final_state());

        let names: Vec<_> = template.states().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        let a = template.state("a").unwrap();
        assert!(a.is_final());
        assert!(!a.is_initial());
    }

    #[test]
    fn transient_toggle_applies_to_later_states() {
        let mut template = template();
        template.all_states_transient();
        template.declare_state("d", StateOptions::new());

        assert!(!template.state("a").unwrap().is_transient());
        assert!(template.state("d").unwrap().is_transient());
    }

    #[test]
    fn define_transitions_registers_built_chain() {
        let mut template = template();
        template
            .define_transitions(|t| {
                t.from("a")?.when("ready").goto("b")?.otherwise()?.goto("c")?;
                t.from("b")?.stay()?;
                Ok(())
            })
            .unwrap();

        assert_eq!(
            destinations(template.possible_transitions("a")),
            vec!["b", "c"]
        );
        assert_eq!(destinations(template.possible_transitions("b")), vec!["b"]);
    }

    #[test]
    fn define_transitions_propagates_builder_errors() {
        let mut template = template();
        let result = template.define_transitions(|t| {
            t.from("a")?.otherwise()?;
            Ok(())
        });

        assert_eq!(
            result.unwrap_err(),
            TemplateError::Build(BuildError::ElseWithoutCondition)
        );
    }

    #[test]
    fn add_transitions_is_all_or_nothing() {
        let mut template = template();
        let result = template.add_transitions(vec![
            Transition::new("a", "b"),
            Transition::new("b", "missing"),
        ]);

        assert!(result.is_err());
        assert!(template.transitions().is_empty());
    }

    #[test]
    fn clone_is_independent() {
        let mut original = template();
        original
            .declare_transition("a", "b", TransitionOptions::new(), None)
            .unwrap();

        let mut derived = Template::inherit(&original);
        derived
            .declare_transition("a", "c", TransitionOptions::new(), None)
            .unwrap();
        derived
            .declare_transition("a", "b", TransitionOptions::new().disable(), None)
            .unwrap();
        derived.register_hook(Hook::named("audit"));

        assert_eq!(destinations(original.possible_transitions("a")), vec!["b"]);
        assert_eq!(destinations(derived.possible_transitions("a")), vec!["c"]);
        assert!(original.hooks().is_empty());
        assert_eq!(derived.hooks().len(), 1);
    }

    #[test]
    fn clone_shares_state_values() {
        let original = template();
        let derived = original.clone();

        assert!(Arc::ptr_eq(
            original.state("a").unwrap(),
            derived.state("a").unwrap()
        ));
    }

    #[test]
    fn hooks_keep_registration_order() {
        let mut template = template();
        template.register_hook(Hook::named("first"));
        template.register_hook(Hook::new(|job: &mut Job, phase: HookPhase, _, _| {
            job.calls.push(phase.to_string())
        }));

        let labels: Vec<_> = template.hooks().iter().map(|h| h.label()).collect();
        assert_eq!(labels, vec!["first", "<closure>"]);
    }

    #[test]
    fn custom_factory_builds_machines() {
        let mut template = template();
        template.declare_state("b", StateOptions::new().initial());
        template.declare_state("a", StateOptions::new());
        template.set_factory(|template| {
            let mut machine = Machine::new(template)?;
            machine.resolve_initial_state()?;
            Ok(machine)
        });

        let machine = Arc::new(template).instantiate().unwrap();
        assert_eq!(machine.current_state().name(), "b");
    }

    #[test]
    fn instantiate_requires_unique_initial_state() {
        let mut template = template();
        template.declare_state("b", StateOptions::new().initial());

        let result = Arc::new(template).instantiate();
        assert_eq!(
            result.unwrap_err(),
            EngineError::NoDeterministicInitialState {
                states: vec!["a".into(), "b".into()],
            }
        );
    }
}
