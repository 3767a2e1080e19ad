//! Tree builder turning chained calls into flat transition lists.

use crate::builder::error::BuildError;
use crate::core::{Action, Condition, Transition};
use crate::engine::Handler;
use std::cell::RefCell;
use std::rc::Rc;

struct Node<H: Handler> {
    from: Option<String>,
    to: Option<String>,
    condition: Option<Condition<H>>,
    negate: bool,
    action: Option<Action<H>>,
    description: Option<String>,
    children: Vec<usize>,
}

impl<H: Handler> Node<H> {
    fn new(from: Option<String>, to: Option<String>) -> Self {
        Self {
            from,
            to,
            condition: None,
            negate: false,
            action: None,
            description: None,
            children: Vec::new(),
        }
    }

    fn is_complete(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }
}

/// Handle to a node of a transition definition tree.
///
/// Every call that branches (`from`, `when`, `unless`, `otherwise`,
/// `otherwise_when`) registers a child node and returns a handle to it;
/// `goto`, `action`, `stay` and `description` modify the node in place and
/// return the same handle. Handles share one tree, so `build` on the root
/// sees everything appended through any handle.
///
/// # Example
///
/// ```rust
/// use waypoint::builder::TransitionBuilder;
/// use waypoint::engine::Handler;
///
/// struct Job;
///
/// impl Handler for Job {
///     type Event = ();
/// }
///
/// let root = TransitionBuilder::<Job>::new();
/// root.from("counting")?
///     .when("done")
///     .goto("final")?
///     .otherwise()?
///     .stay()?;
///
/// let transitions = root.build();
/// assert_eq!(transitions.len(), 2);
/// assert_eq!(transitions[0].to, "final");
/// assert!(!transitions[0].negate);
/// assert_eq!(transitions[1].to, "counting");
/// assert!(transitions[1].negate);
/// # Ok::<(), waypoint::builder::BuildError>(())
/// ```
pub struct TransitionBuilder<H: Handler> {
    arena: Rc<RefCell<Vec<Node<H>>>>,
    id: usize,
}

impl<H: Handler> TransitionBuilder<H> {
    /// Create an empty root node.
    pub fn new() -> Self {
        Self {
            arena: Rc::new(RefCell::new(vec![Node::new(None, None)])),
            id: 0,
        }
    }

    fn spawn(&self, node: Node<H>) -> Self {
        let mut arena = self.arena.borrow_mut();
        let id = arena.len();
        arena.push(node);
        arena[self.id].children.push(id);
        Self {
            arena: Rc::clone(&self.arena),
            id,
        }
    }

    fn read<R>(&self, f: impl FnOnce(&Node<H>) -> R) -> R {
        f(&self.arena.borrow()[self.id])
    }

    fn write<R>(&self, f: impl FnOnce(&mut Node<H>) -> R) -> R {
        f(&mut self.arena.borrow_mut()[self.id])
    }

    /// Start a chain from the named source state (fluent form).
    pub fn from(&self, name: impl Into<String>) -> Result<Self, BuildError> {
        if let Some(from) = self.read(|node| node.from.clone()) {
            return Err(BuildError::SourceAlreadySet(from));
        }
        Ok(self.spawn(Node::new(Some(name.into()), None)))
    }

    /// Scope a block of branches under one source state (grouping form).
    ///
    /// Returns this node, not the child handed to `f`.
    pub fn from_with<F>(&self, name: impl Into<String>, f: F) -> Result<Self, BuildError>
    where
        F: FnOnce(&Self) -> Result<(), BuildError>,
    {
        let child = self.from(name)?;
        f(&child)?;
        Ok(self.clone())
    }

    fn branch(&self, condition: Condition<H>, negate: bool, keep_target: bool) -> Self {
        let (from, to) = self.read(|node| (node.from.clone(), node.to.clone()));
        let mut node = Node::new(from, if keep_target { to } else { None });
        node.condition = Some(condition);
        node.negate = negate;
        self.spawn(node)
    }

    /// Branch on a condition, inheriting source and target.
    pub fn when(&self, condition: impl Into<Condition<H>>) -> Self {
        self.branch(condition.into(), false, true)
    }

    /// Branch on a negated condition, inheriting source and target.
    pub fn unless(&self, condition: impl Into<Condition<H>>) -> Self {
        self.branch(condition.into(), true, true)
    }

    /// Branch taken when this node's condition does not hold.
    ///
    /// The new branch keeps the source, needs its own target and inverts
    /// the negate flag of this node.
    pub fn otherwise(&self) -> Result<Self, BuildError> {
        let (from, condition, negate) =
            self.read(|node| (node.from.clone(), node.condition.clone(), node.negate));
        let condition = condition.ok_or(BuildError::ElseWithoutCondition)?;
        let mut node = Node::new(from, None);
        node.condition = Some(condition);
        node.negate = !negate;
        Ok(self.spawn(node))
    }

    /// Branch on a new condition with the target cleared.
    pub fn otherwise_when(&self, condition: impl Into<Condition<H>>) -> Self {
        self.branch(condition.into(), false, false)
    }

    /// Set the target state.
    pub fn goto(&self, name: impl Into<String>) -> Result<Self, BuildError> {
        self.write(|node| {
            if let Some(to) = &node.to {
                return Err(BuildError::TargetAlreadySet(to.clone()));
            }
            node.to = Some(name.into());
            Ok(())
        })?;
        Ok(self.clone())
    }

    /// Set (or replace) the action run when the transition is performed.
    pub fn action(&self, action: Action<H>) -> Self {
        self.write(|node| node.action = Some(action));
        self.clone()
    }

    /// Target the source state.
    pub fn stay(&self) -> Result<Self, BuildError> {
        let from = self
            .read(|node| node.from.clone())
            .ok_or(BuildError::StayWithoutSource)?;
        self.goto(from)
    }

    /// Attach a note for diagnostics. It has no runtime effect.
    pub fn description(&self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.write(|node| node.description = Some(text));
        self.clone()
    }

    /// Check if both source and target are set on this node.
    pub fn is_complete(&self) -> bool {
        self.read(Node::is_complete)
    }

    /// Flatten this node and its descendants, pre-order, dropping nodes
    /// that lack a source or target.
    pub fn build(&self) -> Vec<Transition<H>> {
        let arena = self.arena.borrow();
        let mut transitions = Vec::new();
        flatten(&arena, self.id, &mut transitions);
        transitions
    }
}

fn flatten<H: Handler>(arena: &[Node<H>], id: usize, out: &mut Vec<Transition<H>>) {
    let node = &arena[id];
    if let (Some(from), Some(to)) = (&node.from, &node.to) {
        out.push(Transition {
            from: from.clone(),
            to: to.clone(),
            condition: node.condition.clone(),
            negate: node.negate,
            action: node.action.clone(),
            description: node.description.clone(),
        });
    }
    for child in &node.children {
        flatten(arena, *child, out);
    }
}

impl<H: Handler> Clone for TransitionBuilder<H> {
    fn clone(&self) -> Self {
        Self {
            arena: Rc::clone(&self.arena),
            id: self.id,
        }
    }
}

impl<H: Handler> Default for TransitionBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Failure;

    struct Switch {
        flag: bool,
        value: i32,
    }

    impl Handler for Switch {
        type Event = ();
    }

    fn switch(flag: bool) -> Switch {
        Switch { flag, value: 0 }
    }

    fn flag() -> Condition<Switch> {
        Condition::new("flag", |p: &Switch, _| p.flag)
    }

    #[test]
    fn builds_simple_transition() {
        let root = TransitionBuilder::<Switch>::new();
        root.from("start").unwrap().goto("end").unwrap();

        let transitions = root.build();
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].from, "start");
        assert_eq!(transitions[0].to, "end");
        assert!(transitions[0].condition.is_none());
        assert!(transitions[0].action.is_none());
    }

    #[test]
    fn carries_action() {
        let root = TransitionBuilder::<Switch>::new();
        root.from("start")
            .unwrap()
            .action(Action::infallible(|p: &mut Switch, _| p.value = 15))
            .goto("end")
            .unwrap();

        let transitions = root.build();
        let mut handler = switch(false);
        let action = transitions[0].action.as_ref().unwrap();

        assert_eq!(action.invoke(&mut handler, None), Some(Ok(())));
        assert_eq!(handler.value, 15);
    }

    #[test]
    fn later_action_replaces_earlier() {
        let root = TransitionBuilder::<Switch>::new();
        root.from("start")
            .unwrap()
            .action(Action::infallible(|p: &mut Switch, _| p.value = 1))
            .action(Action::new(|_: &mut Switch, _| Err(Failure::new("second"))))
            .goto("end")
            .unwrap();

        let transitions = root.build();
        let result = transitions[0]
            .action
            .as_ref()
            .unwrap()
            .invoke(&mut switch(false), None);
        assert_eq!(result, Some(Err(Failure::new("second"))));
    }

    #[test]
    fn when_and_otherwise_split_on_condition() {
        let root = TransitionBuilder::<Switch>::new();
        root.from("a")
            .unwrap()
            .when(flag())
            .goto("b")
            .unwrap()
            .otherwise()
            .unwrap()
            .goto("c2")
            .unwrap();

        let transitions = root.build();
        assert_eq!(transitions.len(), 2);

        assert_eq!((transitions[0].from.as_str(), transitions[0].to.as_str()), ("a", "b"));
        assert!(!transitions[0].negate);
        assert_eq!(transitions[0].condition.as_ref().unwrap().tag(), "flag");

        assert_eq!((transitions[1].from.as_str(), transitions[1].to.as_str()), ("a", "c2"));
        assert!(transitions[1].negate);
        assert_eq!(transitions[1].condition.as_ref().unwrap().tag(), "flag");
    }

    #[test]
    fn otherwise_branches_are_mutually_exclusive() {
        let root = TransitionBuilder::<Switch>::new();
        root.from_with("start", |start| {
            start
                .when(flag())
                .goto("true-end")?
                .otherwise()?
                .goto("false-end")?;
            Ok(())
        })
        .unwrap();

        let transitions = root.build();
        for handler in [switch(true), switch(false)] {
            let eligible: Vec<_> = transitions
                .iter()
                .filter(|t| t.is_eligible(&handler, None) == Some(true))
                .map(|t| t.to.as_str())
                .collect();
            let expected = if handler.flag { "true-end" } else { "false-end" };
            assert_eq!(eligible, vec![expected]);
        }
    }

    #[test]
    fn otherwise_of_unless_restores_positive_condition() {
        let root = TransitionBuilder::<Switch>::new();
        root.from("a")
            .unwrap()
            .unless(flag())
            .goto("b")
            .unwrap()
            .otherwise()
            .unwrap()
            .goto("c")
            .unwrap();

        let transitions = root.build();
        assert!(transitions[0].negate);
        assert!(!transitions[1].negate);
    }

    #[test]
    fn otherwise_requires_condition() {
        let root = TransitionBuilder::<Switch>::new();
        let result = root.from("a").unwrap().goto("b").unwrap().otherwise();

        assert!(matches!(result, Err(BuildError::ElseWithoutCondition)));
    }

    #[test]
    fn otherwise_when_clears_inherited_target() {
        let root = TransitionBuilder::<Switch>::new();
        let branch = root
            .from("a")
            .unwrap()
            .when(flag())
            .goto("b")
            .unwrap()
            .otherwise_when("other");

        assert!(!branch.is_complete());
        branch.goto("c").unwrap();

        let transitions = root.build();
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[1].to, "c");
        assert_eq!(transitions[1].condition.as_ref().unwrap().tag(), "other");
        assert!(!transitions[1].negate);
    }

    #[test]
    fn when_inherits_target() {
        let root = TransitionBuilder::<Switch>::new();
        root.from("a").unwrap().goto("b").unwrap().when(flag());

        let transitions = root.build();
        assert_eq!(transitions.len(), 2);
        assert!(transitions[0].condition.is_none());
        assert_eq!(transitions[1].to, "b");
        assert!(transitions[1].condition.is_some());
    }

    #[test]
    fn stay_targets_source() {
        let root = TransitionBuilder::<Switch>::new();
        root.from("start").unwrap().stay().unwrap();

        let transitions = root.build();
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].from, "start");
        assert_eq!(transitions[0].to, "start");
    }

    #[test]
    fn stay_requires_source() {
        let root = TransitionBuilder::<Switch>::new();

        assert!(matches!(root.stay(), Err(BuildError::StayWithoutSource)));
    }

    #[test]
    fn goto_refuses_to_redefine_target() {
        let root = TransitionBuilder::<Switch>::new();
        let result = root
            .from("start")
            .unwrap()
            .goto("end")
            .unwrap()
            .goto("another_end");

        assert_eq!(result.err(), Some(BuildError::TargetAlreadySet("end".into())));
    }

    #[test]
    fn from_refuses_to_redefine_source() {
        let root = TransitionBuilder::<Switch>::new();
        let result = root.from("start").unwrap().from("other");

        assert_eq!(
            result.err(),
            Some(BuildError::SourceAlreadySet("start".into()))
        );
    }

    #[test]
    fn ignores_incomplete_nodes() {
        let root = TransitionBuilder::<Switch>::new();
        root.from("foo").unwrap();
        root.from("bar").unwrap();
        root.from("baz").unwrap().when("something");
        root.goto("end").unwrap().action(Action::named("never"));
        root.from("start").unwrap().goto("end").unwrap();

        let transitions = root.build();
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].from, "start");
        assert_eq!(transitions[0].to, "end");
    }

    #[test]
    fn grouping_form_returns_original_node() {
        let root = TransitionBuilder::<Switch>::new();
        let returned = root
            .from_with("a", |a| {
                a.goto("b")?;
                Ok(())
            })
            .unwrap();

        returned.from("c").unwrap().goto("d").unwrap();

        let pairs: Vec<_> = root
            .build()
            .into_iter()
            .map(|t| (t.from, t.to))
            .collect();
        assert_eq!(
            pairs,
            vec![("a".to_string(), "b".to_string()), ("c".to_string(), "d".to_string())]
        );
    }

    #[test]
    fn grouping_form_propagates_errors() {
        let root = TransitionBuilder::<Switch>::new();
        let result = root.from_with("a", |a| {
            a.goto("b")?.goto("c")?;
            Ok(())
        });

        assert!(matches!(result, Err(BuildError::TargetAlreadySet(_))));
    }

    #[test]
    fn description_is_carried() {
        let root = TransitionBuilder::<Switch>::new();
        root.from("a")
            .unwrap()
            .goto("b")
            .unwrap()
            .description("leave a");

        assert_eq!(root.build()[0].description.as_deref(), Some("leave a"));
    }
}
