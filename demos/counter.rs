//! Counter and Review Workflows
//!
//! This example drives two machines built from templates.
//!
//! Key concepts:
//! - Transient states that `run` passes through without waiting
//! - Branches built with when / otherwise / stay
//! - Events feeding conditions, and suspension in stable states
//! - Saving a machine and resuming it from JSON
//!
//! Run with: cargo run --example counter

use std::sync::Arc;
use waypoint::core::{Action, Condition, Hook, StateOptions};
use waypoint::engine::{Failure, Handler, RunStatus};
use waypoint::states;
use waypoint::template::Template;
use waypoint::SavedState;

#[derive(Default)]
struct Counter {
    value: u32,
}

impl Handler for Counter {
    type Event = ();

    fn condition(&self, name: &str, _event: Option<&()>) -> Option<bool> {
        match name {
            "counted" => Some(self.value >= 3),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Verdict {
    Approve,
    Reject,
}

#[derive(Default)]
struct Review {
    revisions: u32,
    notes: Vec<String>,
}

impl Handler for Review {
    type Event = Verdict;

    fn action(&mut self, name: &str, event: Option<&Verdict>) -> Option<Result<(), Failure>> {
        match name {
            "revise" => {
                self.revisions += 1;
                self.notes.push(format!("revision {} after {:?}", self.revisions, event));
                Some(Ok(()))
            }
            _ => None,
        }
    }
}

fn counter() -> Result<(), Box<dyn std::error::Error>> {
    let mut template = Template::<Counter>::new();
    states!(template => {
        "start": [initial],
        "counting": [transient],
        "final": [final],
    });
    template.define_transitions(|t| {
        t.from("start")?
            .goto("counting")?
            .action(Action::infallible(|c: &mut Counter, _| c.value = 0));
        t.from("counting")?
            .when("counted")
            .goto("final")?
            .otherwise()?
            .stay()?
            .action(Action::infallible(|c: &mut Counter, _| c.value += 1));
        Ok(())
    })?;

    println!("{}\n", template.draw());

    let template = Arc::new(template);
    let mut machine = template.instantiate()?;
    let mut counter = Counter::default();
    let outcome = machine.run(&mut counter, None)?;

    println!(
        "Counter stopped in '{}' after {} steps with value {}",
        outcome.state, outcome.steps, counter.value
    );
    println!("Path: {}\n", machine.history().get_path().join(" -> "));
    Ok(())
}

fn review() -> Result<(), Box<dyn std::error::Error>> {
    let mut template = Template::<Review>::new();
    template.declare_state("draft", StateOptions::new().initial());
    template.declare_state("submitted", StateOptions::new());
    template.declare_state("revising", StateOptions::new().transient());
    template.declare_state("published", StateOptions::new().final_state());
    template.define_transitions(|t| {
        t.from("draft")?.goto("submitted")?;
        t.from("submitted")?
            .when(Condition::new("approved", |_: &Review, event| {
                event == Some(&Verdict::Approve)
            }))
            .goto("published")?
            .otherwise()?
            .goto("revising")?
            .action(Action::named("revise"));
        t.from("revising")?.goto("submitted")?;
        Ok(())
    })?;
    template.register_hook(Hook::new(|_: &mut Review, phase, transition, _| {
        println!("  {} {}", phase, transition)
    }));

    let template = Arc::new(template);
    let mut machine = template.instantiate()?;
    let mut review = Review::default();

    machine.run(&mut review, None)?;
    let saved = machine.save().to_json()?;
    println!("Saved review: {}", saved);

    let mut machine = template.instantiate()?;
    machine.restore(&SavedState::from_json(&saved)?)?;

    for verdict in [Verdict::Reject, Verdict::Reject, Verdict::Approve] {
        let outcome = machine.run(&mut review, Some(&verdict))?;
        println!("{:?} -> '{}' ({:?})", verdict, outcome.state, outcome.status);
        if outcome.status == RunStatus::Final {
            break;
        }
    }

    for note in &review.notes {
        println!("  {}", note);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    counter()?;
    review()
}
