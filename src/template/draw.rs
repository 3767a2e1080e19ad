//! Graphviz rendering of templates.

use crate::core::{State, Transition};
use crate::engine::Handler;
use crate::template::Template;

fn font_color(text: &str, color: &str) -> String {
    format!(r#"<FONT COLOR="{}">{}</FONT>"#, color, text)
}

/// Node line of a state, labelled with its flags.
pub fn draw_state(state: &State) -> String {
    let mut properties = vec![format!("<B>{}</B>", state.name())];
    if state.is_initial() {
        properties.push(font_color("initial", "blue"));
    }
    if state.is_transient() {
        properties.push(font_color("transient", "dimgray"));
    }
    if state.is_final() {
        properties.push(font_color("final", "darkgreen"));
    }
    format!("{} [label=<{}>];", state.name(), properties.join("<BR/>"))
}

/// Edge line of a transition, labelled with its guard.
pub fn draw_transition<H: Handler>(transition: &Transition<H>) -> String {
    match transition.guard_label() {
        Some(label) => format!(
            r#"{} -> {} [label="{}"]"#,
            transition.from,
            transition.to,
            label.replace('"', "'")
        ),
        None => transition.to_string(),
    }
}

impl<H: Handler> Template<H> {
    /// Render the template in the graphviz language.
    ///
    /// # Example
    ///
    /// ```rust
    /// use waypoint::core::StateOptions;
    /// use waypoint::engine::Handler;
    /// use waypoint::template::{Template, TransitionOptions};
    ///
    /// struct Job;
    ///
    /// impl Handler for Job {
    ///     type Event = ();
    /// }
    ///
    /// let mut template = Template::<Job>::new();
    /// template.declare_state("a", StateOptions::new().initial());
    /// template.declare_state("b", StateOptions::new());
    /// template.declare_transition("a", "b", TransitionOptions::new().condition("ready"), None)?;
    ///
    /// assert_eq!(
    ///     template.draw(),
    ///     "digraph {\n\
    ///      a [label=<<B>a</B><BR/><FONT COLOR=\"blue\">initial</FONT>>];\n\
    ///      b [label=<<B>b</B>>];\n\
    ///      a -> b [label=\"ready\"]\n\
    ///      }"
    /// );
    /// # Ok::<(), waypoint::template::TemplateError>(())
    /// ```
    pub fn draw(&self) -> String {
        let mut lines = vec!["digraph {".to_string()];
        lines.extend(self.states().iter().map(|state| draw_state(state)));
        lines.extend(self.transitions().into_iter().map(draw_transition));
        lines.push("}".to_string());
        lines.join("\n")
    }
}
