//! Macros for ergonomic template construction.

/// Declare several states on a template at once.
///
/// Each entry is a state name, optionally followed by a bracketed list of
/// flags out of `initial`, `final` and `transient`.
///
/// # Example
///
/// ```
/// use waypoint::states;
/// use waypoint::engine::Handler;
/// use waypoint::template::Template;
///
/// struct Job;
///
/// impl Handler for Job {
///     type Event = ();
/// }
///
/// let mut template = Template::<Job>::new();
/// states!(template => {
///     "start": [initial],
///     "counting": [transient],
///     "done": [final, transient],
///     "idle",
/// });
///
/// assert!(template.state("start").unwrap().is_initial());
/// assert!(template.state("done").unwrap().is_final());
/// assert!(!template.state("idle").unwrap().is_transient());
/// ```
#[macro_export]
macro_rules! states {
    (@flag $options:ident, initial) => {
        $options.initial()
    };
    (@flag $options:ident, final) => {
        $options.final_state()
    };
    (@flag $options:ident, transient) => {
        $options.transient()
    };
    (
        $template:expr => {
            $(
                $name:literal $(: [$($flag:tt),* $(,)?])?
            ),* $(,)?
        }
    ) => {{
        let template = &mut $template;
        $(
            #[allow(unused_mut)]
            let mut options = $crate::core::StateOptions::new();
            $($(options = $crate::states!(@flag options, $flag);)*)?
            template.declare_state($name, options);
        )*
    }};
}
