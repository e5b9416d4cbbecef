//! Answer formats: the widgets that capture a question's answer.
//!
//! Interactive elements are marked rather than wired: option and confirm
//! controls are the `.clickable` elements of their templates and carry a
//! `data-answer` or `data-action` attribute, text inputs carry
//! `data-action="submit"`. The host turns DOM events on those elements into
//! [`Interaction`] values.

use tracing::{debug, error, warn};

use crate::binder::bindings;
use crate::dom::{self, Element, Node};
use crate::listeners::Listeners;
use crate::template::{Template, Templates};
use crate::{AnswerState, FormatSpec};

/// Class marking the interactive element of option and confirm templates.
pub const CLICKABLE_CLASS: &str = "clickable";
/// Attribute holding the option an element selects.
pub const ANSWER_ATTR: &str = "data-answer";
/// Attribute naming the action an element triggers.
pub const ACTION_ATTR: &str = "data-action";
/// Attribute set on options that are currently selected.
pub const SELECTED_ATTR: &str = "data-selected";

/// A user interaction delivered to the displayed answer format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// An option was clicked.
    Click(String),
    /// The text input changed, without submitting.
    Input(String),
    /// The confirm control was activated.
    Confirm,
    /// The text input was submitted with the given text.
    Submit(String),
}

/// Captures a user's answer and notifies listeners on confirmation.
#[derive(Debug)]
pub enum AnswerFormat {
    /// Choose one or several options.
    Select(SelectFormat),
    /// Enter free text.
    Text(TextFormat),
}

impl AnswerFormat {
    /// Build the format described by `spec` from the shared templates.
    pub fn from_spec(spec: &FormatSpec, templates: &Templates) -> Self {
        match spec {
            FormatSpec::Select { multiple, options } => Self::Select(SelectFormat::new(
                templates.option.clone(),
                *multiple,
                options.clone(),
                templates.confirm.clone(),
            )),
            FormatSpec::Text => Self::Text(TextFormat::new(templates.text_input.clone())),
        }
    }

    /// Render a fresh fragment for this format.
    pub fn render(&self) -> Vec<Node> {
        match self {
            Self::Select(select) => select.render(),
            Self::Text(text) => text.render(),
        }
    }

    /// The current answer; empty means unanswered.
    pub fn state(&self) -> &AnswerState {
        match self {
            Self::Select(select) => select.state(),
            Self::Text(text) => text.state(),
        }
    }

    /// Register a listener called with the state on every confirmation.
    pub fn add_listener(&mut self, listener: impl FnMut(&AnswerState) + 'static) {
        match self {
            Self::Select(select) => select.add_listener(listener),
            Self::Text(text) => text.add_listener(listener),
        }
    }

    /// Apply an interaction. Returns the confirmed state if it confirmed.
    pub fn interact(&mut self, interaction: &Interaction) -> Option<AnswerState> {
        match (self, interaction) {
            (Self::Select(select), Interaction::Click(option)) => select.click(option),
            (Self::Select(select), Interaction::Confirm) => select.confirm(),
            (Self::Text(text), Interaction::Input(value)) => {
                text.input(value);
                None
            }
            (Self::Text(text), Interaction::Confirm) => text.confirm(),
            (Self::Text(text), Interaction::Submit(value)) => Some(text.submit(value)),
            (format, interaction) => {
                debug!(
                    format = format.type_name(),
                    ?interaction,
                    "Interaction does not apply to this answer format, ignoring"
                );
                None
            }
        }
    }

    /// The type tag of this format.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Select(_) => "select",
            Self::Text(_) => "text",
        }
    }
}

/// Single- or multiple-choice selection from a fixed list of options.
#[derive(Debug)]
pub struct SelectFormat {
    template: Template,
    multiple: bool,
    options: Vec<String>,
    confirm_template: Option<Template>,
    state: AnswerState,
    listeners: Listeners<AnswerState>,
}

impl SelectFormat {
    /// Create a select format.
    ///
    /// A multiple-choice select without a confirm template is accepted but
    /// can never confirm.
    pub fn new(
        template: Template,
        multiple: bool,
        options: Vec<String>,
        confirm_template: Option<Template>,
    ) -> Self {
        if multiple && confirm_template.is_none() {
            error!(
                ?options,
                "Multiple-choice select has no confirm template; it can never be confirmed"
            );
        }
        Self {
            template,
            multiple,
            options,
            confirm_template,
            state: AnswerState::new(),
            listeners: Listeners::new(),
        }
    }

    /// The selected options, in declaration order.
    pub fn state(&self) -> &AnswerState {
        &self.state
    }

    /// Register a confirmation listener.
    pub fn add_listener(&mut self, listener: impl FnMut(&AnswerState) + 'static) {
        self.listeners.add(listener);
    }

    /// Handle a click on `option`.
    ///
    /// Single choice sets the state and confirms immediately; multiple choice
    /// toggles the option and waits for `confirm`.
    pub fn click(&mut self, option: &str) -> Option<AnswerState> {
        if !self.options.iter().any(|o| o == option) {
            warn!(option, "Clicked option is not part of this select, ignoring");
            return None;
        }

        if self.multiple {
            let selected = self.state.toggle(option, &self.options);
            debug!(option, selected, "Toggled option");
            None
        } else {
            self.state.set_single(option);
            Some(self.fire())
        }
    }

    /// Handle activation of the confirm control.
    pub fn confirm(&mut self) -> Option<AnswerState> {
        if !self.multiple {
            debug!("Single-choice select confirms on click, ignoring confirm");
            return None;
        }
        if self.confirm_template.is_none() {
            warn!("Select has no confirm control, ignoring confirm");
            return None;
        }
        Some(self.fire())
    }

    fn fire(&mut self) -> AnswerState {
        let state = self.state.clone();
        debug!(answer = ?state.values(), "Select confirmed");
        self.listeners.notify(&state);
        state
    }

    /// Render every option followed by the confirm control, if any.
    pub fn render(&self) -> Vec<Node> {
        let mut nodes = Vec::new();

        for option in &self.options {
            let mut fragment = self.template.instantiate(&bindings([("name", option.as_str())]));
            let selected = self.state.contains(option);
            let mut marked = 0;
            fragment.for_each_element_mut(|el| {
                if el.has_class(CLICKABLE_CLASS) {
                    el.set_attr(ANSWER_ATTR, option);
                    if selected {
                        el.set_attr(SELECTED_ATTR, "true");
                    }
                    marked += 1;
                }
            });
            if marked == 0 {
                debug!(option, "Option template has no clickable element");
            }
            nodes.extend(fragment.into_nodes());
        }

        if self.multiple {
            match &self.confirm_template {
                Some(template) => {
                    let mut fragment = template.document();
                    fragment.for_each_element_mut(|el| {
                        if el.has_class(CLICKABLE_CLASS) {
                            el.set_attr(ACTION_ATTR, "confirm");
                        }
                    });
                    nodes.extend(fragment.into_nodes());
                }
                None => {
                    error!("Failed to add confirm button because the template could not be found")
                }
            }
        }

        nodes
    }
}

/// Free text input.
#[derive(Debug)]
pub struct TextFormat {
    template: Template,
    state: AnswerState,
    listeners: Listeners<AnswerState>,
}

impl TextFormat {
    /// Create a text format.
    pub fn new(template: Template) -> Self {
        Self {
            template,
            state: AnswerState::new(),
            listeners: Listeners::new(),
        }
    }

    /// The entered text, as a single value.
    pub fn state(&self) -> &AnswerState {
        &self.state
    }

    /// Register a confirmation listener.
    pub fn add_listener(&mut self, listener: impl FnMut(&AnswerState) + 'static) {
        self.listeners.add(listener);
    }

    /// Record the current text without confirming.
    pub fn input(&mut self, text: &str) {
        self.state.set_single(text);
    }

    /// Confirm whatever has been entered. Nothing happens before any input.
    pub fn confirm(&mut self) -> Option<AnswerState> {
        if self.state.is_empty() {
            debug!("Text input has no value yet, ignoring confirm");
            return None;
        }
        Some(self.fire())
    }

    /// Set the text and confirm it.
    pub fn submit(&mut self, text: &str) -> AnswerState {
        self.state.set_single(text);
        self.fire()
    }

    fn fire(&mut self) -> AnswerState {
        let state = self.state.clone();
        debug!(answer = ?state.values(), "Text confirmed");
        self.listeners.notify(&state);
        state
    }

    /// Render the input, pre-filled with the current text.
    pub fn render(&self) -> Vec<Node> {
        let value = self.state.values().first().map(String::as_str).unwrap_or("");
        let mut fragment = self
            .template
            .instantiate(&bindings([("value", dom::escape_attr(value))]));
        fragment.for_each_element_mut(mark_submit);
        fragment.into_nodes()
    }
}

fn mark_submit(el: &mut Element) {
    if matches!(el.name(), "input" | "textarea") {
        el.set_attr(ACTION_ATTR, "submit");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::dom;

    use super::*;

    const OPTION_HTML: &str = r#"<li><button class="btn clickable">{name}</button></li>"#;
    const CONFIRM_HTML: &str = r#"<button class="clickable">Confirm</button>"#;

    fn select(multiple: bool, confirm: bool) -> SelectFormat {
        SelectFormat::new(
            Template::new("option", OPTION_HTML),
            multiple,
            vec!["A".to_string(), "B".to_string()],
            confirm.then(|| Template::new("confirm", CONFIRM_HTML)),
        )
    }

    fn recorder(format: &mut AnswerFormat) -> Rc<RefCell<Vec<Vec<String>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        format.add_listener(move |state| sink.borrow_mut().push(state.values().to_vec()));
        log
    }

    #[test]
    fn single_select_confirms_on_click() {
        let mut format = AnswerFormat::Select(select(false, false));
        let log = recorder(&mut format);

        let confirmed = format.interact(&Interaction::Click("A".to_string()));

        assert_eq!(confirmed, Some(AnswerState::single("A")));
        assert_eq!(format.state().values(), ["A".to_string()]);
        assert_eq!(*log.borrow(), vec![vec!["A".to_string()]]);
    }

    #[test]
    fn multi_select_toggles_until_confirmed() {
        let mut format = AnswerFormat::Select(select(true, true));
        let log = recorder(&mut format);

        for option in ["A", "B", "A"] {
            assert_eq!(format.interact(&Interaction::Click(option.to_string())), None);
        }
        assert_eq!(format.state().values(), ["B".to_string()]);
        assert!(log.borrow().is_empty());

        format.interact(&Interaction::Confirm);
        assert_eq!(*log.borrow(), vec![vec!["B".to_string()]]);
    }

    #[test]
    fn multi_select_without_confirm_template_never_confirms() {
        let mut format = AnswerFormat::Select(select(true, false));
        let log = recorder(&mut format);

        format.interact(&Interaction::Click("A".to_string()));
        assert_eq!(format.interact(&Interaction::Confirm), None);
        assert!(log.borrow().is_empty());
        assert_eq!(format.state().values(), ["A".to_string()]);

        let html = dom::to_html(&format.render());
        assert!(!html.contains("Confirm"));
    }

    #[test]
    fn rendered_answer_with_markup_characters_can_be_clicked() {
        let option = r#"Salt & "pepper""#;
        let mut format = AnswerFormat::Select(SelectFormat::new(
            Template::new("option", OPTION_HTML),
            false,
            vec![option.to_string()],
            None,
        ));

        let doc = dom::Document::from_nodes(format.render());
        let answer = doc.elements_by_class(CLICKABLE_CLASS)[0]
            .attr(ANSWER_ATTR)
            .unwrap()
            .to_string();
        assert_eq!(answer, option);

        let confirmed = format.interact(&Interaction::Click(answer));
        assert_eq!(confirmed, Some(AnswerState::single(option)));
    }

    #[test]
    fn unknown_option_is_ignored() {
        let mut format = AnswerFormat::Select(select(false, false));
        assert_eq!(format.interact(&Interaction::Click("Z".to_string())), None);
        assert!(format.state().is_empty());
    }

    #[test]
    fn select_renders_options_then_confirm() {
        let mut format = select(true, true);
        format.click("B");

        let html = dom::to_html(&format.render());
        assert_eq!(
            html,
            concat!(
                r#"<li><button class="btn clickable" data-answer="A">A</button></li>"#,
                r#"<li><button class="btn clickable" data-answer="B" data-selected="true">B</button></li>"#,
                r#"<button class="clickable" data-action="confirm">Confirm</button>"#,
            )
        );
    }

    #[test]
    fn renders_are_independent() {
        let format = select(false, false);
        let mut first = format.render();
        let second = format.render();

        first.clear();
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn text_submit_confirms_with_entered_text() {
        let mut format = AnswerFormat::Text(TextFormat::new(Template::new(
            "text_input",
            r#"<input type="text" value="{value}">"#,
        )));
        let log = recorder(&mut format);

        assert_eq!(format.interact(&Interaction::Confirm), None);
        format.interact(&Interaction::Input("draft".to_string()));
        assert_eq!(
            dom::to_html(&format.render()),
            r#"<input type="text" value="draft" data-action="submit">"#
        );

        let confirmed = format.interact(&Interaction::Submit("  hello ".to_string()));
        assert_eq!(confirmed, Some(AnswerState::single("  hello ")));
        assert_eq!(*log.borrow(), vec![vec!["  hello ".to_string()]]);
    }

    #[test]
    fn click_does_not_apply_to_text() {
        let mut format = AnswerFormat::Text(TextFormat::new(Template::new("t", "<input>")));
        assert_eq!(format.interact(&Interaction::Click("A".to_string())), None);
        assert!(format.state().is_empty());
    }
}
