//! Integration tests for branching-form

use branching_form::dom::Node;
use branching_form::{
    AnswerState, DisplayRegion, FormConfig, FormController, FormError, Interaction, MemoryLoader,
    PageRegion, QuestionId,
};

const QUESTION_HTML: &str =
    r#"<section class="question"><h2>{title}</h2><p>{content}</p><div id="options"></div></section>"#;
const OPTION_HTML: &str = r#"<button class="clickable">{name}</button>"#;
const CONFIRM_HTML: &str = r#"<button class="clickable">OK</button>"#;
const TEXT_INPUT_HTML: &str = r#"<input type="text" value="{value}">"#;
const DEFINITION_HTML: &str = r#"<a href="{link}" title="{definition}" rel="tooltip">{text}</a>"#;

const TERMINOLOGY: &str = r#"{
    "weed": { "definition": "Unwanted plant" },
    "herbicide": { "definition": "Kills weeds", "link": "https://example.org/herbicide" }
}"#;

fn loader(structure: &str) -> MemoryLoader {
    MemoryLoader::new()
        .with_resource("templates/question.html", QUESTION_HTML)
        .with_resource("templates/option.html", OPTION_HTML)
        .with_resource("templates/confirm.html", CONFIRM_HTML)
        .with_resource("templates/text_input.html", TEXT_INPUT_HTML)
        .with_resource("templates/definition.html", DEFINITION_HTML)
        .with_resource("config/structure.json", structure)
        .with_resource("config/terminology.json", TERMINOLOGY)
}

/// Counts what the controller asks the display to do.
#[derive(Debug, Default)]
struct CountingRegion {
    attaches: usize,
    detaches: usize,
    failed: bool,
    last: String,
}

impl DisplayRegion for CountingRegion {
    fn attach(&mut self, nodes: Vec<Node>) {
        self.attaches += 1;
        self.last = branching_form::dom::to_html(&nodes);
    }

    fn detach(&mut self) {
        self.detaches += 1;
    }

    fn loading_failed(&mut self, _error: &FormError) {
        self.failed = true;
    }
}

async fn started(structure: &str) -> FormController<CountingRegion> {
    let mut form = FormController::new(FormConfig::new(), CountingRegion::default());
    form.load(&loader(structure)).await.unwrap();
    form.start().unwrap();
    form
}

#[tokio::test]
async fn test_text_answer_without_mapping_stays() {
    let mut form = started(
        r#"{ "start": "0", "questions": {
            "0": { "title": "T", "format": { "type": "text" }, "next": {} }
        } }"#,
    )
    .await;
    assert_eq!(form.current_id(), Some(&QuestionId::new("0")));

    let transitions = form.dispatch(Interaction::Submit("hello".into())).unwrap();

    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].answer, AnswerState::single("hello"));
    assert_eq!(transitions[0].to, None);
    assert_eq!(form.current_id(), Some(&QuestionId::new("0")));
    assert_eq!(form.region().attaches, 1);
}

#[tokio::test]
async fn test_single_select_advances_exactly_once() {
    let mut form = started(
        r#"{ "start": "0", "questions": {
            "0": { "title": "First", "format": { "type": "select", "options": ["A", "B"] },
                   "next": { "A": "1" } },
            "1": { "title": "Second", "format": { "type": "text" }, "next": {} }
        } }"#,
    )
    .await;

    form.dispatch(Interaction::Click("A".into())).unwrap();

    assert_eq!(form.current_id(), Some(&QuestionId::new("1")));
    assert_eq!(form.region().attaches, 2);
    assert_eq!(form.region().detaches, 1);
    assert!(form.region().last.contains("<h2>Second</h2>"));
    assert_eq!(
        form.graph().unwrap().get(&QuestionId::new("0")).unwrap().state(),
        &AnswerState::single("A")
    );
}

#[tokio::test]
async fn test_multi_select_toggles_until_confirmed() {
    let mut form = started(
        r#"{ "start": "0", "questions": {
            "0": { "title": "Pick", "format": { "type": "select", "multiple": true, "options": ["A", "B"] },
                   "next": { "B": "1", "A,B": "2" } },
            "1": { "title": "Only B", "format": { "type": "text" }, "next": {} },
            "2": { "title": "Both", "format": { "type": "text" }, "next": {} }
        } }"#,
    )
    .await;

    for option in ["A", "B", "A"] {
        let transitions = form.dispatch(Interaction::Click(option.into())).unwrap();
        assert!(transitions.is_empty());
    }
    assert_eq!(form.current().unwrap().state().values(), ["B".to_string()]);
    assert_eq!(form.current_id(), Some(&QuestionId::new("0")));

    form.dispatch(Interaction::Confirm).unwrap();

    assert_eq!(form.current_id(), Some(&QuestionId::new("1")));
}

#[tokio::test]
async fn test_multi_select_joins_selected_options() {
    let mut form = started(
        r#"{ "start": "0", "questions": {
            "0": { "title": "Pick", "format": { "type": "select", "multiple": true, "options": ["A", "B"] },
                   "next": { "B": "1", "A,B": "2" } },
            "1": { "title": "Only B", "format": { "type": "text" }, "next": {} },
            "2": { "title": "Both", "format": { "type": "text" }, "next": {} }
        } }"#,
    )
    .await;

    form.dispatch(Interaction::Click("B".into())).unwrap();
    form.dispatch(Interaction::Click("A".into())).unwrap();
    form.dispatch(Interaction::Confirm).unwrap();

    assert_eq!(form.current_id(), Some(&QuestionId::new("2")));
}

#[tokio::test]
async fn test_unknown_format_is_dropped() {
    let mut form = FormController::new(FormConfig::new(), CountingRegion::default());
    let structure = r#"{ "start": "0", "questions": {
        "0": { "title": "T", "format": { "type": "select", "options": ["A"] }, "next": { "A": "1" } },
        "1": { "title": "Slide", "format": { "type": "slider" }, "next": {} }
    } }"#;

    let dropped: Vec<String> = form
        .load(&loader(structure))
        .await
        .unwrap()
        .iter()
        .map(|e| e.id.to_string())
        .collect();

    assert_eq!(dropped, ["1"]);
    let graph = form.graph().unwrap();
    assert_eq!(graph.len(), 1);
    assert!(!graph.contains(&QuestionId::new("1")));

    form.start().unwrap();
    form.dispatch(Interaction::Click("A".into())).unwrap();
    assert_eq!(form.current_id(), Some(&QuestionId::new("0")));
}

#[tokio::test]
async fn test_load_failure_leaves_form_inert() {
    let mut loader = loader(r#"{ "start": "0", "questions": {} }"#);
    loader.remove("config/terminology.json");
    let mut form = FormController::new(FormConfig::new(), CountingRegion::default());

    let err = form.load(&loader).await.unwrap_err();

    assert!(err.is_fatal());
    assert!(form.region().failed);
    assert!(form.has_failed());
    assert!(matches!(form.start(), Err(FormError::NotInitialized)));
    assert_eq!(form.region().attaches, 0);
}

#[tokio::test]
async fn test_page_region_end_to_end() {
    let config = FormConfig::new();
    let page = PageRegion::from_markup(
        r#"<body><div id="loading">Loading...</div><main id="questions"></main></body>"#,
        &config,
    );
    let mut form = FormController::new(config, page);
    form.load(&loader(
        r#"{ "start": "0", "questions": {
            "0": { "title": "Garden", "description": "Is it a [weed] or did you use [herbicide]?",
                   "format": { "type": "select", "options": ["Weed", "Flower"] },
                   "next": { "Weed": "1" } },
            "1": { "title": "Name it", "format": { "type": "text" }, "next": {} }
        } }"#,
    ))
    .await
    .unwrap();
    form.start().unwrap();

    assert_eq!(
        form.region().html(),
        concat!(
            r#"<body><div id="loading"></div><main id="questions">"#,
            r#"<section class="question"><h2>Garden</h2><p>Is it a "#,
            r##"<a href="#" title="Unwanted plant" rel="tooltip">weed</a> or did you use "##,
            r#"<a href="https://example.org/herbicide" title="Kills weeds" rel="tooltip">herbicide</a>?</p>"#,
            r#"<div id="options"><button class="clickable" data-answer="Weed">Weed</button>"#,
            r#"<button class="clickable" data-answer="Flower">Flower</button></div></section>"#,
            r#"</main></body>"#,
        )
    );

    form.dispatch(Interaction::Click("Weed".into())).unwrap();

    assert_eq!(
        form.region().html(),
        concat!(
            r#"<body><div id="loading"></div><main id="questions">"#,
            r#"<section class="question"><h2>Name it</h2><p></p>"#,
            r#"<div id="options"><input type="text" value="" data-action="submit"></div></section>"#,
            r#"</main></body>"#,
        )
    );
}

#[tokio::test]
async fn test_missing_start_is_reported() {
    let mut form = FormController::new(FormConfig::new(), CountingRegion::default());
    form.load(&loader(r#"{ "start": "nope", "questions": {} }"#))
        .await
        .unwrap();

    let err = form.start().unwrap_err();

    assert!(matches!(err, FormError::StartNotFound(_)));
    assert_eq!(form.current_id(), None);
    assert!(form.dispatch(Interaction::Confirm).unwrap().is_empty());
}
