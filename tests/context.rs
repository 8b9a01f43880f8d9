//! Context assembly and topic-addendum selection tests.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use persflow::{ContextLoader, ProjectLayout, TopicRuleset};

fn project() -> (TempDir, ProjectLayout) {
    let temp = TempDir::new().unwrap();
    let layout = ProjectLayout::new(temp.path());
    layout.ensure_directories().unwrap();
    (temp, layout)
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn tax_brief_selects_and_appends_the_tax_addendum() {
    // Scenario C: a registratierecht brief picks the tax category and
    // its addendum is appended after the base prompt
    let (_temp, layout) = project();
    write(&layout.source_data(), "[{\"title\": \"Notarisbarometer\"}]");
    write(
        &layout.default_user_prompt(),
        "Nieuwe regels rond registratierecht",
    );
    write(&layout.system_prompt(), "BASIS");
    write(
        &layout.special_instruction("tax_analysis"),
        "Leg fiscale termen uit.",
    );

    let loaded = ContextLoader::new(layout).unwrap().load(None).unwrap();

    assert_eq!(loaded.topic.as_deref(), Some("tax_analysis"));
    assert_eq!(
        loaded.context.system_prompt,
        "BASIS\n\nLeg fiscale termen uit."
    );
    assert_eq!(loaded.context.user_brief, "Nieuwe regels rond registratierecht");
}

#[test]
fn addenda_keep_base_then_hyperlink_then_topic_order() {
    let (_temp, layout) = project();
    write(&layout.source_data(), "[]");
    write(&layout.default_user_prompt(), "belasting op tweede verblijven");
    write(&layout.system_prompt(), "BASIS");
    write(&layout.hyperlink_instructions(), "LINKS");
    write(&layout.special_instruction("tax_analysis"), "TAX");

    let loaded = ContextLoader::new(layout).unwrap().load(None).unwrap();
    assert_eq!(loaded.context.system_prompt, "BASIS\n\nLINKS\n\nTAX");
}

#[test]
fn unmatched_brief_leaves_the_prompt_unaugmented() {
    let (_temp, layout) = project();
    write(&layout.source_data(), "[]");
    write(&layout.default_user_prompt(), "mobiliteit en openbaar vervoer");
    write(&layout.system_prompt(), "BASIS");
    write(&layout.special_instruction("tax_analysis"), "TAX");

    let loaded = ContextLoader::new(layout).unwrap().load(None).unwrap();
    assert_eq!(loaded.topic, None);
    assert_eq!(loaded.context.system_prompt, "BASIS");
}

#[test]
fn explicit_prompt_file_overrides_the_default_brief() {
    let (_temp, layout) = project();
    write(&layout.source_data(), "[]");
    write(&layout.default_user_prompt(), "default brief");
    write(&layout.system_prompt(), "BASIS");
    let alt = layout.user_prompt_dir().join("prompt_2.txt");
    write(&alt, "renovatie van rijwoningen");

    let loaded = ContextLoader::new(layout)
        .unwrap()
        .load(Some(&alt))
        .unwrap();

    assert_eq!(loaded.context.user_brief, "renovatie van rijwoningen");
    assert_eq!(loaded.topic.as_deref(), Some("construction"));
}

#[test]
fn injected_ruleset_replaces_the_built_in_rules() {
    let (_temp, layout) = project();
    write(&layout.source_data(), "[]");
    write(&layout.default_user_prompt(), "verkooprecht stijgt");
    write(&layout.system_prompt(), "BASIS");

    let ruleset = TopicRuleset::from_yaml("rules:\n  - id: custom\n    keywords: [stijgt]\n").unwrap();
    let loaded = ContextLoader::new(layout)
        .unwrap()
        .with_ruleset(ruleset)
        .load(None)
        .unwrap();

    // The built-in tax rule no longer applies
    assert_eq!(loaded.topic.as_deref(), Some("custom"));
}

#[test]
fn topic_selection_is_deterministic_across_runs() {
    // The same brief and ruleset always pick the same category
    let rules = TopicRuleset::default_rules();
    let brief = "Nieuwe regels rond registratierecht";

    let first = rules.select(brief).map(|r| r.id.clone());
    for _ in 0..20 {
        assert_eq!(rules.select(brief).map(|r| r.id.clone()), first);
    }
    assert_eq!(first.as_deref(), Some("tax_analysis"));
}
