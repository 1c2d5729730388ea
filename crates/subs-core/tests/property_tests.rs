//! Property-based tests for subs-core
//!
//! Covers the form invariants: write ordering, the generation gate,
//! progress monotonicity, session round-trips and composition.

use proptest::prelude::*;
use subs_core::session::SessionDocument;
use subs_core::{
    compose, validate, FieldName, FormState, FormStore, MemoryStore, Platform, Position,
    PromptTarget, SessionConfig, SessionManager,
};

// ============================================================
// Strategies
// ============================================================

/// Text with at least one non-whitespace character
fn filled_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9<>&\"'][\\PC]{0,80}"
}

fn blank_text() -> impl Strategy<Value = String> {
    "[ \t\n]{0,10}"
}

fn any_text() -> impl Strategy<Value = String> {
    prop_oneof![filled_text(), blank_text(), "\\PC{0,120}"]
}

fn platform() -> impl Strategy<Value = Platform> {
    prop_oneof![
        Just(Platform::Claude),
        Just(Platform::Gemini),
        Just(Platform::Both)
    ]
}

fn position() -> impl Strategy<Value = Position> {
    prop_oneof![Just(Position::Applicant), Just(Position::Respondent)]
}

fn text_field() -> impl Strategy<Value = FieldName> {
    (0..FieldName::TEXT.len()).prop_map(|i| FieldName::TEXT[i])
}

fn form_state() -> impl Strategy<Value = FormState> {
    (
        platform(),
        position(),
        any_text(),
        any_text(),
        any_text(),
        any_text(),
        any_text(),
        any_text(),
        any_text(),
        any_text(),
        any::<bool>(),
    )
        .prop_map(
            |(
                platform,
                position,
                chronology,
                arguments,
                template_text,
                instructions,
                opposing_submissions,
                plaintiff_pleadings,
                defendant_pleadings,
                summons_application,
                include_checklist,
            )| FormState {
                platform,
                position,
                chronology,
                arguments,
                template_text,
                instructions,
                opposing_submissions,
                plaintiff_pleadings,
                defendant_pleadings,
                summons_application,
                include_checklist,
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ============================================================
    // Field writes
    // ============================================================

    #[test]
    fn last_write_to_a_field_wins(
        writes in prop::collection::vec((text_field(), any_text()), 1..20)
    ) {
        let mut store = FormStore::default();
        for (field, value) in &writes {
            store.set(*field, value).unwrap();
        }
        for field in FieldName::TEXT {
            let expected = writes
                .iter()
                .rev()
                .find(|(f, _)| *f == field)
                .map(|(_, v)| v.as_str())
                .unwrap_or("");
            prop_assert_eq!(store.state().text(field), Some(expected));
            prop_assert_eq!(store.char_count(field), expected.chars().count());
        }
    }

    // ============================================================
    // Validation
    // ============================================================

    #[test]
    fn filled_required_fields_clear_all_warnings(
        mut state in form_state(),
        chronology in filled_text(),
        arguments in filled_text(),
        template_text in filled_text(),
    ) {
        state.chronology = chronology;
        state.arguments = arguments;
        state.template_text = template_text;
        let result = validate(&state);
        prop_assert!(result.warnings.is_empty());
        prop_assert!(result.can_generate());
        prop_assert!(result.completion_percent >= 75);
    }

    #[test]
    fn blank_required_field_is_named_in_warnings(
        mut state in form_state(),
        which in 0..FieldName::REQUIRED.len(),
        blank in blank_text(),
    ) {
        let field = FieldName::REQUIRED[which];
        state.set(field, &blank).unwrap();
        let result = validate(&state);
        prop_assert!(result.has_warning_for(field));
        prop_assert!(!result.can_generate());
    }

    #[test]
    fn filling_a_field_never_lowers_progress(
        state in form_state(),
        field in text_field(),
        value in filled_text(),
    ) {
        let before = validate(&state).completion_percent;
        let mut after_state = state.clone();
        after_state.set(field, &value).unwrap();
        let after = validate(&after_state).completion_percent;
        prop_assert!(after >= before);
        prop_assert!(after <= 100);
    }

    #[test]
    fn validation_is_idempotent(state in form_state()) {
        prop_assert_eq!(validate(&state), validate(&state));
    }

    // ============================================================
    // Sessions
    // ============================================================

    #[test]
    fn session_round_trip_reproduces_every_field(state in form_state()) {
        let doc = SessionDocument::capture(&state, "Submissions Synthesizer", chrono::Utc::now());
        let parsed = SessionDocument::parse(&doc.to_json().unwrap()).unwrap();
        prop_assert_eq!(parsed.to_state(), state.clone());

        let mut sessions = SessionManager::new(MemoryStore::new(), SessionConfig::default());
        sessions.persist(&state).unwrap();
        let mut fresh = FormStore::default();
        sessions.restore(&mut fresh).unwrap();
        prop_assert_eq!(fresh.state(), &state);
    }

    // ============================================================
    // Composition
    // ============================================================

    #[test]
    fn both_targets_carry_the_chronology_and_differ(
        mut state in form_state(),
        chronology in filled_text(),
    ) {
        state.chronology = chronology;
        let claude = compose(&state, PromptTarget::Claude);
        let gemini = compose(&state, PromptTarget::Gemini);
        prop_assert_ne!(&claude, &gemini);
        prop_assert!(claude.contains(&state.chronology));
        prop_assert!(gemini.contains(&state.chronology));
    }
}
