//! End-to-end form workflows: upload, validate, generate, save and load

mod common;

use futures::executor::block_on;
use pretty_assertions::assert_eq;
use subs_core::{
    compose, compose_all, ErrorKind, FieldName, FormStore, IngestConfig, Ingestor, KeyValueStore,
    MemoryStore, PromptTarget, SessionConfig, SessionManager, SubsConfig, SubsError,
    UploadedDocument,
};

fn upload(store: &mut FormStore, ingestor: &Ingestor, name: &str, mime: &str, bytes: &[u8]) {
    let result = block_on(ingestor.ingest(UploadedDocument::from_bytes(
        name,
        mime,
        bytes.to_vec(),
    )));
    store.commit_ingest(result);
}

fn ready_form() -> FormStore {
    let mut store = FormStore::default();
    store
        .set_field("chronology", "2 Feb 2024: lease terminated")
        .unwrap();
    store
        .set_field("arguments", "Termination was invalid")
        .unwrap();
    store.set_field("templateText", "Outline of submissions").unwrap();
    store
}

#[test]
fn executable_upload_is_rejected_and_template_kept() {
    let mut store = ready_form();
    let ingestor = Ingestor::default();
    let result = block_on(ingestor.ingest(UploadedDocument::from_bytes(
        "evil.exe",
        "application/x-msdownload",
        b"MZ\x90\x00".to_vec(),
    )));
    let report = store.commit_ingest(result);

    assert!(!report.ok);
    assert_eq!(report.kind, Some(ErrorKind::UnsupportedFileType));
    assert_eq!(
        report.status,
        "Unsupported file type: evil.exe. Please upload a .txt, .pdf or .docx file."
    );
    assert_eq!(store.state().template_text, "Outline of submissions");
}

#[test]
fn zero_byte_upload_is_empty_file() {
    let result = block_on(Ingestor::default().ingest(UploadedDocument::from_bytes(
        "blank.pdf",
        "application/pdf",
        Vec::new(),
    )));
    let failure = result.unwrap_err();
    assert_eq!(failure.error, SubsError::EmptyFile("blank.pdf".to_string()));
}

#[test]
fn script_text_flows_verbatim_into_prompts() {
    let mut store = ready_form();
    upload(
        &mut store,
        &Ingestor::default(),
        "notes.txt",
        "text/plain",
        b"<script>alert(1)</script>",
    );
    assert_eq!(store.state().template_text, "<script>alert(1)</script>");
    assert_eq!(store.counter_label(FieldName::TemplateText), "25 characters");

    let prompt = compose(store.state(), PromptTarget::Claude);
    assert!(prompt.contains("<script>alert(1)</script>"));
}

#[test]
fn pdf_upload_keeps_page_order() {
    let mut store = ready_form();
    let pdf = common::pdf_with_pages(&["Page 1", "Page 2", "Page 3"]);
    let result = block_on(Ingestor::default().ingest(UploadedDocument::from_bytes(
        "affidavit.pdf",
        "application/pdf",
        pdf,
    )));
    let report = store.commit_ingest(result);

    assert!(report.ok, "{}", report.status);
    assert_eq!(report.page_count, Some(3));
    assert_eq!(
        store.state().template_text,
        "Page 1\n\n--- Page Break ---\n\nPage 2\n\n--- Page Break ---\n\nPage 3"
    );
    assert_eq!(
        report.status,
        format!(
            "Document loaded successfully: affidavit.pdf ({} characters)",
            store.char_count(FieldName::TemplateText)
        )
    );
}

#[test]
fn docx_upload_reports_macro_warning() {
    let mut store = ready_form();
    let docx = common::docx_with_paragraphs(
        &["Submissions outline", "1. Introduction"],
        &["word/vbaProject.bin"],
    );
    let result = block_on(Ingestor::default().ingest(UploadedDocument::from_bytes(
        "outline.docx",
        common::DOCX_MIME,
        docx,
    )));
    let report = store.commit_ingest(result);

    assert!(report.ok, "{}", report.status);
    assert_eq!(
        report.warnings,
        vec!["Document contains macros (not executed)".to_string()]
    );
    assert_eq!(
        store.state().template_text,
        "Submissions outline\n\n1. Introduction"
    );
}

#[test]
fn corrupt_pdf_is_processing_error() {
    let mut store = ready_form();
    let result = block_on(Ingestor::default().ingest(UploadedDocument::from_bytes(
        "broken.pdf",
        "application/pdf",
        b"%PDF-1.7\n%%EOF".to_vec(),
    )));
    let report = store.commit_ingest(result);
    assert_eq!(report.kind, Some(ErrorKind::Extraction));
    assert!(report.status.starts_with("Error processing document: "));
    assert_eq!(store.state().template_text, "Outline of submissions");
}

#[test]
fn configured_size_limit_is_enforced() {
    let config = SubsConfig::from_json(r#"{"ingest": {"max_file_size_bytes": 8}}"#).unwrap();
    let ingestor = Ingestor::new(config.ingest);
    let failure = block_on(ingestor.ingest(UploadedDocument::from_bytes(
        "long.txt",
        "text/plain",
        b"more than eight bytes".to_vec(),
    )))
    .unwrap_err();
    assert_eq!(failure.error.kind(), ErrorKind::FileTooLarge);
    assert_eq!(
        failure.error.status_message(),
        "File too large (21 B). Maximum size is 8 B."
    );

    let default_limit = IngestConfig::default().max_file_size_bytes;
    assert_eq!(default_limit, 25 * 1024 * 1024);
}

#[test]
fn generation_follows_platform_choice() {
    let mut store = ready_form();
    assert!(store.validation().can_generate());

    store.set_field("platform", "both").unwrap();
    let prompts = compose_all(store.state());
    assert_eq!(prompts.len(), 2);
    assert_ne!(prompts[0].text, prompts[1].text);
    for prompt in &prompts {
        assert!(prompt.text.contains("2 Feb 2024: lease terminated"));
    }
}

#[test]
fn session_without_platform_is_rejected_wholesale() {
    let mut kv = MemoryStore::new();
    kv.set_item(
        "legalPromptGenerator_session",
        r#"{"version":"1.0","position":"respondent","chronology":"other","arguments":"other"}"#,
    )
    .unwrap();
    let sessions = SessionManager::new(kv, SessionConfig::default());

    let mut store = ready_form();
    let before = store.state().clone();
    let err = sessions.restore(&mut store).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidSession);
    assert!(err.status_message().starts_with("Invalid session file: "));
    assert_eq!(store.state(), &before);
}

#[test]
fn save_clear_and_reload() {
    let mut sessions = SessionManager::new(MemoryStore::new(), SessionConfig::default());
    let mut store = ready_form();
    store.set_field("position", "respondent").unwrap();
    store.set_field("includeChecklist", "false").unwrap();
    sessions.persist(store.state()).unwrap();

    let saved = store.state().clone();
    store.reset();
    assert!(!store.validation().can_generate());

    sessions.restore(&mut store).unwrap();
    assert_eq!(store.state(), &saved);

    sessions.clear().unwrap();
    assert_eq!(
        sessions.load().unwrap_err().status_message(),
        "No saved session found"
    );
}
