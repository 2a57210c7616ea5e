mod common;

use common::{flow_with, read, write_section, MockGenerator, MockResolver};
use modutex::services::master_sync::{
    DEFAULT_MASTER_TEMPLATE, GENERATED_MARKER, PLACEHOLDER_COMMENT,
};
use modutex::AppError;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

fn directives(document: &str) -> Vec<String> {
    document
        .lines()
        .filter(|l| l.trim_start().starts_with("\\input{sections/"))
        .map(str::to_string)
        .collect()
}

fn flow(tmp: &TempDir) -> modutex::DocumentFlow<MockGenerator, MockResolver> {
    flow_with(tmp, MockGenerator::replying("x"), MockResolver::not_found())
}

#[tokio::test]
async fn missing_master_is_created_with_ordered_includes() {
    let tmp = TempDir::new().unwrap();
    for name in ["results", "introduction", "unknown_x", "abstract"] {
        write_section(&tmp, name, "body");
    }

    let report = assert_ok!(flow(&tmp).sync_master().await);

    assert!(report.created);
    let order: Vec<&str> = report.included.iter().map(|n| n.as_str()).collect();
    assert_eq!(order, vec!["abstract", "introduction", "results", "unknown_x"]);

    let main = read(&tmp, "main.tex");
    assert_eq!(
        directives(&main),
        vec![
            "\\input{sections/abstract}",
            "\\input{sections/introduction}",
            "\\input{sections/results}",
            "\\input{sections/unknown_x}",
        ]
    );
    assert!(!main.contains(PLACEHOLDER_COMMENT));
    assert_eq!(main.matches(GENERATED_MARKER).count(), 1);
}

#[tokio::test]
async fn second_sync_is_byte_identical() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("main.tex"),
        "\\begin{document}\n\\maketitle\nKept paragraph.\n\\input{sections/gone}\n\n\
         \\bibliographystyle{plain}\n\\bibliography{refs}\n\\end{document}\n",
    )
    .unwrap();
    write_section(&tmp, "conclusion", "c");
    write_section(&tmp, "Discussion", "d");

    let flow = flow(&tmp);
    assert_ok!(flow.sync_master().await);
    let first = read(&tmp, "main.tex");
    let report = assert_ok!(flow.sync_master().await);
    let second = read(&tmp, "main.tex");

    assert_eq!(first, second);
    assert!(!report.changed);
    assert!(first.contains("Kept paragraph."));
    assert_eq!(
        directives(&first),
        vec!["\\input{sections/Discussion}", "\\input{sections/conclusion}"]
    );
}

#[tokio::test]
async fn malformed_master_is_left_untouched() {
    let tmp = TempDir::new().unwrap();
    let original = "\\begin{document}\n\\maketitle\n\\input{sections/a}\n\\end{document}\n";
    std::fs::write(tmp.path().join("main.tex"), original).unwrap();
    write_section(&tmp, "abstract", "a");

    let err = assert_err!(flow(&tmp).sync_master().await);

    assert!(matches!(err, AppError::MalformedDocument(_)));
    assert_eq!(read(&tmp, "main.tex"), original);
}

#[tokio::test]
async fn empty_store_removes_previous_includes() {
    let tmp = TempDir::new().unwrap();
    write_section(&tmp, "abstract", "a");
    let flow = flow(&tmp);
    assert_ok!(flow.sync_master().await);
    assert_eq!(directives(&read(&tmp, "main.tex")).len(), 1);

    std::fs::remove_file(tmp.path().join("sections/abstract.tex")).unwrap();
    let report = assert_ok!(flow.sync_master().await);

    assert!(report.included.is_empty());
    assert!(directives(&read(&tmp, "main.tex")).is_empty());
}

#[tokio::test]
async fn absent_store_and_master_still_succeeds() {
    let tmp = TempDir::new().unwrap();

    let report = assert_ok!(flow(&tmp).sync_master().await);

    assert!(report.created);
    assert!(report.included.is_empty());
    let main = read(&tmp, "main.tex");
    assert!(main.starts_with("\\documentclass"));
    assert_ne!(main, DEFAULT_MASTER_TEMPLATE);
}

#[tokio::test]
async fn sync_picks_up_generated_sections() {
    let tmp = TempDir::new().unwrap();
    let flow = flow_with(
        &tmp,
        MockGenerator::replying("generated"),
        MockResolver::not_found(),
    );

    assert_ok!(flow.generate("methodology", "approach").await);
    assert_ok!(flow.generate("abstract", "summary").await);
    assert_ok!(flow.sync_master().await);

    assert_eq!(
        directives(&read(&tmp, "main.tex")),
        vec!["\\input{sections/abstract}", "\\input{sections/methodology}"]
    );
}
