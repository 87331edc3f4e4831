// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use nl2sql_assistant::retrieval::{CHUNK_SIZE, KeywordRetriever, Retriever};

#[test]
fn test_from_dir_loads_supported_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("items.csv"),
        "item,bin\nrice,A1\nsugar,B2\n"
    )
    .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "one\n\ntwo\n").unwrap();
    std::fs::write(dir.path().join("guide.md"), "# Receiving\nCheck every GRN.\n").unwrap();
    std::fs::write(dir.path().join("manual.pdf"), b"%PDF-1.4").unwrap();

    let retriever = KeywordRetriever::from_dir(dir.path()).unwrap();
    assert_eq!(retriever.len(), 5);
}

#[test]
fn test_from_dir_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(KeywordRetriever::from_dir(&dir.path().join("absent")).is_err());
}

#[test]
fn test_from_dir_skips_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.txt"), [0xff, 0xfe, 0x00]).unwrap();
    std::fs::write(dir.path().join("good.txt"), "GRN means goods receipt note.").unwrap();
    let retriever = KeywordRetriever::from_dir(dir.path()).unwrap();
    assert_eq!(retriever.len(), 1);
}

#[tokio::test]
async fn test_csv_rows_carry_source_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.csv");
    std::fs::write(&path, "item,bin\nrice,A1\nsugar,B2\n").unwrap();

    let retriever = KeywordRetriever::from_dir(dir.path()).unwrap();
    let docs = retriever.retrieve_top_k("where is sugar", 3).await.unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].text, "item: sugar\nbin: B2");
    let metadata = docs[0].metadata.as_ref().unwrap();
    assert_eq!(metadata["row"], 1);
    assert_eq!(metadata["source"], path.display().to_string());
}

#[tokio::test]
async fn test_long_text_is_chunked() {
    let dir = tempfile::tempdir().unwrap();
    let body = "pallet ".repeat(CHUNK_SIZE / 7 * 3);
    std::fs::write(dir.path().join("long.txt"), body.trim_end()).unwrap();

    let retriever = KeywordRetriever::from_dir(dir.path()).unwrap();
    assert!(retriever.len() > 1);
    let docs = retriever.retrieve_top_k("pallet", 3).await.unwrap();
    assert!(docs.iter().all(|d| d.text.chars().count() <= CHUNK_SIZE));
}
