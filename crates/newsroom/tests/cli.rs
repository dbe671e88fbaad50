// ABOUTME: Tests for the newsroom binary: discover and extract subcommands over saved pages.
// ABOUTME: Uses assert_cmd to run the binary and tempfile for fixture pages and output files.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

const LISTING: &str = r#"<html><body>
<div class="news"><ul>
  <li><a href="/news/acme-opens-ohio-plant">Acme opens Ohio plant</a></li>
  <li><a href="/news/acme-reports-first-quarter-results">Acme reports first quarter results</a></li>
  <li><a href="/news/acme-names-new-cfo">Acme names new CFO</a></li>
  <li><a href="/news/acme-launches-solar-line">Acme launches solar line</a></li>
  <li><a href="/news/acme-completes-merger">Acme completes merger</a></li>
</ul></div>
</body></html>"#;

const ARTICLE: &str = r#"<html><head>
<meta property="article:published_time" content="2024-04-02T09:00:00Z">
</head><body><article>
<h1>Acme Opens Ohio Plant</h1>
<p>Acme today opened its new plant in Ohio.</p>
<h3>About Acme</h3>
<p>Acme makes widgets.</p>
</article></body></html>"#;

/// Write `html` into a fresh temp dir. The dir must outlive the returned path.
fn fixture(html: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("page.html");
    fs::write(&path, html).unwrap();
    (dir, path)
}

fn newsroom() -> Command {
    Command::cargo_bin("newsroom").unwrap()
}

#[test]
fn discover_prints_groups_as_json() {
    let (_dir, page) = fixture(LISTING);
    newsroom()
        .args(["discover", "--url", "https://acme.com/news", "--html"])
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""mode": "no-selector""#))
        .stdout(predicate::str::contains("https://acme.com/news/acme-completes-merger"));
}

#[test]
fn extract_prints_text_body() {
    let (_dir, page) = fixture(ARTICLE);
    newsroom()
        .args(["extract", "--url", "https://acme.com/news/ohio", "-f", "text", "--html"])
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme today opened its new plant in Ohio."))
        .stdout(predicate::str::contains("Acme makes widgets.").not());
}

#[test]
fn extract_json_writes_to_output_file() {
    let (_dir, page) = fixture(ARTICLE);
    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("article.json");
    newsroom()
        .args(["extract", "--url", "https://acme.com/news/ohio", "--json", "--html"])
        .arg(&page)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["title"], "Acme Opens Ohio Plant");
    assert_eq!(written["date_published"], "2024-04-02T09:00:00Z");
    assert_eq!(written["url"], "https://acme.com/news/ohio");
}

#[test]
fn invalid_url_exits_with_error() {
    let (_dir, page) = fixture(ARTICLE);
    newsroom()
        .args(["extract", "--url", "not a url", "--html"])
        .arg(&page)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid URL"));
}

#[test]
fn missing_file_exits_with_error() {
    newsroom()
        .args(["discover", "--url", "https://acme.com/news", "--html", "/nonexistent/listing.html"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error reading file"));
}
