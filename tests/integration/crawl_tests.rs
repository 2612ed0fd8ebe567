//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use scrawler::config::{CrawlOptions, ExtractFormat};
use scrawler::crawler::run_crawl;
use scrawler::JobOutcome;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates test options crawling `seed` into `out_dir`
fn create_test_options(seed: &str, out_dir: &Path) -> CrawlOptions {
    CrawlOptions {
        start_url: seed.to_string(),
        user_agent: "TestBot/1.0".to_string(),
        timeout_secs: 5,
        max_depth: 2,
        max_pages: 50,
        out_dir: out_dir.to_path_buf(),
        ..CrawlOptions::default()
    }
}

fn html(title: &str, links: &[String]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|l| format!("<a href=\"{}\">{}</a>\n", l, l))
        .collect();
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>{}</title></head><body>\n\
             <p>This is the body text of the {} page.</p>\n{}</body></html>",
            title, title, anchors
        ),
        "text/html; charset=utf-8",
    )
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page: &str, title: &str, links: &[String]) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(title, links))
        .mount(server)
        .await;
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| {
                    let path = e.path();
                    if path.is_dir() {
                        count_files(&path)
                    } else {
                        1
                    }
                })
                .sum()
        })
        .unwrap_or(0)
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/1.0"))
        .respond_with(html(
            "Home",
            &[format!("{}/page1", base_url), "/page2".to_string()],
        ))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/page1", "Page 1", &[]).await;
    mount_page(&mock_server, "/page2", "Page 2", &["/page1".to_string()]).await;

    let options = CrawlOptions {
        save_extract: true,
        extract_format: ExtractFormat::Json,
        ..create_test_options(&format!("{}/", base_url), out.path())
    };
    let report = run_crawl(options).await.expect("Crawl failed");

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.count(JobOutcome::Saved), 3);

    let host_dir = out.path().join("127.0.0.1");
    assert!(host_dir.join("index.html").exists());
    assert!(host_dir.join("page1.html").exists());
    assert!(host_dir.join("page2.html").exists());

    let extraction: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(out.path().join("extract/127.0.0.1/index.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(extraction["title"], "Home");
    assert_eq!(extraction["links"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    mount_robots(&mock_server, "User-agent: *\nDisallow: /admin").await;
    mount_page(
        &mock_server,
        "/",
        "Home",
        &[format!("{}/allowed", base_url), format!("{}/admin", base_url)],
    )
    .await;
    mount_page(&mock_server, "/allowed", "Allowed", &[]).await;

    // Admin page must never be requested
    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(html("Admin", &[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let report = run_crawl(create_test_options(&format!("{}/", base_url), out.path()))
        .await
        .expect("Crawl failed");

    assert_eq!(report.count(JobOutcome::RobotsBlocked), 1);
    assert_eq!(report.pages_fetched, 2);
    assert!(!out.path().join("127.0.0.1/admin.html").exists());
}

#[tokio::test]
async fn test_robots_txt_missing_allows_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", "Home", &["/about".to_string()]).await;
    mount_page(&mock_server, "/about", "About", &[]).await;

    let report = run_crawl(create_test_options(&format!("{}/", base_url), out.path()))
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.count(JobOutcome::RobotsBlocked), 0);
}

#[tokio::test]
async fn test_depth_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/", "Root", &["/level1".to_string()]).await;
    mount_page(&mock_server, "/level1", "Level 1", &["/level2".to_string()]).await;

    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html("Level 2", &[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let options = CrawlOptions {
        max_depth: 1,
        ..create_test_options(&format!("{}/", base_url), out.path())
    };
    let report = run_crawl(options).await.expect("Crawl failed");

    assert_eq!(report.pages_fetched, 2);
}

#[tokio::test]
async fn test_non_html_content_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(
        &mock_server,
        "/",
        "Home",
        &["/data.json".to_string(), "/logo.png".to_string()],
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"ok": true}"#)
                .insert_header("content-type", "application/json"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x89, b'P', b'N', b'G'])
                .insert_header("content-type", "image/png"),
        )
        .mount(&mock_server)
        .await;

    let report = run_crawl(create_test_options(&format!("{}/", base_url), out.path()))
        .await
        .expect("Crawl failed");

    assert_eq!(report.count(JobOutcome::NonHtml), 2);
    assert_eq!(report.pages_fetched, 1);
    assert!(!out.path().join("127.0.0.1/data.json").exists());
    assert!(!out.path().join("127.0.0.1/logo.png").exists());
}

#[tokio::test]
async fn test_fetch_errors_are_counted_not_fatal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(
        &mock_server,
        "/",
        "Home",
        &["/gone".to_string(), "/broken".to_string(), "/fine".to_string()],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fine", "Fine", &[]).await;

    let report = run_crawl(create_test_options(&format!("{}/", base_url), out.path()))
        .await
        .expect("Crawl failed");

    assert_eq!(report.count(JobOutcome::FetchFailed), 2);
    assert_eq!(report.errors(), 2);
    assert_eq!(report.pages_fetched, 2);
}

#[tokio::test]
async fn test_rate_limit_spaces_requests() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(
        &mock_server,
        "/",
        "Home",
        &["/a".to_string(), "/b".to_string()],
    )
    .await;
    mount_page(&mock_server, "/a", "A", &[]).await;
    mount_page(&mock_server, "/b", "B", &[]).await;

    let options = CrawlOptions {
        delay: Duration::from_millis(200),
        concurrency: 4,
        ..create_test_options(&format!("{}/", base_url), out.path())
    };

    let started = Instant::now();
    let report = run_crawl(options).await.expect("Crawl failed");
    let elapsed = started.elapsed();

    // Three page requests to one host need at least two full gaps
    assert_eq!(report.pages_fetched, 3);
    assert!(
        elapsed >= Duration::from_millis(400),
        "crawl finished in {:?}",
        elapsed
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_page_budget() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    let links: Vec<String> = (0..20).map(|i| format!("/item/{}", i)).collect();
    mount_page(&mock_server, "/", "Index", &links).await;
    for i in 0..20 {
        mount_page(
            &mock_server,
            &format!("/item/{}", i),
            &format!("Item {}", i),
            &links,
        )
        .await;
    }

    let options = CrawlOptions {
        max_pages: 5,
        concurrency: 8,
        ..create_test_options(&format!("{}/", base_url), out.path())
    };
    let report = run_crawl(options).await.expect("Crawl failed");

    assert_eq!(report.pages_fetched, 5);
    assert_eq!(count_files(&out.path().join("127.0.0.1")), 5);
}

#[tokio::test]
async fn test_invalid_seed_fails_run() {
    let out = TempDir::new().unwrap();
    let result = run_crawl(create_test_options("ftp://example.com/", out.path())).await;
    assert!(matches!(
        result,
        Err(scrawler::ScrawlerError::InvalidSeedUrl { .. })
    ));
}
