use crate::archiver::test_helpers::{record_from_json, test_archiver};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 2023-11-15 07:13:20 JST
const RELEASE_MS: i64 = 1700000000000;
const FILE_TS: &str = "2023-11-15_071320";

async fn mount_media(server: &MockServer, media_path: &str, bytes: &[u8], expect: u64) {
    Mock::given(method("GET"))
        .and(path(media_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .expect(expect)
        .mount(server)
        .await;
}

#[tokio::test]
async fn media_numbering_is_body_order_then_header_order() {
    let server = MockServer::start().await;
    let (archiver, _temp_dir) = test_archiver(&server);

    mount_media(&server, "/media/b1.png", b"b1", 1).await;
    mount_media(&server, "/media/b2.webp", b"b2", 1).await;
    mount_media(&server, "/media/b3.png", b"b3", 1).await;
    mount_media(&server, "/uploads/h.gif", b"h", 1).await;

    // Two body fields with 1 and 2 images, plus one header image field:
    // the fourth file must be the header image
    let record = record_from_json(serde_json::json!({
        "sendingOfficialUserId": "a4npPurePgMCD5wEmekQO",
        "releaseDate": RELEASE_MS,
        "title": "Hello/World",
        "body": format!("<p><img src=\"{}/media/b1.png\">one</p>", server.uri()),
        "body2": format!(
            "<p><img src=\"{0}/media/b2.webp\"><img src=\"{0}/media/b3.png\">two</p>",
            server.uri()
        ),
        "image": "uploads/h.gif",
    }));

    archiver.export(vec![record]).await.unwrap();

    let sender_dir = archiver.config.export_dir.join("東山恵里沙");
    let post_dir = sender_dir.join(format!("{}_Hello_World", FILE_TS));
    let gallery_dir = sender_dir.join("pictures");

    let expected = [
        format!("{}_01.png", FILE_TS),
        format!("{}_02.webp", FILE_TS),
        format!("{}_03.png", FILE_TS),
        format!("{}_04.gif", FILE_TS),
    ];
    for name in &expected {
        assert!(post_dir.join(name).exists(), "missing {} in post dir", name);
        assert!(
            gallery_dir.join(name).exists(),
            "missing {} in gallery",
            name
        );
    }

    // The fourth file carries the header image's bytes
    let fourth = tokio::fs::read(post_dir.join(&expected[3])).await.unwrap();
    assert_eq!(fourth, b"h");

    let document = tokio::fs::read_to_string(post_dir.join("index.md"))
        .await
        .unwrap();
    assert!(document.starts_with("# Hello/World\n"));
    assert!(document.contains("**Sender**: 東山恵里沙"));
    let image_lines: Vec<&str> = document
        .lines()
        .filter(|l| l.starts_with("![image]("))
        .collect();
    let expected_lines: Vec<String> = expected.iter().map(|n| format!("![image]({})", n)).collect();
    assert_eq!(image_lines, expected_lines);

    // No stray files anywhere in the tree: 4 media files in each location
    // plus the document
    let files = walkdir::WalkDir::new(&sender_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count();
    assert_eq!(files, 9);
}

#[tokio::test]
async fn re_running_export_is_idempotent_and_downloads_nothing() {
    let server = MockServer::start().await;
    let (archiver, _temp_dir) = test_archiver(&server);

    // expect(1): the second run must not re-download (verified on drop)
    mount_media(&server, "/uploads/only.jpg", b"bytes", 1).await;

    let json = serde_json::json!({
        "sendingOfficialUserId": "a4npPurePgMCD5wEmekQO",
        "releaseDate": RELEASE_MS,
        "title": "Same post",
        "body": "<p>unchanged</p>",
        "image": "uploads/only.jpg",
    });

    archiver.export(vec![record_from_json(json.clone())]).await.unwrap();

    let post_dir = archiver
        .config
        .export_dir
        .join("東山恵里沙")
        .join(format!("{}_Same post", FILE_TS));
    let first = tokio::fs::read(post_dir.join("index.md")).await.unwrap();

    archiver.export(vec![record_from_json(json)]).await.unwrap();
    let second = tokio::fs::read(post_dir.join("index.md")).await.unwrap();

    assert_eq!(first, second, "re-run must produce a byte-identical document");
}

#[tokio::test]
async fn record_without_sender_is_skipped_silently() {
    let server = MockServer::start().await;
    let (archiver, _temp_dir) = test_archiver(&server);

    let record = record_from_json(serde_json::json!({
        "releaseDate": RELEASE_MS,
        "title": "nobody's post",
        "body": "<p>text</p>",
    }));

    archiver.export(vec![record]).await.unwrap();

    // Export root exists but contains no sender directory
    let mut entries = tokio::fs::read_dir(&archiver.config.export_dir).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none());
}

#[tokio::test]
async fn failed_download_is_skipped_but_still_referenced() {
    let server = MockServer::start().await;
    let (archiver, _temp_dir) = test_archiver(&server);

    Mock::given(method("GET"))
        .and(path("/uploads/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let record = record_from_json(serde_json::json!({
        "sendingOfficialUserId": "a4npPurePgMCD5wEmekQO",
        "releaseDate": RELEASE_MS,
        "title": "broken image",
        "body": "<p>text</p>",
        "image": "uploads/missing.jpg",
    }));

    archiver.export(vec![record]).await.unwrap();

    let post_dir = archiver
        .config
        .export_dir
        .join("東山恵里沙")
        .join(format!("{}_broken image", FILE_TS));
    let filename = format!("{}_01.jpg", FILE_TS);

    assert!(!post_dir.join(&filename).exists(), "failed download must not leave a file");

    // Documented gap: the document still references the missing filename
    let document = tokio::fs::read_to_string(post_dir.join("index.md"))
        .await
        .unwrap();
    assert!(document.contains(&format!("![image]({})", filename)));
}

#[tokio::test]
async fn missing_gallery_copy_is_repaired_without_a_download() {
    let server = MockServer::start().await;
    let (archiver, _temp_dir) = test_archiver(&server);

    let sender_dir = archiver.config.export_dir.join("東山恵里沙");
    let post_dir = sender_dir.join(format!("{}_repair me", FILE_TS));
    let filename = format!("{}_01.jpg", FILE_TS);

    // Simulate a prior run that wrote the post copy but lost the gallery copy
    tokio::fs::create_dir_all(&post_dir).await.unwrap();
    tokio::fs::write(post_dir.join(&filename), b"cached").await.unwrap();

    let record = record_from_json(serde_json::json!({
        "sendingOfficialUserId": "a4npPurePgMCD5wEmekQO",
        "releaseDate": RELEASE_MS,
        "title": "repair me",
        "image": "uploads/cached.jpg",
    }));

    archiver.export(vec![record]).await.unwrap();

    let gallery_copy = sender_dir.join("pictures").join(&filename);
    assert!(gallery_copy.exists(), "gallery copy should be repaired");
    assert_eq!(tokio::fs::read(&gallery_copy).await.unwrap(), b"cached");
    assert!(
        server.received_requests().await.unwrap().is_empty(),
        "repair must not hit the network"
    );
}

#[tokio::test]
async fn empty_title_falls_back_to_placeholder() {
    let server = MockServer::start().await;
    let (archiver, _temp_dir) = test_archiver(&server);

    let record = record_from_json(serde_json::json!({
        "sendingOfficialUserId": "unknown-sender-id",
        "releaseDate": RELEASE_MS,
        "body": "<p>untitled body</p>",
    }));

    archiver.export(vec![record]).await.unwrap();

    // Unmapped sender falls back to the raw identifier
    let post_dir = archiver
        .config
        .export_dir
        .join("unknown-sender-id")
        .join(format!("{}_untitled", FILE_TS));
    assert!(post_dir.join("index.md").exists());

    let document = tokio::fs::read_to_string(post_dir.join("index.md"))
        .await
        .unwrap();
    assert!(document.starts_with("# untitled\n"));
    assert!(document.contains("untitled body"));
}
