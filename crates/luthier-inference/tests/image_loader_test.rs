//! Tests for fetching caller photos over HTTP.

use luthier_inference::ImageLoader;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D];

#[tokio::test]
async fn test_url_images_fetched_and_encoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/front.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(JPEG_BYTES),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let loader = ImageLoader::new(5).unwrap();
    let urls = vec![format!("{}/front.jpg", mock_server.uri())];
    let images = loader.load(&urls, &[]).await;

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].media_type, "image/jpeg");
    assert_eq!(images[0].data, "/9j/4AAQSkZJRgA=");
}

#[tokio::test]
async fn test_media_type_sniffed_without_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/headstock"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES))
        .mount(&mock_server)
        .await;

    let loader = ImageLoader::new(5).unwrap();
    let images = loader
        .load(&[format!("{}/headstock", mock_server.uri())], &[])
        .await;

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].media_type, "image/png");
}

#[tokio::test]
async fn test_failed_urls_skipped_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(PNG_BYTES),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(JPEG_BYTES),
        )
        .mount(&mock_server)
        .await;

    let loader = ImageLoader::new(5).unwrap();
    let urls = vec![
        format!("{}/a.png", mock_server.uri()),
        format!("{}/missing.jpg", mock_server.uri()),
        format!("{}/b.jpg", mock_server.uri()),
    ];
    let images = loader.load(&urls, &[]).await;

    assert_eq!(images.len(), 2);
    assert_eq!(images[0].media_type, "image/png");
    assert_eq!(images[1].media_type, "image/jpeg");
}

#[tokio::test]
async fn test_inline_used_only_when_no_url_loads() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ok.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(JPEG_BYTES),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let loader = ImageLoader::new(5).unwrap();
    let inline = vec!["data:image/webp;base64,UklGRg==".to_string()];

    let with_url = loader
        .load(&[format!("{}/ok.jpg", mock_server.uri())], &inline)
        .await;
    assert_eq!(with_url.len(), 1);
    assert_eq!(with_url[0].media_type, "image/jpeg");

    let fallback = loader
        .load(&[format!("{}/gone.jpg", mock_server.uri())], &inline)
        .await;
    assert_eq!(fallback.len(), 1);
    assert_eq!(fallback[0].media_type, "image/webp");
}

#[tokio::test]
async fn test_at_most_five_urls_fetched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(JPEG_BYTES),
        )
        .expect(5)
        .mount(&mock_server)
        .await;

    let loader = ImageLoader::new(5).unwrap();
    let urls: Vec<String> = (0..8)
        .map(|i| format!("{}/photo{}.jpg", mock_server.uri(), i))
        .collect();
    let images = loader.load(&urls, &[]).await;

    assert_eq!(images.len(), 5);
}
