//! End-to-end tests for tcg-binder.
//!
//! Each test starts a throwaway HTTP server on `127.0.0.1` that serves fixed
//! bodies by path, then drives the public API against it. Output goes to a
//! `tempfile` directory.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tcg_binder::{
    build_binder, download_images, generate_sheet, BinderConfig, BinderError, DownloadConfig,
    ItemError, RunProgressCallback, SheetConfig,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// ── Test helpers ─────────────────────────────────────────────────────────────

type Routes = HashMap<String, (u16, Vec<u8>)>;

/// Serve `routes` until the test ends. Unknown paths get a 404.
async fn serve(routes: Routes) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&buf);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let (status, body) = routes
                    .get(&path)
                    .cloned()
                    .unwrap_or((404, b"not found".to_vec()));
                let head = format!(
                    "HTTP/1.1 {status} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

/// Accept connections and never answer them.
async fn serve_silent() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{addr}")
}

fn feed(rows: &[(&str, &str, &str, &str, &str)]) -> Vec<u8> {
    let mut csv = String::from("Game,Set Name,Card Name,Card Number,Market Price\n");
    for (game, set, name, number, price) in rows {
        csv.push_str(&format!("{game},{set},\"{name}\",{number},{price}\n"));
    }
    csv.into_bytes()
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([10, 120, 200, 255])))
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn assert_pdf(path: &Path) {
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(b"%PDF"), "{} is not a PDF", path.display());
}

// ── Placeholder sheet ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sheet_twenty_cards_two_pages() {
    let names: Vec<String> = (1..=20).map(|i| format!("Card {i}")).collect();
    let numbers: Vec<String> = (1..=20).map(|i| format!("{i:03}/182")).collect();
    let mut rows: Vec<_> = (0..20)
        .map(|i| ("Pokemon", "Destined Rivals", names[i].as_str(), numbers[i].as_str(), "1.25"))
        .collect();
    rows.push(("Magic", "Destined Rivals", "Not Pokémon", "1", "9"));
    rows.push(("Pokemon", "Journey Together", "Other Set", "2", "9"));

    let base = serve(HashMap::from([("/feed.csv".to_string(), (200, feed(&rows)))])).await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("outputs/destined_rivals_placeholders.pdf");

    let config = SheetConfig::builder()
        .feed_url(format!("{base}/feed.csv"))
        .set_name("destined rivals")
        .output_path(&out)
        .build()
        .unwrap();
    let report = generate_sheet(&config).await.unwrap();

    assert_eq!(report.total_rows, 22);
    assert_eq!(report.matched_rows, 20);
    assert_eq!(report.pages, 2);
    assert_eq!(report.slots_per_page, vec![18, 2]);
    assert_eq!(report.output.as_deref(), Some(out.as_path()));
    assert_pdf(&out);
}

#[tokio::test]
async fn test_sheet_http_error_is_fatal() {
    let base = serve(HashMap::new()).await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("sheet.pdf");

    let config = SheetConfig::builder()
        .feed_url(format!("{base}/missing.csv"))
        .output_path(&out)
        .build()
        .unwrap();
    let err = generate_sheet(&config).await.unwrap_err();

    match err {
        BinderError::DownloadFailed { reason, .. } => assert!(reason.contains("404"), "{reason}"),
        other => panic!("expected DownloadFailed, got {other:?}"),
    }
    assert!(!out.exists());
}

#[tokio::test]
async fn test_sheet_feed_timeout_is_fatal() {
    let base = serve_silent().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("sheet.pdf");

    let config = SheetConfig::builder()
        .feed_url(format!("{base}/feed.csv"))
        .output_path(&out)
        .fetch_timeout_secs(1)
        .build()
        .unwrap();
    let err = generate_sheet(&config).await.unwrap_err();

    match err {
        BinderError::DownloadTimeout { secs, ref url } => {
            assert_eq!(secs, 1);
            assert!(url.ends_with("/feed.csv"), "{url}");
        }
        other => panic!("expected DownloadTimeout, got {other:?}"),
    }
    assert!(!out.exists());
}

#[tokio::test]
async fn test_sheet_missing_columns_is_fatal() {
    let body = b"Game,Product,Price\nPokemon,Pikachu,1.00\n".to_vec();
    let base = serve(HashMap::from([("/feed.csv".to_string(), (200, body))])).await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("sheet.pdf");

    let config = SheetConfig::builder()
        .feed_url(format!("{base}/feed.csv"))
        .output_path(&out)
        .build()
        .unwrap();
    let err = generate_sheet(&config).await.unwrap_err();

    match err {
        BinderError::MissingColumns { missing, found } => {
            assert!(missing.contains(&"Set Name".to_string()));
            assert!(missing.contains(&"Card Name".to_string()));
            assert_eq!(found, vec!["Game", "Product", "Price"]);
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
    assert!(!out.exists());
}

#[tokio::test]
async fn test_sheet_zero_matches_writes_nothing() {
    let rows = [("Pokemon", "Journey Together", "Pikachu", "1", "1.00")];
    let base = serve(HashMap::from([("/feed.csv".to_string(), (200, feed(&rows)))])).await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("sheet.pdf");

    let config = SheetConfig::builder()
        .feed_url(format!("{base}/feed.csv"))
        .output_path(&out)
        .build()
        .unwrap();
    let report = generate_sheet(&config).await.unwrap();

    assert_eq!(report.matched_rows, 0);
    assert_eq!(report.pages, 0);
    assert!(report.output.is_none());
    assert!(!out.exists());
}

#[test]
fn test_missing_feed_url_fails_before_any_work() {
    let err = SheetConfig::builder().build().unwrap_err();
    assert!(matches!(err, BinderError::MissingFeedUrl));
    assert!(err.to_string().contains("TCGCSV_URL"));
}

// ── Image download + binder ──────────────────────────────────────────────────

#[derive(Default)]
struct Counting {
    done: AtomicUsize,
    failed: AtomicUsize,
}

impl RunProgressCallback for Counting {
    fn on_item_complete(&self, _index: usize, _total: usize, _label: &str) {
        self.done.fetch_add(1, Ordering::SeqCst);
    }
    fn on_item_error(&self, _index: usize, _total: usize, _label: &str, _error: &str) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_download_partial_success_then_binder() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");

    // Serve images first; the CSV lives on disk and points at the server.
    let base = serve(HashMap::from([
        ("/1.png".to_string(), (200, png_bytes(40, 56))),
        ("/3.png".to_string(), (200, b"<html>oops</html>".to_vec())),
    ]))
    .await;
    let csv = format!(
        "productId,productName,imageUrl,marketPrice\n\
         1,Ethan's Ho-Oh ex,{base}/1.png,12.50\n\
         2,Missing Image,{base}/2.png,1.00\n\
         3,Not An Image,{base}/3.png,2.00\n\
         4,No Url,,3.00\n"
    );
    let csv_path = dir.path().join("data.csv");
    std::fs::write(&csv_path, csv).unwrap();

    let progress = Arc::new(Counting::default());
    let config = DownloadConfig {
        csv_input: csv_path.to_string_lossy().into_owned(),
        image_dir: images.clone(),
        progress_callback: Some(progress.clone() as Arc<dyn RunProgressCallback>),
        ..Default::default()
    };
    let report = download_images(&config).await.unwrap();

    assert_eq!(report.candidates, 3);
    assert_eq!(report.downloaded, 1);
    assert_eq!(report.skipped_no_url, 1);
    assert_eq!(report.failures.len(), 2);
    assert!(report
        .failures
        .contains(&ItemError::HttpStatus { product_id: "2".into(), status: 404 }));
    assert!(report
        .failures
        .contains(&ItemError::UnsupportedImage { product_id: "3".into() }));
    assert_eq!(progress.done.load(Ordering::SeqCst), 1);
    assert_eq!(progress.failed.load(Ordering::SeqCst), 2);

    assert!(images.join("1.png").is_file());
    assert!(!images.join("3.png").exists());

    let metadata: serde_json::Value =
        serde_json::from_slice(&std::fs::read(images.join("metadata.json")).unwrap()).unwrap();
    assert_eq!(metadata["1"]["name"], "Ethan's Ho-Oh ex");
    assert_eq!(metadata["1"]["price"], "12.50");
    assert!(metadata.get("2").is_none());

    // Second run finds the image on disk and leaves it alone.
    let again = download_images(&config).await.unwrap();
    assert_eq!(again.downloaded, 0);
    assert_eq!(again.skipped_existing, 1);

    // A corrupt file next to the good one is skipped by the binder.
    std::fs::write(images.join("0-corrupt.jpg"), b"\xFF\xD8 truncated").unwrap();
    let out = dir.path().join("binder_sheets/binder.pdf");
    let binder = build_binder(&BinderConfig {
        image_dir: images.clone(),
        output_path: out.clone(),
        ..Default::default()
    })
    .await
    .unwrap();

    assert_eq!(binder.images_found, 2);
    assert_eq!(binder.placed, 1);
    assert_eq!(binder.pages, 1);
    assert_eq!(binder.failures.len(), 1);
    assert_eq!(binder.output.as_deref(), Some(out.as_path()));
    assert_pdf(&out);
}

#[tokio::test]
async fn test_binder_corrupt_metadata_still_renders() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    std::fs::create_dir_all(&images).unwrap();
    for i in 0..10 {
        std::fs::write(images.join(format!("{i:02}.png")), png_bytes(20, 28)).unwrap();
    }
    std::fs::write(images.join("metadata.json"), "{broken").unwrap();

    let out = dir.path().join("binder.pdf");
    let report = build_binder(&BinderConfig {
        image_dir: images,
        output_path: out.clone(),
        ..Default::default()
    })
    .await
    .unwrap();

    assert_eq!(report.placed, 10);
    assert_eq!(report.pages, 2);
    assert!(report.failures.is_empty());
    assert_pdf(&out);
}

#[test]
fn test_reports_serialise_to_json() {
    let report = tcg_binder::SheetReport {
        set_name: "Destined Rivals".into(),
        total_rows: 3,
        matched_rows: 0,
        pages: 0,
        slots_per_page: vec![],
        output: None,
        duration_ms: 1,
    };
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["set_name"], "Destined Rivals");
    assert!(json["output"].is_null());
}
