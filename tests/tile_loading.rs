#![cfg(feature = "egui")]

use egui::{Pos2, RawInput, Rect, Vec2};
use quakemap::{
    layers::tile::TileLayerOptions, prelude::HashSet, LatLng, Map, MapWidget, Point, TileLayer,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

/// Tile server that answers every request with `200 OK` and an HTML body,
/// the way a rate-limiting CDN does. Returns the URL template and a hit
/// counter.
async fn serve_html_tiles() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                counter.fetch_add(1, Ordering::SeqCst);

                let body = "<html>rate limited</html>";
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{addr}/{{z}}/{{x}}/{{y}}.png"), hits)
}

fn frame(ctx: &egui::Context, widget: &mut MapWidget, time: f64) {
    let input = RawInput {
        screen_rect: Some(Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))),
        time: Some(time),
        ..RawInput::default()
    };
    let _ = ctx.run(input, |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            widget.show(ui);
        });
    });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_undecodable_tiles_are_fetched_once() {
    let (template, hits) = serve_html_tiles().await;

    let mut map = Map::new(LatLng::new(0.0, 0.0), 1.0, Point::new(800.0, 600.0));
    let layer = TileLayer::with_options(
        "local".to_string(),
        "Local".to_string(),
        TileLayerOptions {
            url_template: template,
            subdomains: Vec::new(),
            ..TileLayerOptions::default()
        },
    );
    map.add_layer(Box::new(layer)).unwrap();
    map.set_active_base("local").unwrap();

    // Picks up the test runtime for tile downloads
    let mut widget = MapWidget::new(map);
    let ctx = egui::Context::default();

    let mut time = 0.0;
    for _ in 0..40 {
        time += 0.05;
        frame(&ctx, &mut widget, time);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let visible = {
        let base = widget
            .map()
            .layers()
            .active_base()
            .and_then(|l| l.as_any().downcast_ref::<TileLayer>())
            .unwrap();
        base.visible_tiles(widget.map().viewport())
            .into_iter()
            .map(|t| t.coord)
            .collect::<HashSet<_>>()
            .len()
    };

    let served = hits.load(Ordering::SeqCst);
    assert!(served > 0, "no tile was requested");
    assert!(
        served <= visible,
        "{served} tile requests for {visible} visible tiles"
    );
}
