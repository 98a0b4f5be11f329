use anyhow::Context as _;
use quakemap::{
    build_map,
    ui::widget::{MapWidget, MapWidgetExt},
    FeedLoader, FeedSource, FeedState, HttpFeedSource, QuakeMapConfig, StaticFeedSource,
};
use std::sync::Arc;

/// Earthquake map viewer. Takes an optional JSON config path as its only
/// argument; `QUAKEMAP_*` environment variables override the file.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => QuakeMapConfig::from_file(&path)
            .with_context(|| format!("reading config {path}"))?,
        None => QuakeMapConfig::default(),
    }
    .with_env_overrides()
    .context("applying environment overrides")?;
    config.validate().context("invalid configuration")?;

    let source = feed_source(&config)?;
    log::info!("starting quakemap with feed {}", source.describe());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Earthquakes"),
        ..Default::default()
    };

    eframe::run_native(
        "quakemap-app",
        options,
        Box::new(move |_cc| Box::new(QuakeMapApp::new(config, source))),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {e}"))?;

    Ok(())
}

/// HTTP(S) URLs are fetched; anything else is read as a local GeoJSON file
fn feed_source(config: &QuakeMapConfig) -> anyhow::Result<Arc<dyn FeedSource>> {
    if config.feed_url.contains("://") {
        let source = HttpFeedSource::from_config(config).context("building HTTP client")?;
        return Ok(Arc::new(source));
    }
    let body = std::fs::read_to_string(&config.feed_url)
        .with_context(|| format!("reading feed file {}", config.feed_url))?;
    Ok(Arc::new(StaticFeedSource::new(config.feed_url.clone(), body)))
}

struct QuakeMapApp {
    config: QuakeMapConfig,
    source: Arc<dyn FeedSource>,
    loader: Option<FeedLoader>,
    widget: Option<MapWidget>,
    error: Option<String>,
}

impl QuakeMapApp {
    fn new(config: QuakeMapConfig, source: Arc<dyn FeedSource>) -> Self {
        let mut app = Self {
            config,
            source,
            loader: None,
            widget: None,
            error: None,
        };
        app.reload();
        app
    }

    fn reload(&mut self) {
        self.widget = None;
        self.error = None;
        match FeedLoader::spawn(Arc::clone(&self.source)) {
            Ok(loader) => self.loader = Some(loader),
            Err(e) => {
                log::error!("cannot start feed request: {e}");
                self.loader = None;
                self.error = Some(e.to_string());
            }
        }
    }

    /// Moves a finished feed into a map exactly once
    fn poll_feed(&mut self) {
        if self.widget.is_some() || self.error.is_some() {
            return;
        }
        let Some(loader) = self.loader.as_mut() else {
            return;
        };

        match loader.poll() {
            FeedState::Loading => {}
            FeedState::Ready(features) => match build_map(features, &self.config) {
                Ok(map) => self.widget = Some(MapWidget::new(map)),
                Err(e) => {
                    log::error!("cannot build map: {e}");
                    self.error = Some(e.to_string());
                }
            },
            FeedState::Unavailable(reason) => self.error = Some(reason.clone()),
        }
    }
}

impl eframe::App for QuakeMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_feed();

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                if let Some(widget) = self.widget.as_mut() {
                    ui.quake_map(widget);
                    return;
                }

                let mut reload = false;
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| match &self.error {
                        Some(reason) => {
                            ui.heading("Earthquake data is unavailable");
                            ui.label(reason.as_str());
                            reload = ui.button("Reload").clicked();
                        }
                        None => {
                            ui.spinner();
                            ui.label("Loading earthquakes…");
                        }
                    });
                });

                if reload {
                    self.reload();
                }
            });

        if self.widget.is_none() && self.error.is_none() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
