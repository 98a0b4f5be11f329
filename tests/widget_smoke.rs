#![cfg(feature = "egui")]

use egui::{Event, Modifiers, PointerButton, Pos2, RawInput, Rect, Vec2};
use quakemap::{build_map, EarthquakeFeature, MapWidget, QuakeMapConfig};

/// Headless egui driver. Frames are a quarter second apart: a press and the
/// next frame's release make a click, two separate clicks are never a double
/// click.
struct Harness {
    ctx: egui::Context,
    time: f64,
}

impl Harness {
    fn new() -> Self {
        Self {
            ctx: egui::Context::default(),
            time: 0.0,
        }
    }

    /// Runs one frame and returns the rect the map occupied
    fn frame(&mut self, widget: &mut MapWidget, events: Vec<Event>) -> Rect {
        self.time += 0.25;
        let input = RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))),
            time: Some(self.time),
            events,
            ..RawInput::default()
        };

        let mut map_rect = Rect::NOTHING;
        let _ = self.ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                map_rect = widget.show(ui).rect;
            });
        });
        map_rect
    }
}

fn press(pos: Pos2, pressed: bool) -> Event {
    Event::PointerButton {
        pos,
        button: PointerButton::Primary,
        pressed,
        modifiers: Modifiers::default(),
    }
}

fn widget() -> MapWidget {
    // One quake right at the default center
    let quake = EarthquakeFeature::new(5.0, -98.5795, 39.8283, 95.0, "Kansas", 0);
    let map = build_map(&[quake], &QuakeMapConfig::default()).unwrap();
    MapWidget::with_loader(map, None)
}

#[test]
fn test_headless_frames_render() {
    let mut harness = Harness::new();
    let mut widget = widget();

    let rect = harness.frame(&mut widget, Vec::new());
    assert!(rect.width() > 0.0 && rect.height() > 0.0);

    let viewport = widget.map().viewport();
    assert_eq!(viewport.size.x, f64::from(rect.width()));
    assert_eq!(viewport.size.y, f64::from(rect.height()));
    assert!(widget.open_popup().is_none());

    harness.frame(&mut widget, Vec::new());
}

#[test]
fn test_click_on_marker_opens_popup() {
    let mut harness = Harness::new();
    let mut widget = widget();
    let rect = harness.frame(&mut widget, Vec::new());
    let target = rect.center();

    harness.frame(&mut widget, vec![Event::PointerMoved(target), press(target, true)]);
    harness.frame(&mut widget, vec![press(target, false)]);

    let popup = widget.open_popup().expect("popup should be open");
    assert_eq!(popup.title(), "Kansas");

    // Clicking empty map closes it again
    let empty = target + Vec2::new(150.0, 80.0);
    harness.frame(&mut widget, vec![Event::PointerMoved(empty), press(empty, true)]);
    harness.frame(&mut widget, vec![press(empty, false)]);
    assert!(widget.open_popup().is_none());
}
