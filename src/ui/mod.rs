pub mod controls;
pub mod legend;
pub mod popup;

#[cfg(feature = "egui")]
pub mod widget;

pub use controls::{ControlPosition, LayerControl, LayerEntry};
pub use legend::{Legend, LegendRow};
pub use popup::{format_time_millis, popup_for, popup_for_in, Popup};

#[cfg(feature = "egui")]
pub use popup::PopupStyle;

#[cfg(feature = "egui")]
pub use widget::{MapWidget, MapWidgetConfig, MapWidgetExt};
