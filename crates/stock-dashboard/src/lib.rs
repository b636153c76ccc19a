pub mod app;
pub mod card;
pub mod classify;
pub mod dashboard;
pub mod format;
pub mod series;
pub mod ui;

pub use app::{App, AppMessage, Focus};
pub use card::{CardKey, CardView};
pub use classify::{BadgeStyle, ChangeClass, MetricLevel};
pub use dashboard::{Dashboard, Status};
pub use format::format_number;
pub use series::{prepare_series, PriceSeries};
