pub mod auth_handler;
pub mod dashboard_handler;
pub mod health;
pub mod locations_handler;
pub mod metrics;
pub mod positions_handler;
pub mod setup_handler;
pub mod shifts_handler;
pub mod time_off_handler;
pub mod timeclock_handler;
pub mod timesheets_handler;
pub mod users_handler;

pub use health::health_check;
pub use metrics::{metrics_handler, setup_metrics_recorder, MetricsState};
