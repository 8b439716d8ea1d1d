//! HTML template rendering handlers for the web dashboard.

mod dashboard;
mod formula;
mod login;

pub use dashboard::dashboard_handler;
pub use formula::formula_page_handler;
pub use login::login_handler;
