pub mod release;
pub mod review_apps;
pub mod templates;
