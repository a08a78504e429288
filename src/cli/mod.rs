pub mod dashboard;
pub mod oneshot;
pub mod setup;
pub mod ui;
pub mod view;
