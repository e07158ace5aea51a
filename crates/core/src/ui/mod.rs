//! UI consumers

pub mod status_view;

pub use status_view::StatusView;
