//! Host capability ports (panels, windows, toolbar action, web app links)

pub mod ports;
