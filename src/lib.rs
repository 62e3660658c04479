pub mod binance;
pub mod coingecko;
pub mod config;
pub mod curve;
pub mod debounce;
pub mod error;
pub mod event;
pub mod feed;
pub mod input;
pub mod model;
pub mod suggestion;
pub mod theme;
pub mod ui;
