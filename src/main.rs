//! Clinic Dashboard Frontend Entry Point

mod app;
mod board;
mod commands;
mod components;
mod config;
mod context;
mod error;
mod logging;
mod models;
mod polling;
mod store;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    logging::init(config::AppConfig::from_env().log_level);
    mount_to_body(App);
}
