//! # Agro Club payment server
//! This crate hosts the process around the payment workflow engine. It is responsible for:
//! * Serving the mini-app API: checkout, subscription requests, subscription status and store selection.
//! * Receiving Telegram updates on a webhook and routing receipts and administrator decisions to the engine.
//! * Delivering the engine's notifications through the Telegram Bot API.
//! * Sweeping expired subscriptions on a timer.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/orders/confirm`, `/api/orders/create`: Checkout.
//! * `/api/subscribe/request-invoice`: Subscription requests.
//! * `/api/user/subscription-status`, `/api/user/set-store`: The buyer's profile.
//! * `/api/delivery/price`: The flat delivery rate.
//! * `/telegram/webhook`: Bot updates.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;
pub mod sessions;
pub mod sweeper;
pub mod telegram;

#[cfg(test)]
mod endpoint_tests;
