//! Finsync backend functions ported to a single HTTP service.
//!
//! Realtime Database triggers arrive as webhook POSTs under `/triggers`, the
//! email-verification callback is served at `/handle_verification_click`, and
//! all outbound mail goes through the Resend provider.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
