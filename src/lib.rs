//! Sessionvault - a Telegram bot that turns uploaded files into shareable sessions.
//!
//! The owner stages files in a private chat, finalises them into a session
//! and shares a `https://t.me/<bot>?start=<id>` deep link. Opening the link
//! delivers the files, subject to revocation, expiry, forced channel
//! membership, copy protection and auto-deletion.
//!
//! # Architecture
//!
//! - [`domain`] - Telegram-agnostic types: sessions, files, the staging machine
//! - [`port`] - Store and messenger traits, inbound update views
//! - [`application`] - Vault delivery, upload flow, admin, backup and scheduler services
//! - [`adapter`] - SQLite (diesel) and Telegram (teloxide) adapters, health endpoint
//! - [`infrastructure`] - Configuration, wiring and the runtime loop
//! - [`cli`] - Command-line entry points

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
