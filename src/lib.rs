//! # Konto
//!
//! `konto` is a small account directory service. It registers accounts over
//! HTTP, stores them in Postgres with Argon2id password hashes, and
//! authenticates logins, handing back an opaque per-account `user_key`.

pub mod api;
pub mod cli;
pub mod directory;
