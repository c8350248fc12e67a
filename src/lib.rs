//! # Pressroom
//!
//! Publication backend for a small commodity-news site. An authenticated
//! editor publishes an article with an optional lead image and keeps a
//! gold/silver price registry current, against a relational store and an
//! object-storage bucket that may be transiently unavailable.
//!
//! # Architecture: One Pipeline, One Fallback
//!
//! A publish attempt walks a fixed phase sequence:
//!
//! ```text
//! Idle → Transcoding → Uploading → Persisting → Done
//!              │            │
//!              └────────────┴──→ RecoverableError (retry with skip_asset_upload)
//! ```
//!
//! Storage trouble in the middle phases is recoverable: the editor can
//! republish with the skip flag and the article lands without its hosted
//! image. A persistence failure at the end is final for the attempt and is
//! reported verbatim. Price updates bypass the pipeline entirely and go
//! straight to the registry.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`slug`] | Title → URL-safe identifier, with a `dispatch-<millis>` fallback |
//! | [`transcode`] | In-memory raster → AVIF at fixed quality, three distinct failure kinds |
//! | [`storage`] | Credential minting ([`storage::issuer`]) and the two-phase upload ([`storage::uploader`]) |
//! | [`server`] | `POST /api/sign-upload` — the issuer's HTTP surface |
//! | [`publish`] | The coordinator: phase machine, fallback branch, persist-time stamping |
//! | [`registry`] | Price validation, rounding, append + latest + history reads |
//! | [`store`] | `ArticleStore` trait with SQLite, in-memory, and disconnected engines |
//! | [`auth`] | Pluggable credential verification → publishing principal |
//! | [`article`] | Shared domain types: articles, authors, categories, snapshots |
//! | [`config`] | Environment-supplied settings with explicit degraded modes |
//!
//! # Design Decisions
//!
//! ## Short-Lived Capabilities, Not Client-Side Secrets
//!
//! The publishing side never holds storage credentials. It asks the issuer
//! for a 60-second, single-object, content-type-bound write URL per attempt,
//! and the credential is discarded after one use. Expiry is the only
//! single-use enforcement — the issuer is stateless.
//!
//! ## AVIF-Only Lead Images
//!
//! Every uploaded lead image is transcoded to AVIF at quality 80, dimensions
//! preserved. One modern format keeps the bucket uniform and the pipeline
//! free of per-format branching; the `image` crate does the work in pure
//! Rust.
//!
//! ## Degraded Modes Over Hard Failures
//!
//! Missing storage secrets make sign requests fail with a configuration
//! error; a missing database makes the connectivity probe report
//! disconnected. Both leave the process running and the editor informed —
//! no error in this crate is fatal to the process.

pub mod article;
pub mod auth;
pub mod config;
pub mod publish;
pub mod registry;
pub mod server;
pub mod slug;
pub mod storage;
pub mod store;
pub mod transcode;
