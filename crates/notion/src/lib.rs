//! SpecFlow Notion record store adapter.
//!
//! Implements the [`pipeline::RecordBackend`] trait against two Notion
//! databases: one holding source records (the "Input Warehouse", keyed by a
//! `URL` property) and one holding task records.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. The
//! lookup-then-create sequence, the body layout, and the fallback source title
//! all live in the [`pipeline`] crate; this crate only translates the three
//! primitives into Notion REST calls.
//!
//! ## Database schema
//!
//! | Database | Property | Notion type |
//! |----------|----------|-------------|
//! | source | `Name` | title |
//! | source | `URL` | url |
//! | task | `Name` | title |
//! | task | `Status` | select (`Review`) |
//! | task | `Input Warehouse` | relation → source database |
//!
//! The task body is written as paragraph blocks in the page content.

pub mod backend;
pub mod blocks;
pub mod config;
pub mod error;

pub use backend::NotionRecordBackend;
pub use config::{NotionConfig, NotionTokens};
pub use error::NotionError;
