//! relnotes - Sprint Release Notes Library
//!
//! This library provides the core functionality for the relnotes CLI:
//! recording release notes against design-system component sets, grouping
//! them into sprints, and publishing changelogs into a host document.
//!
//! # Core Concepts
//!
//! - **Sprints**: named buckets of notes; the unit of persistence and publish
//! - **Release notes**: tagged change entries pointing at a component set
//! - **Self-healing selection**: "last selected" pointers never dangle
//! - **Publishing**: an additive aggregated history plus one replaced
//!   changelog per component set
//!
//! # Module Organization
//!
//! - `store`: namespaced key/value stores (memory and file backed)
//! - `repository`: sprint records, component-set catalog, selection pointers
//! - `aggregate`: grouping of notes into changelog entries
//! - `document` / `builder`: abstract changelog trees
//! - `host`: host document abstraction and an in-memory document
//! - `publish`: reconciling built trees with the host document
//! - `protocol`: command/response messages and the command core
//! - `transfer`: export and import of all sprints
//! - `cli`, `output`, `storage`, `lock`, `config`: the command-line frontend

pub mod aggregate;
pub mod builder;
pub mod cli;
pub mod clock;
pub mod config;
pub mod document;
pub mod error;
pub mod host;
pub mod lock;
pub mod model;
pub mod output;
pub mod protocol;
pub mod publish;
pub mod repository;
pub mod storage;
pub mod store;
pub mod transfer;

pub use error::{Error, Result};
