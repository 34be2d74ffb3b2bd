//  Copyright 2024. The Warden Project. See LICENSE for terms.

//! Core validation and mempool engine for the Warden permissioned, proof-of-work chain.
//!
//! This crate owns three things: the block/transaction validation pipeline (`validation`), the
//! ASERT difficulty retarget (`difficulty`), and the nonce-ordered fee-prioritized mempool engine
//! (`mempool`). Everything it needs from storage, the P2P layer, or chain state is expressed as a
//! trait in `collab` and injected by the caller; this crate never opens a socket or a database
//! file itself.

pub mod checkpoints;
pub mod cli;
pub mod collab;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod mempool;
pub mod model;
pub mod validation;

pub use error::FatalError;
