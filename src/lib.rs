//! fiche - property record lookup and reconciliation
//!
//! Geocodes an address, fetches its energy-performance diagnostics (DPE)
//! and recorded sales (DVF), narrows each candidate set with the user's
//! help and merges what is left into one record with per-field provenance.

pub mod audit;
pub mod cli;
pub mod clients;
pub mod config;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod record;
pub mod reduce;
