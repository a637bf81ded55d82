//! Loan Decision API Library
//!
//! Core functionality for the loan-decisioning pipeline: a scoring policy
//! that simulates an approval model, a gateway to the remote compliance
//! auditor with a rule-based local fallback, an append-only decision ledger,
//! and the orchestrating HTTP handlers.
//!
//! # Modules
//!
//! - `audit_client`: Remote auditor client and gateway error taxonomy.
//! - `config`: Configuration management.
//! - `correlation`: Request-correlation middleware.
//! - `errors`: Error handling types.
//! - `fallback_audit`: Rule-based compliance review.
//! - `handlers`: HTTP request handlers and router.
//! - `ledger`: Append-only decision store.
//! - `models`: Core data models and boundary validation.
//! - `scoring`: Simulated approval model.

pub mod audit_client;
pub mod config;
pub mod correlation;
pub mod errors;
pub mod fallback_audit;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod scoring;
