// Copyright 2026 Zalo Proxy Contributors
// SPDX-License-Identifier: Apache-2.0

//! Zalo profile lookup proxy.
//!
//! Resolves a phone number to the display name on its public Zalo profile
//! page. The profile page renders its identity data inconsistently —
//! sometimes in static HTML, sometimes only after client-side script
//! execution — so the pipeline applies an ordered chain of extraction rules
//! over a document obtained by one of two interchangeable fetch strategies
//! (plain HTTP GET or headless-browser render). Successful results are held
//! in a TTL-bounded in-memory cache with periodic sweep eviction.

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod lookup;
pub mod phone;
pub mod rest;
