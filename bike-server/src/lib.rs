//! Seoul public bike dashboard server.
//!
//! Shows which Ttareungyi stations have no bikes to rent and which have no
//! racks to return to, refreshed from the Seoul Open Data API at most once
//! every five minutes per client.

pub mod classify;
pub mod config;
pub mod domain;
pub mod geo;
pub mod refresh;
pub mod seoul;
pub mod session;
pub mod web;
