// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Authenticated HTTP client and refresh coordination.

pub mod client;
pub mod single_flight;

pub use client::{ApiClient, ApiRequest, SessionEvents};
pub use single_flight::{Flight, FlightLeader, SingleFlight};
