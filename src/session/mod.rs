// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Client session state and its persistence.

pub mod storage;
pub mod store;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, ACCESS_TOKEN_KEY, USER_KEY};
pub use store::SessionStore;
