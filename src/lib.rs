// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! PixPro: client core for the PixPro image-processing product.
//!
//! This crate provides the session store, the API client with coordinated
//! token refresh, the public gallery, form validation and page flows, plus
//! a mock backend for local development and tests.

pub mod config;
pub mod error;
pub mod forms;
pub mod http;
pub mod mock;
pub mod models;
pub mod navigation;
pub mod notify;
pub mod pages;
pub mod services;
pub mod session;

use config::Config;
use error::Result;
use http::ApiClient;
use navigation::Navigator;
use notify::Notifier;
use services::GalleryService;
use session::{SessionStorage, SessionStore};
use std::sync::Arc;

/// Shared application context handed to every page.
///
/// Built once at startup; there is no global client or store.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub gallery: GalleryService,
    pub session: Arc<SessionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

impl AppContext {
    /// Wire the client, services and session store together.
    ///
    /// The session is hydrated from `storage` before this returns.
    pub fn new(
        config: Config,
        storage: Arc<dyn SessionStorage>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&config)?);
        Ok(Self::with_client(config, api, storage, notifier, navigator))
    }

    /// Same as [`AppContext::new`] with a prebuilt client.
    pub fn with_client(
        config: Config,
        api: Arc<ApiClient>,
        storage: Arc<dyn SessionStorage>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let gallery = GalleryService::new(api.clone(), config.gallery_page_size);
        let session = SessionStore::new(api.clone(), storage, navigator.clone());

        Self {
            config,
            api,
            gallery,
            session,
            notifier,
            navigator,
        }
    }
}
