// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Public gallery listing.

use crate::error::Result;
use crate::http::{ApiClient, ApiRequest};
use crate::models::{GalleryPage, GalleryResponse};
use std::sync::Arc;

pub const PUBLIC_IMAGES_PATH: &str = "/images/public";

/// Fetches fixed-size pages of the public gallery.
#[derive(Clone)]
pub struct GalleryService {
    api: Arc<ApiClient>,
    page_size: u32,
}

impl GalleryService {
    pub fn new(api: Arc<ApiClient>, page_size: u32) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch page `page` (1-based). Pages past the end come back empty.
    pub async fn fetch_page(&self, page: u32) -> Result<GalleryPage> {
        let page = page.max(1);
        let request = ApiRequest::get(PUBLIC_IMAGES_PATH)
            .query("page", page)
            .query("limit", self.page_size);

        let response: GalleryResponse = self.api.execute(&request).await?;
        let gallery = GalleryPage::from_response(response, self.page_size);

        tracing::debug!(
            page = gallery.page,
            items = gallery.images.len(),
            total = gallery.total,
            total_pages = gallery.total_pages,
            "Gallery page loaded"
        );

        Ok(gallery)
    }
}
