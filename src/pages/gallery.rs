// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Public gallery browsing with a lightbox.

use super::display_message;
use crate::models::{GalleryPage, ImageRecord};
use crate::AppContext;

#[derive(Debug)]
pub struct GalleryView {
    current_page: u32,
    page: Option<GalleryPage>,
    error: Option<String>,
    selected: Option<ImageRecord>,
}

impl Default for GalleryView {
    fn default() -> Self {
        Self {
            current_page: 1,
            page: None,
            error: None,
            selected: None,
        }
    }
}

impl GalleryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn images(&self) -> &[ImageRecord] {
        self.page.as_ref().map(|p| p.images.as_slice()).unwrap_or(&[])
    }

    pub fn total(&self) -> u64 {
        self.page.as_ref().map(|p| p.total).unwrap_or(0)
    }

    /// At least one page, so "page 1 of 1" renders for an empty gallery.
    pub fn total_pages(&self) -> u32 {
        self.page.as_ref().map(|p| p.total_pages).unwrap_or(1).max(1)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected(&self) -> Option<&ImageRecord> {
        self.selected.as_ref()
    }

    /// Load the current page.
    pub async fn load(&mut self, ctx: &AppContext) -> bool {
        self.error = None;
        match ctx.gallery.fetch_page(self.current_page).await {
            Ok(page) => {
                self.page = Some(page);
                true
            }
            Err(err) => {
                self.error = Some(display_message(&err, "Failed to load images"));
                false
            }
        }
    }

    /// Jump to `page` if it exists and load it.
    pub async fn go_to(&mut self, ctx: &AppContext, page: u32) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        self.load(ctx).await
    }

    pub async fn next(&mut self, ctx: &AppContext) -> bool {
        if self.current_page >= self.total_pages() {
            return false;
        }
        self.go_to(ctx, self.current_page + 1).await
    }

    pub async fn prev(&mut self, ctx: &AppContext) -> bool {
        if self.current_page <= 1 {
            return false;
        }
        self.go_to(ctx, self.current_page - 1).await
    }

    /// Open the lightbox on an image of the current page.
    pub fn open(&mut self, image_id: &str) -> bool {
        self.selected = self
            .images()
            .iter()
            .find(|image| image.id == image_id)
            .cloned();
        self.selected.is_some()
    }

    pub fn close(&mut self) {
        self.selected = None;
    }
}
