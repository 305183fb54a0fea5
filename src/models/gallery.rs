// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Public gallery models.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A publicly listable processed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ImageRecord {
    pub id: String,
    pub file_name: String,
    pub url: String,
    pub signed_url: String,
    pub mime_type: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub size: u64,
    pub user_id: String,
    pub project_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ImageRecord {
    /// Size in megabytes with two decimals, as shown under thumbnails.
    pub fn size_mb(&self) -> String {
        format!("{:.2} MB", self.size as f64 / 1024.0 / 1024.0)
    }
}

/// Envelope of `GET /images/public`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GalleryResponse {
    pub status: String,
    pub message: Option<String>,
    pub data: GalleryData,
}

/// Paginated payload inside [`GalleryResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GalleryData {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub data: Vec<ImageRecord>,
}

/// One page of the public gallery as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryPage {
    pub images: Vec<ImageRecord>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl GalleryPage {
    /// Build a page from the wire envelope, using the requested limit for
    /// the page count.
    pub fn from_response(response: GalleryResponse, limit: u32) -> Self {
        let mut images = response.data.data;
        images.truncate(limit as usize);

        Self {
            images,
            total: response.data.total,
            page: response.data.page,
            limit,
            total_pages: total_pages(response.data.total, limit),
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// `ceil(total / limit)`; zero items give zero pages.
pub fn total_pages(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 12), 0);
        assert_eq!(total_pages(1, 12), 1);
        assert_eq!(total_pages(12, 12), 1);
        assert_eq!(total_pages(13, 12), 2);
        assert_eq!(total_pages(30, 12), 3);
        assert_eq!(total_pages(30, 0), 0);
    }

    #[test]
    fn test_gallery_response_parses_null_project() {
        let body = r#"{
            "status": "success",
            "message": null,
            "data": {
                "total": 1, "page": 1, "limit": 12,
                "data": [{
                    "id": "img-1", "file_name": "sunset.png",
                    "url": "https://cdn.pixpro.app/img-1.png",
                    "signed_url": "https://cdn.pixpro.app/img-1.png?sig=abc",
                    "mime_type": "image/png", "size": 2097152,
                    "user_id": "u1", "project_id": null, "tags": ["sunset"]
                }]
            }
        }"#;

        let response: GalleryResponse = serde_json::from_str(body).unwrap();
        let page = GalleryPage::from_response(response, 12);

        assert_eq!(page.total_pages, 1);
        assert_eq!(page.images[0].project_id, None);
        assert_eq!(page.images[0].size_mb(), "2.00 MB");
        assert!(!page.has_next());
        assert!(!page.has_prev());
    }
}
