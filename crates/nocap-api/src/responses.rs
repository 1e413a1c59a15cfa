// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageMetadata {
    pub page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
}

impl PageMetadata {
    #[must_use]
    pub fn for_page(page: usize, page_size: usize, total_count: usize) -> Self {
        let total_pages = if total_count == 0 {
            1
        } else {
            total_count.div_ceil(page_size.max(1))
        };
        Self {
            page,
            page_size,
            total_count,
            total_pages,
        }
    }
}

/// Success bodies: `{"data": ..., "metadata"?: ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiResponseEnvelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PageMetadata>,
}

impl<T> ApiResponseEnvelope<T> {
    #[must_use]
    pub fn bare(data: T) -> Self {
        Self {
            data,
            metadata: None,
        }
    }

    #[must_use]
    pub fn paged(data: T, metadata: PageMetadata) -> Self {
        Self {
            data,
            metadata: Some(metadata),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_rounds_total_pages_up() {
        let meta = PageMetadata::for_page(1, 50, 101);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn empty_collections_still_have_one_page() {
        let meta = PageMetadata::for_page(1, 50, 0);
        assert_eq!(meta.total_pages, 1);
        assert_eq!(meta.total_count, 0);
    }
}
