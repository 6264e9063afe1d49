//! Console overview and listings.

use quire_store::{Blurb, ContentBlock, ContentSection, ImageBlurb};
use serde::Serialize;

use crate::error::ContentError;
use crate::site::Site;

/// Counts shown on the console index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConsoleOverview {
    pub static_section_count: usize,
    pub static_block_count: usize,
    pub blurb_count: usize,
    pub image_blurb_count: usize,
}

impl Site {
    pub async fn console_overview(&self) -> Result<ConsoleOverview, ContentError> {
        Ok(ConsoleOverview {
            static_section_count: self.store.static_sections().await?.len(),
            static_block_count: self.store.static_blocks().await?.len(),
            blurb_count: self.store.blurbs().await?.len(),
            image_blurb_count: self.store.image_blurbs().await?.len(),
        })
    }

    pub async fn static_sections(&self) -> Result<Vec<ContentSection>, ContentError> {
        Ok(self.store.static_sections().await?)
    }

    pub async fn static_blocks(&self) -> Result<Vec<ContentBlock>, ContentError> {
        Ok(self.store.static_blocks().await?)
    }

    /// All blurbs by last known location, then identifier.
    pub async fn blurbs(&self) -> Result<Vec<Blurb>, ContentError> {
        Ok(self.store.blurbs().await?)
    }

    /// All image blurbs by last known location, then identifier.
    pub async fn image_blurbs(&self) -> Result<Vec<ImageBlurb>, ContentError> {
        Ok(self.store.image_blurbs().await?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::site::test_support::{about_team, site};

    #[tokio::test]
    async fn test_overview_counts_static_content_only() {
        let site = site();
        let (about, _) = about_team(&site).await;
        site.section_for_menu(about.id).await.unwrap();
        site.static_section("footer", Some("/")).await.unwrap();
        site.static_block("hero", "carousel_block", Some("/")).await.unwrap();
        site.blurb("home/intro", false, Some("/")).await.unwrap();
        site.blurb("home/outro", true, Some("/")).await.unwrap();

        let overview = site.console_overview().await.unwrap();

        assert_eq!(
            overview,
            ConsoleOverview {
                static_section_count: 1,
                static_block_count: 1,
                blurb_count: 2,
                image_blurb_count: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_blurbs_ordered_by_location() {
        let site = site();
        site.blurb("b", false, Some("/z")).await.unwrap();
        site.blurb("a", false, Some("/z")).await.unwrap();
        site.blurb("c", false, Some("/a")).await.unwrap();

        let identifiers: Vec<String> = site
            .blurbs()
            .await
            .unwrap()
            .into_iter()
            .filter_map(|b| b.identifier)
            .collect();

        assert_eq!(identifiers, vec!["c", "a", "b"]);
    }
}
