//! Blurbs and image blurbs.
//!
//! Templates embed blurbs by identifier; the first reference creates the row
//! with no content. `None` content means never authored, `Some("")` means
//! intentionally blank.

use quire_store::{Blurb, BlurbId, ImageBlurb, ImageBlurbId, NewBlurb, NewImageBlurb};

use crate::error::ContentError;
use crate::site::Site;

/// Template rendering a blurb.
pub const BLURB_TEMPLATE: &str = "content/blurb.html";

impl Site {
    /// The blurb `identifier`, created unauthored on first request.
    ///
    /// An existing blurb whose `plain_text` flag differs from the request is
    /// corrected in place.
    pub async fn blurb(
        &self,
        identifier: &str,
        plain_text: bool,
        location: Option<&str>,
    ) -> Result<Blurb, ContentError> {
        let mut blurb = get_or_create!(
            "blurb",
            fetch: self.store.blurb_by_identifier(identifier),
            insert: self.store.insert_blurb(NewBlurb {
                identifier: Some(identifier.to_owned()),
                label: None,
                content: None,
                plain_text,
                last_known_location: location.map(str::to_owned),
            }),
        )?;

        if blurb.plain_text != plain_text {
            blurb.plain_text = plain_text;
            self.store.update_blurb(&blurb).await?;
            tracing::warn!(
                blurb = %blurb.display_name(),
                plain_text,
                "Auto-correcting blurb type"
            );
        }
        Ok(blurb)
    }

    /// Blurb `id`.
    ///
    /// # Errors
    ///
    /// [`ContentError::NotFound`] for an unknown id.
    pub async fn blurb_by_id(&self, id: BlurbId) -> Result<Blurb, ContentError> {
        self.store
            .blurb(id)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("blurb {id}")))
    }

    /// Set the content of blurb `id`.
    ///
    /// `next_location` is the page the edit came from; when given it becomes
    /// the blurb's last known location.
    pub async fn update_blurb(
        &self,
        id: BlurbId,
        content: String,
        next_location: Option<&str>,
    ) -> Result<Blurb, ContentError> {
        let mut blurb = self.blurb_by_id(id).await?;
        blurb.content = Some(content);
        if let Some(location) = next_location.filter(|l| !l.is_empty()) {
            blurb.last_known_location = Some(location.to_owned());
        }
        self.store.update_blurb(&blurb).await?;
        tracing::info!(blurb = %id, "Updated blurb");
        Ok(blurb)
    }

    /// The image blurb `identifier`, created on first request.
    ///
    /// `placeholder` is recorded only at creation.
    pub async fn image_blurb(
        &self,
        identifier: &str,
        placeholder: Option<&str>,
        location: Option<&str>,
    ) -> Result<ImageBlurb, ContentError> {
        get_or_create!(
            "image_blurb",
            fetch: self.store.image_blurb_by_identifier(identifier),
            insert: self.store.insert_image_blurb(NewImageBlurb {
                identifier: Some(identifier.to_owned()),
                label: None,
                image: None,
                placeholder: placeholder.map(str::to_owned),
                last_known_location: location.map(str::to_owned),
            }),
        )
    }

    /// Image blurb `id`.
    ///
    /// # Errors
    ///
    /// [`ContentError::NotFound`] for an unknown id.
    pub async fn image_blurb_by_id(&self, id: ImageBlurbId) -> Result<ImageBlurb, ContentError> {
        self.store
            .image_blurb(id)
            .await?
            .ok_or_else(|| ContentError::not_found(format!("image blurb {id}")))
    }

    /// Set the image URL of image blurb `id`. `None` clears it.
    pub async fn update_image_blurb(
        &self,
        id: ImageBlurbId,
        image: Option<String>,
        next_location: Option<&str>,
    ) -> Result<ImageBlurb, ContentError> {
        let mut blurb = self.image_blurb_by_id(id).await?;
        blurb.image = image.filter(|url| !url.is_empty());
        if let Some(location) = next_location.filter(|l| !l.is_empty()) {
            blurb.last_known_location = Some(location.to_owned());
        }
        self.store.update_image_blurb(&blurb).await?;
        tracing::info!(image_blurb = %id, "Updated image blurb");
        Ok(blurb)
    }

    /// Image URL of `blurb`, falling back to its placeholder under the static URL.
    #[must_use]
    pub fn image_src(&self, blurb: &ImageBlurb) -> Option<String> {
        blurb.src(&self.config.static_url)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::site::test_support::site;

    #[tokio::test]
    async fn test_blurb_created_unauthored() {
        let site = site();

        let blurb = site.blurb("home/intro", false, Some("/")).await.unwrap();

        assert_eq!(blurb.content, None);
        assert!(!blurb.is_authored());
        assert!(!blurb.is_blank());
        assert_eq!(blurb.last_known_location.as_deref(), Some("/"));
    }

    #[tokio::test]
    async fn test_blank_is_distinct_from_unauthored() {
        let site = site();
        let blurb = site.blurb("home/intro", false, None).await.unwrap();

        let blank = site.update_blurb(blurb.id, String::new(), None).await.unwrap();

        assert!(blank.is_blank());
        assert!(blank.is_authored());
    }

    #[tokio::test]
    async fn test_blurb_get_is_idempotent() {
        let site = site();

        let first = site.blurb("home/intro", false, Some("/")).await.unwrap();
        let second = site.blurb("home/intro", false, Some("/about")).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_plain_text_flag_is_corrected() {
        let site = site();
        let rich = site.blurb("footer/address", false, None).await.unwrap();

        let plain = site.blurb("footer/address", true, None).await.unwrap();

        assert_eq!(plain.id, rich.id);
        assert!(plain.plain_text);
        assert!(site.blurb_by_id(rich.id).await.unwrap().plain_text);
    }

    #[tokio::test]
    async fn test_update_blurb_tracks_location() {
        let site = site();
        let blurb = site.blurb("home/intro", false, Some("/")).await.unwrap();

        let kept = site
            .update_blurb(blurb.id, "<p>Hi</p>".to_owned(), None)
            .await
            .unwrap();
        assert_eq!(kept.last_known_location.as_deref(), Some("/"));

        let moved = site
            .update_blurb(blurb.id, "<p>Hello</p>".to_owned(), Some("/welcome"))
            .await
            .unwrap();
        assert_eq!(moved.last_known_location.as_deref(), Some("/welcome"));
        assert_eq!(moved.href(), format!("/welcome#dt-content-blurb-{}", blurb.id));
    }

    #[tokio::test]
    async fn test_image_blurb_placeholder_and_update() {
        let site = site();

        let hero = site
            .image_blurb("home:hero", Some("img/hero.png"), Some("/"))
            .await
            .unwrap();
        assert_eq!(site.image_src(&hero).as_deref(), Some("/static/img/hero.png"));

        let again = site.image_blurb("home:hero", None, None).await.unwrap();
        assert_eq!(again.placeholder.as_deref(), Some("img/hero.png"));

        let updated = site
            .update_image_blurb(hero.id, Some("/media/hero.jpg".to_owned()), None)
            .await
            .unwrap();
        assert_eq!(site.image_src(&updated).as_deref(), Some("/media/hero.jpg"));
    }

    #[tokio::test]
    async fn test_unknown_blurb_id() {
        let site = site();

        let err = site
            .update_blurb(BlurbId(42), String::new(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ContentError::NotFound { .. }));
    }
}
