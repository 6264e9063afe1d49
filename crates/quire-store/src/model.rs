//! Persisted content entities.
//!
//! These are the rows a [`Store`](crate::Store) reads and writes. Hierarchy
//! rules (menu depth, get-or-create semantics) live in `quire-content`; the
//! store only enforces uniqueness and referential integrity.

use std::fmt;

use serde::de;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Primary key of a [`Menu`].
    MenuId
);
id_type!(
    /// Primary key of a [`ContentSection`].
    SectionId
);
id_type!(
    /// Primary key of a [`ContentBlock`].
    BlockId
);
id_type!(
    /// Primary key of a [`Blurb`].
    BlurbId
);
id_type!(
    /// Primary key of an [`ImageBlurb`].
    ImageBlurbId
);

/// Navigable menu node: a root menu or a child of one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub id: MenuId,
    /// Display text.
    pub title: String,
    /// Path segment, unique within the sibling scope.
    pub url_slug: String,
    pub disabled: bool,
    /// Parent menu (`None` for root menus).
    pub parent_id: Option<MenuId>,
    /// External or absolute URL the menu redirects to instead of a page.
    pub redirect_to: Option<String>,
    /// Position among siblings.
    pub position: i64,
}

impl Menu {
    /// True for menus without a parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Values for a menu that has not been stored yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewMenu {
    pub title: String,
    pub url_slug: String,
    pub disabled: bool,
    pub parent_id: Option<MenuId>,
    pub redirect_to: Option<String>,
}

/// Content container bound to a menu, or standalone ("static") by key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    pub id: SectionId,
    /// Key of a static section.
    pub key: Option<String>,
    /// URL where a static section was first requested.
    pub static_location: Option<String>,
    /// Bound menu (`None` for static sections).
    pub menu_id: Option<MenuId>,
}

impl ContentSection {
    /// A section is static iff it is not bound to a menu.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.menu_id.is_none()
    }
}

/// Values for a section that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSection {
    pub key: Option<String>,
    pub static_location: Option<String>,
    pub menu_id: Option<MenuId>,
}

impl NewSection {
    /// Section bound to `menu`.
    #[must_use]
    pub fn for_menu(menu: MenuId) -> Self {
        Self {
            key: None,
            static_location: None,
            menu_id: Some(menu),
        }
    }

    /// Static section identified by `key`, first requested at `location`.
    #[must_use]
    pub fn with_key(key: impl Into<String>, location: Option<String>) -> Self {
        Self {
            key: Some(key.into()),
            static_location: location,
            menu_id: None,
        }
    }
}

/// Kind-specific payload of a content block.
///
/// Serialized as an object whose `kind` field doubles as the block type key.
/// Kinds without a dedicated variant keep their fields in [`Self::Custom`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockPayload {
    /// Formatted (HTML) text.
    RichTextBlock { content: String },
    /// Image carousel. Carries no data yet.
    CarouselBlock,
    /// Any other registered kind.
    Custom {
        kind: String,
        data: Map<String, Value>,
    },
}

impl BlockPayload {
    const RICH_TEXT: &'static str = "rich_text_block";
    const CAROUSEL: &'static str = "carousel_block";

    /// Empty payload of a kind without a dedicated variant.
    #[must_use]
    pub fn custom(kind: impl Into<String>) -> Self {
        Self::Custom {
            kind: kind.into(),
            data: Map::new(),
        }
    }

    /// Type key stored in the kind discriminant column.
    #[must_use]
    pub fn kind_key(&self) -> &str {
        match self {
            Self::RichTextBlock { .. } => Self::RICH_TEXT,
            Self::CarouselBlock => Self::CAROUSEL,
            Self::Custom { kind, .. } => kind,
        }
    }
}

impl Serialize for BlockPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("kind", self.kind_key())?;
        match self {
            Self::RichTextBlock { content } => map.serialize_entry("content", content)?,
            Self::CarouselBlock => {}
            Self::Custom { data, .. } => {
                for (field, value) in data.iter().filter(|(field, _)| *field != "kind") {
                    map.serialize_entry(field, value)?;
                }
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BlockPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut data = Map::deserialize(deserializer)?;
        let kind = match data.remove("kind") {
            Some(Value::String(kind)) => kind,
            Some(other) => {
                return Err(de::Error::custom(format!("invalid block kind: {other}")));
            }
            None => return Err(de::Error::missing_field("kind")),
        };
        match kind.as_str() {
            Self::RICH_TEXT => {
                let content = match data.remove("content") {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(content)) => content,
                    Some(other) => {
                        return Err(de::Error::custom(format!("invalid rich text content: {other}")));
                    }
                };
                Ok(Self::RichTextBlock { content })
            }
            Self::CAROUSEL => Ok(Self::CarouselBlock),
            _ => Ok(Self::Custom { kind, data }),
        }
    }
}

/// One unit of authored content, inside a section or static by key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: BlockId,
    /// Owning section (`None` for static blocks).
    pub section_id: Option<SectionId>,
    /// Hidden from visitors without being deleted.
    pub disabled: bool,
    /// Key of a static block.
    pub key: Option<String>,
    /// URL where a static block was first requested.
    pub static_location: Option<String>,
    /// Position within the owning section.
    pub position: i64,
    pub payload: BlockPayload,
}

impl ContentBlock {
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.section_id.is_none()
    }

    #[must_use]
    pub fn kind_key(&self) -> &str {
        self.payload.kind_key()
    }
}

/// Values for a block that has not been stored yet.
///
/// The store appends new blocks after the existing ones of the same section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBlock {
    pub section_id: Option<SectionId>,
    pub disabled: bool,
    pub key: Option<String>,
    pub static_location: Option<String>,
    pub payload: BlockPayload,
}

/// Standalone text fragment embedded in a template by identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blurb {
    pub id: BlurbId,
    /// Globally unique identifier used by templates.
    pub identifier: Option<String>,
    pub label: Option<String>,
    /// `None` means never authored; `Some("")` means intentionally blank.
    pub content: Option<String>,
    /// Edited as plain text rather than rich text.
    pub plain_text: bool,
    /// Page the blurb was last seen on or edited from.
    pub last_known_location: Option<String>,
}

impl Blurb {
    /// Content was explicitly set to the empty string.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.content.as_deref() == Some("")
    }

    /// Content has been set at least once (possibly to the empty string).
    #[must_use]
    pub fn is_authored(&self) -> bool {
        self.content.is_some()
    }

    /// Label, else identifier, else a generated name.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(self.label.as_deref(), self.identifier.as_deref(), self.id.0)
    }

    /// DOM id of the rendered blurb.
    #[must_use]
    pub fn html_id(&self) -> String {
        format!("dt-content-blurb-{}", self.id)
    }

    /// Link to the blurb on the page it was last seen on, or empty.
    #[must_use]
    pub fn href(&self) -> String {
        anchor_href(self.last_known_location.as_deref(), &self.html_id())
    }
}

/// Values for a blurb that has not been stored yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewBlurb {
    pub identifier: Option<String>,
    pub label: Option<String>,
    pub content: Option<String>,
    pub plain_text: bool,
    pub last_known_location: Option<String>,
}

/// Standalone image fragment embedded in a template by identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBlurb {
    pub id: ImageBlurbId,
    pub identifier: Option<String>,
    pub label: Option<String>,
    /// URL of the uploaded image.
    pub image: Option<String>,
    /// Path of a static placeholder image, relative to the static URL.
    pub placeholder: Option<String>,
    pub last_known_location: Option<String>,
}

impl ImageBlurb {
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(self.label.as_deref(), self.identifier.as_deref(), self.id.0)
    }

    /// Image URL, falling back to the placeholder under `static_url`.
    #[must_use]
    pub fn src(&self, static_url: &str) -> Option<String> {
        if let Some(image) = &self.image {
            return Some(image.clone());
        }
        self.placeholder.as_ref().map(|placeholder| {
            format!(
                "{}/{}",
                static_url.trim_end_matches('/'),
                placeholder.trim_start_matches('/')
            )
        })
    }

    #[must_use]
    pub fn html_id(&self) -> String {
        format!("dt-content-image-blurb-{}", self.id)
    }

    #[must_use]
    pub fn href(&self) -> String {
        anchor_href(self.last_known_location.as_deref(), &self.html_id())
    }
}

/// Values for an image blurb that has not been stored yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewImageBlurb {
    pub identifier: Option<String>,
    pub label: Option<String>,
    pub image: Option<String>,
    pub placeholder: Option<String>,
    pub last_known_location: Option<String>,
}

fn display_name(label: Option<&str>, identifier: Option<&str>, id: i64) -> String {
    match (label, identifier) {
        (Some(label), _) if !label.is_empty() => label.to_owned(),
        (_, Some(identifier)) if !identifier.is_empty() => identifier.to_owned(),
        _ => format!("Unnamed Blurb ({id})"),
    }
}

fn anchor_href(location: Option<&str>, html_id: &str) -> String {
    match location {
        Some(location) if !location.is_empty() => format!("{location}#{html_id}"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blurb(content: Option<&str>) -> Blurb {
        Blurb {
            id: BlurbId(7),
            identifier: Some("home/intro".to_owned()),
            label: None,
            content: content.map(str::to_owned),
            plain_text: false,
            last_known_location: None,
        }
    }

    #[test]
    fn test_unauthored_blurb_is_not_blank() {
        let unauthored = blurb(None);
        let blank = blurb(Some(""));

        assert!(!unauthored.is_blank());
        assert!(!unauthored.is_authored());
        assert!(blank.is_blank());
        assert!(blank.is_authored());
    }

    #[test]
    fn test_blurb_display_name_fallbacks() {
        let mut b = blurb(None);
        assert_eq!(b.display_name(), "home/intro");

        b.label = Some("Intro".to_owned());
        assert_eq!(b.display_name(), "Intro");

        b.label = None;
        b.identifier = None;
        assert_eq!(b.display_name(), "Unnamed Blurb (7)");
    }

    #[test]
    fn test_blurb_href() {
        let mut b = blurb(Some("hi"));
        assert_eq!(b.href(), "");

        b.last_known_location = Some("/about".to_owned());
        assert_eq!(b.href(), "/about#dt-content-blurb-7");
    }

    #[test]
    fn test_image_blurb_src_prefers_image() {
        let mut ib = ImageBlurb {
            id: ImageBlurbId(3),
            identifier: Some("home:hero".to_owned()),
            label: None,
            image: None,
            placeholder: None,
            last_known_location: None,
        };
        assert_eq!(ib.src("/static"), None);

        ib.placeholder = Some("img/hero.png".to_owned());
        assert_eq!(ib.src("/static/").as_deref(), Some("/static/img/hero.png"));

        ib.image = Some("/media/image_blurbs/hero.jpg".to_owned());
        assert_eq!(
            ib.src("/static").as_deref(),
            Some("/media/image_blurbs/hero.jpg")
        );
    }

    #[test]
    fn test_block_payload_kind_tag() {
        let payload = BlockPayload::RichTextBlock {
            content: "<p>Hi</p>".to_owned(),
        };
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["kind"], payload.kind_key());
        assert_eq!(json["content"], "<p>Hi</p>");

        let carousel: BlockPayload =
            serde_json::from_str(r#"{"kind":"carousel_block"}"#).unwrap();
        assert_eq!(carousel, BlockPayload::CarouselBlock);
    }

    #[test]
    fn test_unknown_kind_keeps_its_fields() {
        let payload: BlockPayload =
            serde_json::from_str(r#"{"kind":"video_block","url":"https://example.com/v.mp4"}"#)
                .unwrap();

        assert_eq!(payload.kind_key(), "video_block");
        let BlockPayload::Custom { data, .. } = &payload else {
            panic!("expected a custom payload, got {payload:?}");
        };
        assert_eq!(data["url"], "https://example.com/v.mp4");
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"kind": "video_block", "url": "https://example.com/v.mp4"})
        );
    }

    #[test]
    fn test_payload_without_kind_is_rejected() {
        let err = serde_json::from_str::<BlockPayload>(r#"{"content":"x"}"#).unwrap_err();

        assert!(err.to_string().contains("kind"), "{err}");
    }
}
