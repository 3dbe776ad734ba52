use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;
use url::Url;

use crate::catalog::probe::{ExistenceProbe, Verification};

const IMAGE_DIR: &str = "images";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLocation {
    pub url: String,
    pub verification: Verification,
}

/// Derives image URLs under `<base>/images/<pack>/<file>` and checks them with a probe.
pub struct ImageLocator<'a> {
    base: &'a Url,
    probe: &'a dyn ExistenceProbe,
}

impl<'a> ImageLocator<'a> {
    pub fn new(base: &'a Url, probe: &'a dyn ExistenceProbe) -> Self {
        Self { base, probe }
    }

    /// Always yields a location. A failed or unavailable probe only marks it unverified.
    pub fn resolve(&self, pack_title: Option<&str>, file_name: Option<&str>) -> ImageLocation {
        let relative = relative_image_path(
            pack_title.unwrap_or_default(),
            file_name.unwrap_or_default(),
        );

        match self.base.join(&relative) {
            Ok(url) => {
                let verification = self.probe.probe(&url);
                ImageLocation {
                    url: url.into(),
                    verification,
                }
            }
            Err(_) => ImageLocation {
                url: relative,
                verification: Verification::Unverified,
            },
        }
    }
}

/// Canonical composed form, so composed and decomposed names converge.
pub fn normalize(text: &str) -> String {
    text.nfc().collect()
}

/// `images/<pack>/<file>` with every path segment percent-encoded and `/` kept as separator.
pub fn relative_image_path(pack_title: &str, file_name: &str) -> String {
    let joined = format!("{}/{}/{}", IMAGE_DIR, normalize(pack_title), normalize(file_name));
    joined
        .split('/')
        .map(urlencoding::encode)
        .collect::<Vec<Cow<'_, str>>>()
        .join("/")
}

/// Human-readable form of an image URL, or the URL itself if it does not decode.
pub fn display_path(url: &str) -> String {
    match urlencoding::decode(url) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => url.to_string(),
    }
}
