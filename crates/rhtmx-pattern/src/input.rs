/// URL inputs accepted by matching functions
///
/// Absolute URLs are parsed as-is; paths such as `/users/42?tab=posts`
/// resolve against `http://localhost/`. Input that cannot be parsed simply
/// never matches.
use std::borrow::Cow;

use once_cell::sync::Lazy;
use url::Url;

static BASE_URL: Lazy<Option<Url>> = Lazy::new(|| Url::parse("http://localhost/").ok());

/// Anything that can be viewed as a parsed [`Url`]
pub trait UrlInput {
    fn to_url(&self) -> Option<Cow<'_, Url>>;
}

impl UrlInput for Url {
    fn to_url(&self) -> Option<Cow<'_, Url>> {
        Some(Cow::Borrowed(self))
    }
}

impl UrlInput for str {
    /// # Examples
    ///
    /// ```
    /// use rhtmx_pattern::UrlInput;
    ///
    /// let url = "/docs/intro?lang=en".to_url().unwrap();
    /// assert_eq!(url.host_str(), Some("localhost"));
    /// assert_eq!(url.path(), "/docs/intro");
    /// assert_eq!(url.query(), Some("lang=en"));
    ///
    /// assert!("http://[broken".to_url().is_none());
    /// ```
    fn to_url(&self) -> Option<Cow<'_, Url>> {
        match Url::parse(self) {
            Ok(url) => Some(Cow::Owned(url)),
            Err(url::ParseError::RelativeUrlWithoutBase) => BASE_URL
                .as_ref()
                .and_then(|base| base.join(self).ok())
                .map(Cow::Owned),
            Err(err) => {
                tracing::trace!("ignoring unparseable url {:?}: {}", self, err);
                None
            }
        }
    }
}

impl UrlInput for String {
    fn to_url(&self) -> Option<Cow<'_, Url>> {
        self.as_str().to_url()
    }
}

impl<T: UrlInput + ?Sized> UrlInput for &T {
    fn to_url(&self) -> Option<Cow<'_, Url>> {
        (**self).to_url()
    }
}
