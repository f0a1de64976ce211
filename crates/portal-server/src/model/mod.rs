use serde::Deserialize;

/// Body or query of a `/shorten/` request.
#[derive(Debug, Default, Deserialize)]
pub struct ShortenForm {
    pub url: Option<String>,
}

impl ShortenForm {
    /// Layers a form body over the query string; a field present in the body wins.
    pub fn merge(self, body: Option<ShortenForm>) -> Self {
        match body {
            Some(body) => Self {
                url: body.url.or(self.url),
            },
            None => self,
        }
    }

    /// The URL to shorten, if one was given and is not blank.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}
