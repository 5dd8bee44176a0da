//! Share links: self-contained project links and social intent URLs.
//!
//! Links are generated only; nothing is sent and no response is awaited.

use crate::model::project::{Project, ProjectDocument};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::error::Error;
use std::fmt::{Display, Formatter};
use url::{form_urlencoded, Url};

const SHARE_PATH: &str = "shared";
const SHARE_DATA_PARAM: &str = "data";
const TWITTER_INTENT: &str = "https://twitter.com/intent/tweet";
const LINKEDIN_SHARE: &str = "https://www.linkedin.com/sharing/share-offsite/";

#[derive(Debug)]
pub enum ShareError {
    InvalidUrl(url::ParseError),
    MissingData,
    Base64(base64::DecodeError),
    Json(serde_json::Error),
}

impl Display for ShareError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl(err) => write!(f, "invalid url: {err}"),
            Self::MissingData => write!(f, "share link carries no project data"),
            Self::Base64(err) => write!(f, "share data is not base64: {err}"),
            Self::Json(err) => write!(f, "share data is not a project: {err}"),
        }
    }
}

impl Error for ShareError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidUrl(err) => Some(err),
            Self::Base64(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::MissingData => None,
        }
    }
}

impl From<url::ParseError> for ShareError {
    fn from(value: url::ParseError) -> Self {
        Self::InvalidUrl(value)
    }
}

impl From<base64::DecodeError> for ShareError {
    fn from(value: base64::DecodeError) -> Self {
        Self::Base64(value)
    }
}

impl From<serde_json::Error> for ShareError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// `{origin}/shared?data=<base64 project json>`.
pub fn share_link(project: &Project, origin: &str) -> Result<String, ShareError> {
    let encoded = STANDARD.encode(serde_json::to_vec(project)?);
    let mut url = Url::parse(origin)?.join(SHARE_PATH)?;
    url.query_pairs_mut().append_pair(SHARE_DATA_PARAM, &encoded);
    Ok(url.into())
}

/// Decodes the project embedded in a share link, ready for import.
pub fn decode_share_link(link: &str) -> Result<ProjectDocument, ShareError> {
    let url = Url::parse(link)?;
    let data = url
        .query_pairs()
        .find(|(key, _)| key == SHARE_DATA_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or(ShareError::MissingData)?;
    let bytes = STANDARD.decode(data.as_bytes())?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// `mailto:` link with a summary of the project.
pub fn email_link(project: &Project) -> String {
    let subject = format!("System Design: {}", project.name);
    let body = format!(
        "Check out this system design:\n\n{}\n\nComponents: {}\nConnections: {}",
        project.description,
        project.nodes.len(),
        project.edges.len()
    );
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("subject", &subject)
        .append_pair("body", &body)
        .finish()
        // Mail clients read `+` literally; a literal plus is already `%2B`.
        .replace('+', "%20");
    format!("mailto:?{query}")
}

pub fn twitter_intent(project: &Project) -> Result<String, ShareError> {
    let text = format!(
        "Check out my system design: {} - Built with {}",
        project.name,
        super::PRODUCT_NAME
    );
    Ok(Url::parse_with_params(TWITTER_INTENT, &[("text", text)])?.into())
}

/// LinkedIn share intent for `page_url`.
pub fn linkedin_intent(project: &Project, page_url: &str) -> Result<String, ShareError> {
    let title = format!("I just created a system design: {}", project.name);
    Ok(Url::parse_with_params(LINKEDIN_SHARE, &[("url", page_url), ("title", title.as_str())])?.into())
}

#[cfg(test)]
mod tests {
    use super::{decode_share_link, email_link, share_link, twitter_intent, ShareError};
    use crate::catalog::create_node;
    use crate::model::node::Position;
    use crate::model::project::Project;
    use chrono::Utc;

    #[test]
    fn share_link_roundtrips_graph() {
        let mut project = Project::new("Shared + Saved", "d", Utc::now());
        project.nodes = vec![create_node("cdn", Position::new(1.0, 2.0)).expect("cdn")];

        let link = share_link(&project, "https://sketch.example.com").expect("link");
        assert!(link.starts_with("https://sketch.example.com/shared?data="));

        let document = decode_share_link(&link).expect("decode");
        assert_eq!(document.name, "Shared + Saved");
        assert_eq!(document.nodes, project.nodes);
    }

    #[test]
    fn link_without_data_is_rejected() {
        assert!(matches!(
            decode_share_link("https://sketch.example.com/shared"),
            Err(ShareError::MissingData)
        ));
        assert!(matches!(
            share_link(&Project::new("x", "", Utc::now()), "not a url"),
            Err(ShareError::InvalidUrl(_))
        ));
    }

    #[test]
    fn email_link_uses_percent_twenty_for_spaces() {
        let project = Project::new("A+B", "", Utc::now());
        let link = email_link(&project);
        assert!(link.starts_with("mailto:?subject=System%20Design%3A%20A%2BB&body="));
        assert!(!link.contains('+'));
    }

    #[test]
    fn twitter_intent_embeds_name() {
        let project = Project::new("Edge", "", Utc::now());
        let intent = twitter_intent(&project).expect("intent");
        assert!(intent.starts_with("https://twitter.com/intent/tweet?text="));
        assert!(intent.contains("Edge"));
    }
}
