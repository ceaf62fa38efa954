use reqwest::Url;
use serde_json::Value;

use crate::error::{Error, Result};

const NEXT_LINK_ANNOTATION: &str = "@odata.nextLink";

/// One page of a collection response.
#[derive(Debug, Default)]
pub struct Page {
    pub items: Vec<Value>,
    /// Opaque link to the next page; `None` on the final page.
    pub next_link: Option<String>,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.next_link.is_none()
    }
}

/// Parse an OData collection response (`{"value": [...], "@odata.nextLink": ...}`).
pub(crate) fn parse_page(json: Value) -> Result<Page> {
    let Value::Object(mut response_object) = json else {
        return Err(Error::Decode("collection response is not an object".to_string()));
    };

    let items = match response_object.remove("value") {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(Error::Decode(
                "collection response has no 'value' array".to_string(),
            ));
        }
    };

    Ok(Page {
        items,
        next_link: extract_next_link(&response_object),
    })
}

/// An empty link is treated like a missing one.
fn extract_next_link(response: &serde_json::Map<String, Value>) -> Option<String> {
    response
        .get(NEXT_LINK_ANNOTATION)
        .and_then(|value| value.as_str())
        .filter(|link| !link.trim().is_empty())
        .map(str::to_string)
}

/// Target of a continuation link. Absolute links are returned verbatim;
/// relative ones resolve against the URL of the page that carried them.
pub(crate) fn resolve_link(page_url: &str, link: &str) -> Result<String> {
    if Url::parse(link).is_ok() {
        return Ok(link.to_string());
    }
    Url::parse(page_url)
        .and_then(|base| base.join(link))
        .map(String::from)
        .map_err(|e| Error::Decode(format!("cannot resolve next link '{link}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn next_link_is_kept_verbatim() {
        let link = "https://graph.microsoft.com/v1.0/solutions/bookingBusinesses\
                    ?$skiptoken=RFNwdAIAAQAAAA%3d%3d";
        let page = parse_page(json!({
            "value": [{ "id": "a" }, { "id": "b" }],
            "@odata.nextLink": link
        }))
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_link.as_deref(), Some(link));
        assert!(!page.is_last());
    }

    #[test]
    fn missing_or_empty_link_marks_last_page() {
        let page = parse_page(json!({ "value": [] })).unwrap();
        assert!(page.is_last());

        let page = parse_page(json!({ "value": [], "@odata.nextLink": "" })).unwrap();
        assert!(page.is_last());
    }

    #[test]
    fn malformed_collections_are_decode_errors() {
        assert!(matches!(parse_page(json!([1, 2])), Err(Error::Decode(_))));
        assert!(matches!(parse_page(json!({ "items": [] })), Err(Error::Decode(_))));
        assert!(matches!(parse_page(json!({ "value": {} })), Err(Error::Decode(_))));
    }

    #[test]
    fn relative_links_resolve_against_the_page_url() {
        let page = "https://graph.microsoft.com/v1.0/businesses/b1/appointments";
        assert_eq!(
            resolve_link(page, "/v1.0/businesses?$skiptoken=abc").unwrap(),
            "https://graph.microsoft.com/v1.0/businesses?$skiptoken=abc"
        );
        assert_eq!(
            resolve_link(page, "appointments?$skiptoken=abc").unwrap(),
            "https://graph.microsoft.com/v1.0/businesses/b1/appointments?$skiptoken=abc"
        );
    }

    #[test]
    fn absolute_links_are_not_rewritten() {
        let link = "https://other.example/v1.0/x?$skiptoken=abc%3D%3D";
        assert_eq!(resolve_link("https://graph.microsoft.com/v1.0/x", link).unwrap(), link);
    }
}
