//! Paged collection listing.
//!
//! Collection endpoints answer with a `{"value": [...], "nextLink": "..."}`
//! envelope. [`ListingIterator`] walks the pages in order. It is restartable:
//! a failed page can be fetched again, and the [`continuation`] of one
//! iterator can seed another through [`ListingIterator::resume`].
//!
//! [`continuation`]: ListingIterator::continuation

use std::collections::HashSet;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::clients::{decode_response, into_typed, ArmError};
use crate::rest::ResourceClient;

/// One page of a collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    /// The decoded elements, in server order.
    pub items: Vec<T>,
    /// The URL of the next page, if any.
    pub next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    value: Option<Vec<Value>>,
    #[serde(default, rename = "nextLink")]
    next_link: Option<String>,
}

/// A restartable, finite sequence of collection pages.
///
/// # Example
///
/// ```rust,ignore
/// use azure_arm::rest::ListingIterator;
///
/// let mut pages = client.list_pages::<serde_json::Value>("Microsoft.Compute/disks")?;
/// while let Some(page) = pages.next_page().await? {
///     for disk in page.items {
///         println!("{}", disk["name"]);
///     }
/// }
/// ```
pub struct ListingIterator<'a, T> {
    client: &'a ResourceClient,
    next_url: Option<String>,
    seen: HashSet<String>,
    pages: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: DeserializeOwned> ListingIterator<'a, T> {
    /// Starts listing at the first page URL.
    #[must_use]
    pub fn new(client: &'a ResourceClient, first_page_url: impl Into<String>) -> Self {
        Self {
            client,
            next_url: Some(first_page_url.into()),
            seen: HashSet::new(),
            pages: 0,
            _marker: PhantomData,
        }
    }

    /// Resumes listing from a continuation returned by another iterator.
    #[must_use]
    pub fn resume(client: &'a ResourceClient, continuation: impl Into<String>) -> Self {
        Self::new(client, continuation)
    }

    /// Returns the URL of the next page to fetch, if any.
    #[must_use]
    pub fn continuation(&self) -> Option<&str> {
        self.next_url.as_deref()
    }

    /// Returns `true` once every page has been fetched.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.next_url.is_none()
    }

    /// Returns the number of pages fetched so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Fetches the next page, or `None` once the listing is exhausted.
    ///
    /// On error the iterator is left unchanged, so the same page can be
    /// fetched again.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Decode`] if the envelope has no `value` array or
    /// if a `nextLink` repeats an already fetched page, plus any transport
    /// or decoding error of the request.
    pub async fn next_page(&mut self) -> Result<Option<Page<T>>, ArmError> {
        let Some(url) = self.next_url.clone() else {
            return Ok(None);
        };

        let response = self.client.transport().get(&url).await?;
        let status = response.code;
        let payload = decode_response(&url, &response)?;
        let envelope: Envelope = into_typed(status, payload)?;

        let values = envelope.value.ok_or_else(|| ArmError::Decode {
            status,
            message: "listing response has no 'value' array".to_string(),
        })?;
        let items: Vec<T> = into_typed(status, Value::Array(values))?;

        let next_link = envelope.next_link.filter(|link| !link.trim().is_empty());
        if let Some(link) = &next_link {
            if *link == url || self.seen.contains(link) {
                return Err(ArmError::Decode {
                    status,
                    message: format!("listing repeats page {link}"),
                });
            }
        }

        tracing::debug!(url = %url, items = items.len(), has_next = next_link.is_some(), "Fetched listing page");

        self.seen.insert(url);
        self.pages += 1;
        self.next_url.clone_from(&next_link);
        Ok(Some(Page { items, next_link }))
    }

    /// Fetches every remaining page and concatenates the elements in order.
    ///
    /// # Errors
    ///
    /// See [`next_page`](Self::next_page).
    pub async fn collect_all(mut self) -> Result<Vec<T>, ArmError> {
        let mut all = Vec::new();
        while let Some(page) = self.next_page().await? {
            all.extend(page.items);
        }
        Ok(all)
    }
}

impl<T> std::fmt::Debug for ListingIterator<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingIterator")
            .field("next_url", &self.next_url)
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenAuthorizer;
    use crate::config::ArmConfig;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ResourceClient {
        let config = ArmConfig::builder()
            .base_endpoint(server.uri())
            .build()
            .unwrap();
        ResourceClient::new(config, Arc::new(StaticTokenAuthorizer::new("t")), None).unwrap()
    }

    #[tokio::test]
    async fn test_pages_are_followed_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [1, 2],
                "nextLink": format!("{}/page2", server.uri())
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [3]})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let listing: ListingIterator<'_, u32> =
            ListingIterator::new(&client, format!("{}/page1", server.uri()));
        assert_eq!(listing.collect_all().await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_continuation_resumes_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": ["a"],
                "nextLink": format!("{}/page2", server.uri())
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": ["b"]})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut first: ListingIterator<'_, String> =
            ListingIterator::new(&client, format!("{}/page1", server.uri()));
        let page = first.next_page().await.unwrap().unwrap();
        assert_eq!(page.items, vec!["a".to_string()]);
        let continuation = first.continuation().unwrap().to_string();

        let mut resumed: ListingIterator<'_, String> =
            ListingIterator::resume(&client, continuation);
        let page = resumed.next_page().await.unwrap().unwrap();
        assert_eq!(page.items, vec!["b".to_string()]);
        assert!(resumed.next_page().await.unwrap().is_none());
        assert!(resumed.is_exhausted());
        assert_eq!(resumed.pages_fetched(), 1);
    }

    #[tokio::test]
    async fn test_repeated_next_link_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [],
                "nextLink": format!("{}/loop", server.uri())
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let listing: ListingIterator<'_, Value> =
            ListingIterator::new(&client, format!("{}/loop", server.uri()));
        assert!(matches!(
            listing.collect_all().await,
            Err(ArmError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_value_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/odd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut listing: ListingIterator<'_, Value> =
            ListingIterator::new(&client, format!("{}/odd", server.uri()));
        assert!(matches!(
            listing.next_page().await,
            Err(ArmError::Decode { .. })
        ));
        // The failed page is still pending.
        assert!(listing.continuation().is_some());
    }
}
