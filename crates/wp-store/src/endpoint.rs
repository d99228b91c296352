//! Blocking HTTP access to the plotting endpoint.
//!
//! Every request targets one URL; the action is selected with the `a`
//! parameter (`list`, `plot`, `newid`, `save`, `load`, ...).

use reqwest::blocking::{Client, Response};
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

use crate::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct Endpoint {
    client: Client,
    url: Url,
}

impl Endpoint {
    /// `timeout` of `None` waits for the server indefinitely.
    pub fn new(url: &str, timeout: Option<Duration>) -> StoreResult<Self> {
        let url = Url::parse(url).map_err(|e| StoreError::InvalidEndpoint {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL of an action with its parameters, e.g. for embedding a plot.
    pub fn action_url(&self, action: &str, params: &[(String, String)]) -> Url {
        let mut url = self.url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("a", action);
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        url
    }

    pub fn get(&self, action: &str, params: &[(String, String)]) -> StoreResult<String> {
        debug!(action, params = params.len(), "GET {}", self.url);
        let response = self
            .client
            .get(self.url.clone())
            .query(&[("a", action)])
            .query(params)
            .send()?;
        Self::body(response)
    }

    pub fn post_form(&self, action: &str, params: &[(String, String)]) -> StoreResult<String> {
        debug!(action, params = params.len(), "POST {}", self.url);
        let mut form: Vec<(&str, &str)> = vec![("a", action)];
        form.extend(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let response = self.client.post(self.url.clone()).form(&form).send()?;
        Self::body(response)
    }

    fn body(response: Response) -> StoreResult<String> {
        let status = response.status();
        let body = response.text()?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(StoreError::Server {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_url_encodes_parameters() {
        let endpoint = Endpoint::new("http://localhost:8080/webplot.py", None).unwrap();
        let url = endpoint.action_url(
            "png",
            &[
                ("x0".to_string(), "time".to_string()),
                ("c0".to_string(), "T_a > 0 & p < 1000".to_string()),
            ],
        );
        assert_eq!(url.path(), "/webplot.py");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("a".to_string(), "png".to_string()));
        assert_eq!(pairs[2].1, "T_a > 0 & p < 1000");
    }

    #[test]
    fn rejects_relative_urls() {
        assert!(matches!(
            Endpoint::new("webplot.py", None),
            Err(StoreError::InvalidEndpoint { .. })
        ));
    }
}
