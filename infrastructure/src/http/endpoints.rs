//! Webhook and poll URL handling.
//!
//! The generator is configured with a single webhook URL. Runs started
//! through it are polled on the same host under [`POLL_PATH`], carrying the
//! `user_id` and `api_key` query parameters of the webhook forward.

use blueprint_application::GatewayError;
use reqwest::Url;

/// Path of the run status endpoint.
pub const POLL_PATH: &str = "/api/v1/get_pl_run";

/// A parsed webhook URL and the poll endpoint derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEndpoint {
    webhook: Url,
    poll_base: Url,
    user_id: Option<String>,
    api_key: Option<String>,
}

impl WebhookEndpoint {
    /// Parse `webhook`; `poll_base` overrides the scheme and host used for polls.
    pub fn parse(webhook: &str, poll_base: Option<&str>) -> Result<Self, GatewayError> {
        let webhook = parse_http(webhook)?;
        let poll_base = match poll_base {
            Some(base) => parse_http(base)?,
            None => webhook.clone(),
        };

        let param = |name: &str| {
            webhook
                .query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
                .filter(|value| !value.trim().is_empty())
        };
        let user_id = param("user_id");
        let api_key = param("api_key");

        Ok(Self {
            webhook,
            poll_base,
            user_id,
            api_key,
        })
    }

    pub fn webhook(&self) -> &Url {
        &self.webhook
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Status URL for a run: `<poll base>/api/v1/get_pl_run?run_id=..[&user_id=..][&api_key=..]`.
    pub fn poll_url(&self, run_id: &str) -> Url {
        let mut url = self.poll_base.clone();
        url.set_path(POLL_PATH);
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("run_id", run_id);
            if let Some(user_id) = &self.user_id {
                query.append_pair("user_id", user_id);
            }
            if let Some(api_key) = &self.api_key {
                query.append_pair("api_key", api_key);
            }
        }
        url
    }
}

/// Parse an absolute http(s) URL.
pub fn parse_http(value: &str) -> Result<Url, GatewayError> {
    let url = Url::parse(value.trim()).map_err(|e| GatewayError::InvalidUrl(format!("{value}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(GatewayError::InvalidUrl(value.to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_url_carries_auth_params() {
        let endpoint = WebhookEndpoint::parse(
            "https://api.example.com/api/v1/start_pipeline?user_id=u%201&api_key=secret&saved_item_id=x",
            None,
        )
        .unwrap();
        assert_eq!(endpoint.api_key(), Some("secret"));
        assert_eq!(
            endpoint.poll_url("run-9").as_str(),
            "https://api.example.com/api/v1/get_pl_run?run_id=run-9&user_id=u+1&api_key=secret"
        );
    }

    #[test]
    fn test_poll_url_without_params() {
        let endpoint = WebhookEndpoint::parse("http://localhost:8080/hook#frag", None).unwrap();
        assert_eq!(endpoint.api_key(), None);
        assert_eq!(
            endpoint.poll_url("abc").as_str(),
            "http://localhost:8080/api/v1/get_pl_run?run_id=abc"
        );
    }

    #[test]
    fn test_blank_params_are_dropped() {
        let endpoint =
            WebhookEndpoint::parse("https://hooks.example.com/h?user_id=&api_key=%20", None)
                .unwrap();
        assert_eq!(endpoint.api_key(), None);
        assert_eq!(
            endpoint.poll_url("r").as_str(),
            "https://hooks.example.com/api/v1/get_pl_run?run_id=r"
        );
    }

    #[test]
    fn test_poll_base_override() {
        let endpoint = WebhookEndpoint::parse(
            "https://hooks.example.com/h?api_key=k",
            Some("https://api.example.com/ignored/path"),
        )
        .unwrap();
        assert_eq!(
            endpoint.poll_url("r").as_str(),
            "https://api.example.com/api/v1/get_pl_run?run_id=r&api_key=k"
        );
    }

    #[test]
    fn test_rejects_non_http() {
        assert!(WebhookEndpoint::parse("ftp://example.com/x", None).is_err());
        assert!(WebhookEndpoint::parse("not a url", None).is_err());
        assert!(WebhookEndpoint::parse("https://example.com", Some("mailto:a@b")).is_err());
    }
}
