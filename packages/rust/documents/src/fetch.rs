//! HTTP retrieval of response sheets.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use gatecalc_shared::{FetchOptions, GateCalcError, Result};

/// Build a reqwest client from the fetch options.
pub fn build_client(opts: &FetchOptions) -> Result<Client> {
    Client::builder()
        .user_agent(opts.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::limited(opts.max_redirects))
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| GateCalcError::Network(format!("failed to build HTTP client: {e}")))
}

/// GET `url` and return the body. Any non-2xx status is an error.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_text(url: &Url, opts: &FetchOptions) -> Result<String> {
    let client = build_client(opts)?;
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| GateCalcError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(GateCalcError::Network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| GateCalcError::Network(format!("{url}: failed to read body: {e}")))?;

    debug!(bytes = body.len(), "response sheet fetched");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{p}", server.uri())).expect("mock url")
    }

    #[tokio::test]
    async fn fetches_with_configured_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sheet.html"))
            .and(header("user-agent", "Mozilla/5.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let body = fetch_text(&url(&server, "/sheet.html"), &FetchOptions::default())
            .await
            .expect("fetch");
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", format!("{}/new", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
            .mount(&server)
            .await;

        let body = fetch_text(&url(&server, "/old"), &FetchOptions::default())
            .await
            .expect("fetch");
        assert_eq!(body, "moved");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetch_text(&url(&server, "/gone"), &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GateCalcError::Network(ref msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn redirect_limit_is_enforced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", format!("{}/loop", server.uri())),
            )
            .mount(&server)
            .await;

        let opts = FetchOptions {
            max_redirects: 2,
            ..FetchOptions::default()
        };
        assert!(fetch_text(&url(&server, "/loop"), &opts).await.is_err());
    }
}
