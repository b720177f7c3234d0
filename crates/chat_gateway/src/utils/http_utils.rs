use std::error::Error;
use std::time::Instant;

use log::{debug, error, info};
use reqwest::{Client, Method, Response, Url};
use serde::Serialize;

use crate::error::{GatewayError, Result};

/// Sends one request and logs how it went. No retries.
pub async fn execute_request<T: Serialize + ?Sized>(
    client: &Client,
    method: Method,
    url: Url,
    json_body: Option<&T>,
) -> Result<Response> {
    let mut request_builder = client.request(method.clone(), url.clone());
    if let Some(body) = json_body {
        request_builder = request_builder.json(body);
    }

    info!("Sending {} request to {}", method.as_str(), url);
    let start_time = Instant::now();

    match request_builder.send().await {
        Ok(resp) => {
            info!(
                "Got response from {} after {:?} with status {}",
                url,
                start_time.elapsed(),
                resp.status()
            );
            debug!("Response headers: {:?}", resp.headers());
            Ok(resp)
        }
        Err(e) => {
            error!("Failed HTTP request to {}: {}", url, e);
            if let Some(source) = e.source() {
                error!("Error source: {:?}", source);
            }
            if e.is_timeout() {
                error!("Request timed out");
            }
            if e.is_connect() {
                error!("Connection error");
            }
            Err(GatewayError::Http(e))
        }
    }
}

/// Body text of a 2xx response; anything else becomes [`GatewayError::Status`].
pub async fn read_success_body(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        error!("Backend returned {}: {}", status, body);
        return Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}
