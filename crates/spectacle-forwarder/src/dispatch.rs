//! Sends assembled payloads and maps the response to an outcome.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use spectacle_observe::{LogRecord, LogSettings, Logger};
use spectacle_types::Payload;

use crate::error::ForwardError;
use crate::outcome::Outcome;
use crate::transport::{HttpTransport, OutboundRequest};

const REQUEST_METHOD: &str = "POST";

/// Per-invocation dispatch settings.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub base_url: String,
    pub timeout: Duration,
    /// Report success as soon as the request is issued.
    pub optimistic: bool,
    pub log: LogSettings,
}

/// Posts payloads to the collection endpoint and logs both legs of the
/// exchange.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn HttpTransport>,
    logger: Logger,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn HttpTransport>, logger: Logger) -> Self {
        Self { transport, logger }
    }

    /// Sends `payload` to `{base_url}{endpoint}`.
    ///
    /// In optimistic mode the exchange runs on a background task and
    /// [`Outcome::Dispatched`] is returned immediately; the response is
    /// still logged when it arrives.
    pub async fn send(&self, payload: Payload, options: DispatchOptions) -> Outcome {
        let event_name = payload.method.as_str();
        let url = format!("{}{}", options.base_url, payload.method.endpoint());

        let (body, logged_body) = match serialize(&payload) {
            Ok(serialized) => serialized,
            Err(e) => return Outcome::Failed(e),
        };

        self.logger
            .log(
                &options.log,
                LogRecord::request(event_name, REQUEST_METHOD, &url, logged_body),
            )
            .await;

        let request = OutboundRequest {
            url,
            headers: vec![
                ("Content-Type".to_string(), "text/plain".to_string()),
                ("User-Agent".to_string(), payload.context.user_agent),
            ],
            body,
            timeout: options.timeout,
        };

        if options.optimistic {
            let transport = Arc::clone(&self.transport);
            let logger = self.logger.clone();
            let settings = options.log;
            tokio::spawn(async move {
                // outcome already logged inside `exchange`
                let _ = exchange(transport.as_ref(), &logger, &settings, event_name, request).await;
            });
            return Outcome::Dispatched;
        }

        match exchange(
            self.transport.as_ref(),
            &self.logger,
            &options.log,
            event_name,
            request,
        )
        .await
        {
            Ok(status) => Outcome::Delivered { status },
            Err(e) => Outcome::Failed(e),
        }
    }
}

/// The body sent on the wire and the same payload as a JSON value for the
/// request log record.
fn serialize(payload: &Payload) -> Result<(String, Value), ForwardError> {
    Ok((serde_json::to_string(payload)?, serde_json::to_value(payload)?))
}

async fn exchange(
    transport: &dyn HttpTransport,
    logger: &Logger,
    settings: &LogSettings,
    event_name: &'static str,
    request: OutboundRequest,
) -> Result<u16, ForwardError> {
    let url = request.url.clone();

    let response = match transport.post(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "spectacle request failed");
            logger
                .log(settings, LogRecord::failure(event_name, e.to_string()))
                .await;
            return Err(e.into());
        }
    };

    let status = response.status;
    let success = response.is_success();
    if !success {
        tracing::warn!(url = %url, status, body = %response.body, "spectacle error response");
    }

    logger
        .log(
            settings,
            LogRecord::response(
                event_name,
                status,
                Value::Object(response.headers),
                Value::String(response.body),
            ),
        )
        .await;

    if success {
        tracing::debug!(url = %url, status, "spectacle request delivered");
        Ok(status)
    } else {
        Err(ForwardError::Rejected { status })
    }
}
