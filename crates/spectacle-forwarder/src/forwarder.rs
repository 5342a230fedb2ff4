//! The per-invocation pipeline.

use std::sync::Arc;

use spectacle_context::{build_context, resolve_cookie_domain, resolve_page_url};
use spectacle_identity::{CookieStore, IdentityResolver, RandomSource, ThreadRandom};
use spectacle_observe::{LogSettings, Logger};
use spectacle_types::{ContainerVersion, EventData, MethodType, RequestHeaders, TagConfig};

use crate::assemble::assemble;
use crate::consent::{consent_granted, is_measurement_probe};
use crate::dispatch::{DispatchOptions, Dispatcher};
use crate::error::ForwardError;
use crate::outcome::{Outcome, SkipReason};
use crate::transport::HttpTransport;

/// Everything the host supplies for one invocation.
pub struct Invocation<'a> {
    pub tag: &'a TagConfig,
    pub event: &'a EventData,
    pub headers: &'a RequestHeaders,
    /// The visitor's cookies; identity writes land here.
    pub cookies: &'a mut dyn CookieStore,
    pub container: ContainerVersion,
}

/// Runs invocations through consent, identity, context, assembly and
/// dispatch.
#[derive(Clone)]
pub struct Forwarder {
    dispatcher: Dispatcher,
    random: Arc<dyn RandomSource>,
}

impl Forwarder {
    pub fn new(transport: Arc<dyn HttpTransport>, logger: Logger) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport, logger),
            random: Arc::new(ThreadRandom),
        }
    }

    /// Replaces the random source used for new anonymous ids.
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Handles one invocation and returns its outcome.
    pub async fn handle(&self, invocation: Invocation<'_>) -> Outcome {
        let Invocation {
            tag,
            event,
            headers,
            cookies,
            container,
        } = invocation;

        if !consent_granted(tag, event) {
            tracing::debug!("ad storage consent not granted, skipping");
            return Outcome::Skipped(SkipReason::ConsentNotGranted);
        }

        let page_url = resolve_page_url(event, headers);
        if is_measurement_probe(page_url.as_deref()) {
            return Outcome::Skipped(SkipReason::MeasurementProbe);
        }

        let method: MethodType = match tag.method_type.parse() {
            Ok(method) => method,
            Err(e) => {
                tracing::warn!(method_type = %tag.method_type, "unknown method type");
                return ForwardError::UnknownMethod(e.0).into();
            }
        };

        let cookie_domain = resolve_cookie_domain(tag.cookie_domain.as_deref(), page_url.as_deref());
        tracing::debug!(%method, cookie_domain = %cookie_domain, "forwarding event");

        let payload = {
            let mut identity = IdentityResolver::new(cookies, self.random.as_ref(), cookie_domain);
            let context = build_context(event, headers);
            match assemble(method, tag, event, context, &mut identity) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!(%method, error = %e, "invocation rejected");
                    return e.into();
                }
            }
        };

        let options = DispatchOptions {
            base_url: tag.base_url.clone(),
            timeout: tag.request_timeout(),
            optimistic: tag.optimistic,
            log: LogSettings::resolve(tag, container, headers),
        };
        self.dispatcher.send(payload, options).await
    }
}
