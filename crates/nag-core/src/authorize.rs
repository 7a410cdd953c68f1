//! OAuth device authorization flow.
//!
//! The flow has two steps: obtain a device code and a user code, then poll
//! the token endpoint until the user approves, declines, or the code
//! expires. The provider dictates pacing: `authorization_pending` means try
//! again after the same interval, `slow_down` means the interval grows by
//! [`SLOW_DOWN_STEP`] seconds for the rest of the flow.
//!
//! Polling is modelled as a [`DeviceFlowState`] advanced one response at a
//! time, driven by [`DeviceAuthorizer::poll_for_token`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use nag_github::{AccessToken, DeviceAuthorization, DeviceFlowClient, TokenPoll};
use tracing::{debug, info};

use crate::error::Result;

/// Seconds added to the poll interval on every `slow_down`.
pub const SLOW_DOWN_STEP: u64 = 5;

/// The two device flow endpoints.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Request a fresh device code and user code.
    async fn request_device_code(&self) -> nag_github::Result<DeviceAuthorization>;

    /// Ask once whether `device_code` has been approved.
    async fn request_token(&self, device_code: &str) -> nag_github::Result<TokenPoll>;
}

#[async_trait]
impl TokenEndpoint for DeviceFlowClient {
    async fn request_device_code(&self) -> nag_github::Result<DeviceAuthorization> {
        Self::request_device_code(self).await
    }

    async fn request_token(&self, device_code: &str) -> nag_github::Result<TokenPoll> {
        Self::request_token(self, device_code).await
    }
}

/// Where a device flow stands.
#[derive(Debug)]
pub enum DeviceFlowState {
    /// No token request made yet.
    Pending {
        /// Seconds to wait before the first request.
        interval: u64,
    },
    /// At least one request made; the user has not decided yet.
    Polling {
        /// Seconds to wait before the next request.
        interval: u64,
    },
    /// The user approved.
    Resolved(AccessToken),
    /// The flow ended without a token.
    Failed(nag_github::Error),
}

impl DeviceFlowState {
    /// Initial state for a freshly issued device code.
    #[must_use]
    pub const fn start(authorization: &DeviceAuthorization) -> Self {
        Self::Pending {
            interval: authorization.interval,
        }
    }

    /// Wait before the next request, or `None` once terminal.
    #[must_use]
    pub const fn interval(&self) -> Option<Duration> {
        match self {
            Self::Pending { interval } | Self::Polling { interval } => {
                Some(Duration::from_secs(*interval))
            }
            Self::Resolved(_) | Self::Failed(_) => None,
        }
    }

    /// Whether the flow has finished.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Failed(_))
    }

    /// Apply the outcome of one token request.
    ///
    /// Terminal states ignore further outcomes.
    #[must_use]
    pub fn advance(self, outcome: nag_github::Result<TokenPoll>) -> Self {
        let interval = match self {
            Self::Pending { interval } | Self::Polling { interval } => interval,
            terminal @ (Self::Resolved(_) | Self::Failed(_)) => return terminal,
        };

        match outcome {
            Ok(TokenPoll::Granted(token)) => Self::Resolved(token),
            Ok(TokenPoll::Pending) => Self::Polling { interval },
            Ok(TokenPoll::SlowDown) => Self::Polling {
                interval: interval.saturating_add(SLOW_DOWN_STEP),
            },
            Ok(TokenPoll::Denied(reason)) => {
                Self::Failed(nag_github::Error::Authorization(reason))
            }
            Err(e) => Self::Failed(e),
        }
    }
}

/// Runs the device flow against a [`TokenEndpoint`].
#[derive(Debug)]
pub struct DeviceAuthorizer<E> {
    endpoint: E,
}

impl<E: TokenEndpoint> DeviceAuthorizer<E> {
    /// Create an authorizer over `endpoint`.
    pub const fn new(endpoint: E) -> Self {
        Self { endpoint }
    }

    /// Step one: request a device code and a user code.
    ///
    /// # Errors
    /// Returns the gateway error unchanged.
    pub async fn start_device_flow(&self) -> Result<DeviceAuthorization> {
        let authorization = self.endpoint.request_device_code().await?;
        debug!(
            interval = authorization.interval,
            expires_in = ?authorization.expires_in,
            "device code issued"
        );
        Ok(authorization)
    }

    /// Step two: poll until the flow resolves.
    ///
    /// Waits the current interval before every request. If `cancel`
    /// completes during a wait, returns `Ok(None)`; a request already on
    /// the wire is allowed to finish first.
    ///
    /// # Errors
    /// Returns [`nag_github::Error::Authorization`] when the provider ends
    /// the flow (expired code, denied access, unknown code) and any
    /// transport or decoding error from a request.
    pub async fn poll_for_token<C>(
        &self,
        authorization: &DeviceAuthorization,
        cancel: C,
    ) -> Result<Option<AccessToken>>
    where
        C: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        let mut state = DeviceFlowState::start(authorization);
        let mut attempt = 0_u32;

        loop {
            let interval = match state {
                DeviceFlowState::Pending { interval } | DeviceFlowState::Polling { interval } => {
                    interval
                }
                DeviceFlowState::Resolved(token) => {
                    info!(attempt, "device authorization granted");
                    return Ok(Some(token));
                }
                DeviceFlowState::Failed(e) => {
                    debug!(attempt, error = %e, "device authorization failed");
                    return Err(e.into());
                }
            };

            debug!(attempt = attempt + 1, interval, "waiting before token request");
            tokio::select! {
                biased;
                () = &mut cancel => {
                    info!(attempt, "device authorization cancelled");
                    return Ok(None);
                }
                () = tokio::time::sleep(Duration::from_secs(interval)) => {}
            }

            attempt += 1;
            let outcome = self.endpoint.request_token(&authorization.device_code).await;
            state = state.advance(outcome);
        }
    }
}
