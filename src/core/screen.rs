//! Screen lifetime handling for remote calls.
//!
//! A [`ScreenScope`] owns a cancellation token. Calls issued through
//! [`ScreenScope::run`] race against it, so once the screen is torn down any
//! response still in flight resolves to [`QsineError::Cancelled`] and is never
//! applied. [`ScreenState`] is what a screen keeps after the call resolves:
//! failures become local state instead of propagating.

use crate::utils::error::{ErrorCategory, QsineError, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct ScreenScope {
    name: &'static str,
    token: CancellationToken,
}

impl ScreenScope {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            token: CancellationToken::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.token.is_cancelled() {
            return Err(QsineError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                tracing::debug!("Discarding response for closed screen {}", self.name);
                Err(QsineError::Cancelled)
            }
            result = fut => {
                // 畫面在等待期間被關掉也一樣丟棄
                if self.token.is_cancelled() {
                    Err(QsineError::Cancelled)
                } else {
                    result
                }
            }
        }
    }

    pub fn close(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!("Closing screen {}", self.name);
            self.token.cancel();
        }
    }
}

impl Drop for ScreenScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenState<T> {
    Loading,
    Loaded(T),
    NotFound(String),
    Failed(String),
}

impl<T> ScreenState<T> {
    /// `Cancelled` keeps the screen loading: the result belongs to nobody.
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Loaded(value),
            Err(QsineError::Cancelled) => Self::Loading,
            Err(e) if e.category() == ErrorCategory::NotFound => {
                Self::NotFound(e.user_friendly_message())
            }
            Err(e) => {
                tracing::error!("Screen request failed: {}", e);
                Self::Failed(e.user_friendly_message())
            }
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::NotFound(message) | Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}
