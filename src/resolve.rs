//! Response Resolver
//!
//! Fans a single outcome out to the caller's callbacks and the call's return
//! value. A [`Settlement`] owns everything a call needs to report back and is
//! consumed by [`Settlement::settle`], so a call settles at most once.

use serde_json::Value;
use tracing::debug;

use crate::dispatch::SyncResponse;
use crate::error::{Result, SyncError};
use crate::options::{
    CompleteCallback, Completion, ErrorCallback, ResponseInfo, SuccessCallback, SyncOptions,
};

// == Resolver State ==
/// Where a call is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Idle,
    CacheCheck,
    CacheHit,
    CacheMiss,
    Sending,
    Resolved,
    Rejected,
}

impl ResolverState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ResolverState::Resolved | ResolverState::Rejected)
    }

    /// Whether `next` is a legal successor of `self`.
    fn allows(self, next: ResolverState) -> bool {
        use ResolverState::*;
        matches!(
            (self, next),
            (Idle, CacheCheck)
                | (Idle, Sending)
                | (CacheCheck, CacheHit)
                | (CacheCheck, CacheMiss)
                | (CacheMiss, Sending)
                | (Idle | CacheCheck | CacheHit | Sending, Resolved)
                | (Idle | CacheCheck | Sending, Rejected)
        )
    }
}

// == Outcome ==
/// The single result a call resolves with.
#[derive(Debug)]
pub enum Outcome {
    Success { response: SyncResponse, cached: bool },
    Failure(SyncError),
}

// == Settlement ==
/// Call-scoped resolver holding the callbacks taken from the options.
pub struct Settlement {
    state: ResolverState,
    success: Option<SuccessCallback>,
    error: Option<ErrorCallback>,
    complete: Option<CompleteCallback>,
}

impl Settlement {
    /// Takes the callbacks out of `options`; they are dropped with the settlement.
    pub fn new(options: &mut SyncOptions) -> Self {
        Self {
            state: ResolverState::Idle,
            success: options.success.take(),
            error: options.error.take(),
            complete: options.complete.take(),
        }
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }

    /// Moves to `next`, logging the transition.
    pub fn transition(&mut self, next: ResolverState) {
        debug_assert!(
            self.state.allows(next),
            "illegal resolver transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!(from = ?self.state, to = ?next, "resolver transition");
        self.state = next;
    }

    /// Delivers `outcome` to the callbacks and returns it as the call's result.
    ///
    /// Success runs `success` then `complete`, and records the response headers
    /// on `options`. Failure runs `error` then `complete`.
    pub fn settle(mut self, outcome: Outcome, options: &mut SyncOptions) -> Result<Value> {
        match outcome {
            Outcome::Success { response, cached } => {
                self.transition(ResolverState::Resolved);
                let SyncResponse { body, headers } = response;
                options.response = Some(ResponseInfo { headers, cached });

                if let Some(success) = self.success.take() {
                    success(&body);
                }
                if let Some(complete) = self.complete.take() {
                    complete(Completion::Success(&body));
                }
                Ok(body)
            }
            Outcome::Failure(err) => {
                self.transition(ResolverState::Rejected);
                debug!(error = %err, "call rejected");

                if let Some(error) = self.error.take() {
                    error(&err);
                }
                if let Some(complete) = self.complete.take() {
                    complete(Completion::Failure(&err));
                }
                Err(err)
            }
        }
    }
}
