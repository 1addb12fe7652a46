// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use residency_domain::LinkPolicy;

/// Default bound on optimistic-concurrency retries for idempotent ledger writes.
pub const DEFAULT_MAX_LINK_ATTEMPTS: u32 = 3;

/// Settings shared by every application service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// What linking a different form into an occupied slot does.
    ///
    /// Applied identically to all ten form kinds.
    pub link_policy: LinkPolicy,
    /// How many times an idempotent ledger write is attempted before giving up.
    pub max_link_attempts: u32,
}

impl ServiceConfig {
    /// Creates a configuration.
    ///
    /// A `max_link_attempts` of zero is raised to one.
    #[must_use]
    pub fn new(link_policy: LinkPolicy, max_link_attempts: u32) -> Self {
        Self {
            link_policy,
            max_link_attempts: max_link_attempts.max(1),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new(LinkPolicy::default(), DEFAULT_MAX_LINK_ATTEMPTS)
    }
}
