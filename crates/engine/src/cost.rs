// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cost Guard (spec §4.7): per-user admission control ahead of any
//! LLM-invoking handler, plus the accumulation step that follows a
//! successful call.

use doc_core::{DocError, DocResult, UserId};

use crate::ctx::EngineCtx;

/// Check the user's accumulated cost against the configured ceiling.
/// `user_id` of `None` (anonymous/demo callers) always passes — the ceiling
/// only ever applies to authenticated users (spec §4.7).
pub fn check(ctx: &EngineCtx, user_id: Option<UserId>) -> DocResult<()> {
    let Some(user_id) = user_id else { return Ok(()) };
    let user = ctx.store.get_user(user_id)?;
    let limit = ctx.config.cost_limit.0;
    if user.cost_accum >= limit {
        return Err(DocError::CostLimitExceeded { user_cost: user.cost_accum, limit });
    }
    Ok(())
}

/// Add `cost` to the user's running total after a successful LLM call.
/// A no-op for anonymous/demo callers, matching [`check`]'s exemption.
pub fn accumulate(ctx: &EngineCtx, user_id: Option<UserId>, cost: f64) -> DocResult<()> {
    let Some(user_id) = user_id else { return Ok(()) };
    if cost <= 0.0 {
        return Ok(());
    }
    ctx.store.accumulate_cost(user_id, cost)?;
    Ok(())
}

#[cfg(test)]
#[path = "cost_tests.rs"]
mod tests;
