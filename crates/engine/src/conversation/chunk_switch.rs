// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chunk-switch compression for main conversations (spec §4.5.3).
//!
//! Forward pass: walk stored messages in order, inserting a synthetic
//! user/assistant switch pair whenever `chunk_context` changes. Reverse
//! pass: inline each represented chunk's full text into the most recent
//! switch that represents it, so a chunk's text is repeated at most once
//! no matter how many times the user revisited it.

use std::collections::HashSet;

use doc_core::{ChunkSeq, Role};

/// One turn of stored conversation history handed to the compressor.
#[derive(Debug, Clone)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
    pub chunk_context: Option<ChunkSeq>,
}

/// One rendered turn of LLM input, after synthetic switches are spliced in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTurn {
    pub role: Role,
    pub content: String,
}

struct Switch {
    // index into `out` of the synthetic user-role message this switch owns.
    out_index: usize,
    represented: Vec<ChunkSeq>,
}

/// Rewrite `turns` into the compressed form sent to the model.
///
/// `chunk_text` resolves a chunk's full content; a chunk with no resolvable
/// text (already deleted, or out of range) is silently skipped rather than
/// failing the whole render, since the switch marker itself still conveys
/// where the user was reading.
pub fn compress(turns: &[HistoryTurn], chunk_text: impl Fn(ChunkSeq) -> Option<String>) -> Vec<RenderedTurn> {
    let mut out: Vec<RenderedTurn> = Vec::with_capacity(turns.len());
    let mut switches: Vec<Switch> = Vec::new();
    let mut last: Option<ChunkSeq> = None;

    for turn in turns {
        if let Some(new) = turn.chunk_context {
            if last != Some(new) {
                let backward = last.is_some_and(|l| new < l);
                let represented = if backward {
                    vec![new]
                } else {
                    let low = last.unwrap_or(ChunkSeq(0));
                    (low.0..=new.0).map(ChunkSeq).collect()
                };
                let (user_text, assistant_text) = if backward {
                    (
                        format!("<switched to chunk ID {new}>"),
                        format!("<acknowledged switch to chunk {new}>"),
                    )
                } else {
                    let low = last.unwrap_or(ChunkSeq(0));
                    (
                        format!("<switched to chunks {low}-{new}>"),
                        format!("<acknowledged switch to chunks {low}-{new}>"),
                    )
                };
                let out_index = out.len();
                out.push(RenderedTurn { role: Role::User, content: user_text });
                out.push(RenderedTurn { role: Role::Assistant, content: assistant_text });
                switches.push(Switch { out_index, represented });
            }
            last = Some(new);
        }
        out.push(RenderedTurn { role: turn.role, content: turn.content.clone() });
    }

    let mut seen: HashSet<ChunkSeq> = HashSet::new();
    for sw in switches.iter().rev() {
        let mut unseen: Vec<ChunkSeq> =
            sw.represented.iter().copied().filter(|c| seen.insert(*c)).collect();
        if unseen.is_empty() {
            continue;
        }
        unseen.sort_by_key(|c| c.0);
        let parts: Vec<String> = unseen
            .into_iter()
            .filter_map(|c| chunk_text(c).map(|text| format!("Chunk {c}: {text}")))
            .collect();
        if !parts.is_empty() {
            out[sw.out_index].content.push_str(&format!(", chunkText: {}", parts.join(" | ")));
        }
    }

    out
}

#[cfg(test)]
#[path = "chunk_switch_tests.rs"]
mod tests;
