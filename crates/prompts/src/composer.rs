// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic, pure prompt composition (§4.9). No I/O: every method is a
//! template lookup plus interpolation, so the same inputs always render the
//! same prompt text — the engine calls these synchronously from inside a
//! scheduled task, never across an await point.

use std::collections::HashMap;

use doc_core::ContextMode;

use crate::interpolate::interpolate;
use crate::templates;

/// Renders the nine prompt operations named in §4.9 from the template
/// constants in [`crate::templates`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptComposer;

impl PromptComposer {
    pub fn new() -> Self {
        Self
    }

    pub fn system_main(&self, mode: ContextMode) -> String {
        match mode {
            ContextMode::Windowed => templates::MAIN_SYSTEM.to_string(),
            ContextMode::Full => templates::MAIN_SYSTEM_FULL_CONTEXT.to_string(),
        }
    }

    pub fn system_highlight(&self, mode: ContextMode) -> String {
        match mode {
            ContextMode::Windowed => templates::HIGHLIGHT_SYSTEM.to_string(),
            ContextMode::Full => templates::HIGHLIGHT_SYSTEM_FULL_CONTEXT.to_string(),
        }
    }

    pub fn user_main(&self, content: &str, conversation_history: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("content", content);
        vars.insert("conversation_history", conversation_history);
        interpolate(templates::MAIN_USER, &vars)
    }

    pub fn user_highlight(&self, highlighted_text: &str, chunk_text: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("highlighted_text", highlighted_text);
        vars.insert("chunk_text", chunk_text);
        interpolate(templates::HIGHLIGHT_USER, &vars)
    }

    pub fn question_system(&self) -> String {
        templates::QUESTION_SYSTEM.to_string()
    }

    pub fn question_main(&self, count: u32, content: &str, previous_questions: &str) -> String {
        let count = count.to_string();
        let mut vars = HashMap::new();
        vars.insert("count", count.as_str());
        vars.insert("content", content);
        vars.insert("previous_questions", previous_questions);
        interpolate(templates::MAIN_QUESTION_USER, &vars)
    }

    pub fn question_highlight(&self, count: u32, highlighted_text: &str, previous_questions: &str) -> String {
        let count = count.to_string();
        let mut vars = HashMap::new();
        vars.insert("count", count.as_str());
        vars.insert("highlighted_text", highlighted_text);
        vars.insert("previous_questions", previous_questions);
        interpolate(templates::HIGHLIGHT_QUESTION_USER, &vars)
    }

    pub fn summary_system(&self) -> String {
        templates::SUMMARY_SYSTEM.to_string()
    }

    pub fn summary_user(&self, highlighted_text: &str, conversation_history: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("highlighted_text", highlighted_text);
        vars.insert("conversation_history", conversation_history);
        interpolate(templates::SUMMARY_USER, &vars)
    }
}

#[cfg(test)]
#[path = "composer_tests.rs"]
mod tests;
