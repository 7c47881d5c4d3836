//! Prompt Composition
//!
//! Query scope (one application vs. a cross-application comparison) decides
//! both the retrieval parameters and which prompt template the generator
//! receives. The reserved scope name "comparison" can never collide with a
//! real application because registration rejects it.

use crate::documents::chunker::Passage;

/// Reserved scope name that triggers cross-application comparison.
pub const COMPARISON_SCOPE: &str = "comparison";

/// Passages retrieved for a single-application question.
pub const SINGLE_TENANT_TOP_K: usize = 4;

/// Passages retrieved for a comparison question. Wider so every
/// application's manual has a chance to surface.
pub const COMPARISON_TOP_K: usize = 10;

/// How a question should be scoped during retrieval and prompting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    /// Answer from one application's manual only.
    Tenant(String),
    /// Answer across every application's manual.
    Comparison,
}

impl QueryScope {
    /// Parse a scope name as supplied on the command line.
    pub fn parse(name: &str) -> Self {
        if name == COMPARISON_SCOPE {
            QueryScope::Comparison
        } else {
            QueryScope::Tenant(name.to_string())
        }
    }

    /// Retrieval parameters for this scope: how many passages to pull and
    /// which application to restrict to.
    pub fn retrieval(&self) -> (usize, Option<&str>) {
        match self {
            QueryScope::Tenant(name) => (SINGLE_TENANT_TOP_K, Some(name.as_str())),
            QueryScope::Comparison => (COMPARISON_TOP_K, None),
        }
    }
}

/// Join retrieved passages into the context block, preserving retrieval
/// order (nearest first).
pub fn format_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Compose the full prompt for the generator.
pub fn compose(scope: &QueryScope, question: &str, context: &str) -> String {
    match scope {
        QueryScope::Tenant(app) => format!(
            "You are a helpful assistant for the {app} application.\n\
             \n\
             Context:\n\
             {context}\n\
             \n\
             Question: {question}\n\
             \n\
             Instructions:\n\
             1. Use the provided context to answer the question.\n\
             2. If it's a greeting, respond politely.\n\
             3. If the answer isn't in context and it's not a greeting, say you don't know.\n"
        ),
        QueryScope::Comparison => format!(
            "Analyze and compare how the following topic is handled across different \
             application contexts (e.g., Food Delivery, E-Commerce, etc.) based on the \
             provided documents.\n\
             \n\
             Topic: {question}\n\
             \n\
             Context:\n\
             {context}\n\
             \n\
             Instructions:\n\
             1. Differentiate the meaning or process for this topic within each application \
             mentioned in the context.\n\
             2. Comparison should be clear and highlight the specific differences.\n\
             3. If an application is not mentioned in the context, do not make up \
             information for it.\n"
        ),
    }
}
