//! Structure probe for building configurations against a new page family.
//!
//! Answers the questions that come up when a site's markup changes: how many
//! candidate nodes does the rule hit, where do the identity elements sit,
//! and at which ancestor level would the container resolve.

use scraper::{ElementRef, Html};

use crate::infrastructure::parsing::candidate_locator::locate;
use crate::infrastructure::parsing::container_resolver::{contains_identity, resolve};
use crate::infrastructure::site_config::CompiledConfig;

/// Ancestor levels reported for the first candidate.
const PROBE_DEPTH: usize = 20;

#[derive(Debug)]
pub struct AncestorProbe {
    pub level: usize,
    pub tag: String,
    pub has_identity: bool,
    pub is_container_tag: bool,
}

#[derive(Debug)]
pub enum ProbeResolution {
    Resolved { tag: String },
    Fallback { tag: String },
}

#[derive(Debug)]
pub struct DocumentProbe {
    /// Elements matching the candidate rule.
    pub candidates: usize,
    /// Elements matching the identity rule anywhere in the document.
    pub identity_nodes: usize,
    /// Ancestor chain of the first candidate, innermost first.
    pub ancestor_chain: Vec<AncestorProbe>,
    /// What the container resolver would return for the first candidate.
    pub resolution: Option<ProbeResolution>,
}

/// Probe one parsed document against a compiled configuration. Pure read;
/// no records are produced.
pub fn probe_document(document: &Html, config: &CompiledConfig) -> DocumentProbe {
    let candidates: Vec<_> = locate(document, &config.candidate_rule).collect();

    let identity_nodes = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| config.identity.matches(*el))
        .count();

    let (ancestor_chain, resolution) = match candidates.first() {
        Some(&first) => {
            let chain = first
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take(PROBE_DEPTH)
                .enumerate()
                .map(|(level, ancestor)| AncestorProbe {
                    level,
                    tag: ancestor.value().name().to_string(),
                    has_identity: contains_identity(ancestor, &config.identity),
                    is_container_tag: config
                        .container_tag
                        .as_deref()
                        .is_some_and(|tag| ancestor.value().name() == tag),
                })
                .collect();
            let resolution = resolve(first, config).map(|outcome| {
                let tag = outcome.element().value().name().to_string();
                if outcome.is_resolved() {
                    ProbeResolution::Resolved { tag }
                } else {
                    ProbeResolution::Fallback { tag }
                }
            });
            (chain, resolution)
        }
        None => (Vec::new(), None),
    };

    DocumentProbe {
        candidates: candidates.len(),
        identity_nodes,
        ancestor_chain,
        resolution,
    }
}
