//! Resolves the review container enclosing a candidate node.

use scraper::ElementRef;

use crate::infrastructure::site_config::{CompiledConfig, CompiledIdentityRule};

/// Outcome of the ancestor walk. `Resolved` is a confident match: the
/// ancestor carries the configured container tag and an identity element.
/// `Fallback` is the last ancestor reached within the level budget — a
/// best-effort guess so partial or malformed pages still yield whatever can
/// be recovered.
#[derive(Debug, Clone, Copy)]
pub enum ContainerMatch<'a> {
    Resolved(ElementRef<'a>),
    Fallback(ElementRef<'a>),
}

impl<'a> ContainerMatch<'a> {
    pub fn element(&self) -> ElementRef<'a> {
        match *self {
            Self::Resolved(el) | Self::Fallback(el) => el,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Walk outward from the candidate, up to `max_ancestor_levels` element
/// ancestors. The first ancestor whose tag equals the configured container
/// tag and which contains an identity match wins — the walk starts at the
/// candidate, so that is the smallest qualifying ancestor. Returns `None`
/// only for a candidate with no element ancestors at all.
pub fn resolve<'a>(
    candidate: ElementRef<'a>,
    config: &CompiledConfig,
) -> Option<ContainerMatch<'a>> {
    let mut last = None;
    for ancestor in candidate
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(config.max_ancestor_levels)
    {
        if let Some(tag) = config.container_tag.as_deref() {
            if ancestor.value().name() == tag && contains_identity(ancestor, &config.identity) {
                return Some(ContainerMatch::Resolved(ancestor));
            }
        }
        last = Some(ancestor);
    }
    last.map(ContainerMatch::Fallback)
}

/// Whether any descendant of the element matches the identity rule.
pub fn contains_identity(element: ElementRef<'_>, identity: &CompiledIdentityRule) -> bool {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|el| identity.matches(el))
}
