//! Structural integrity checks for documents.
//!
//! Reports invariant violations without modifying the document. The editor
//! refuses to load a document that produces any error or warning here.

use crate::id::ElementId;
use crate::model::Document;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

// ─── Diagnostic types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// A tree invariant is broken; editing would be unsafe.
    Error,
    /// Structurally usable but outside the data model.
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The element the finding refers to (possibly a missing id).
    pub element: ElementId,
    pub message: String,
    pub severity: Severity,
    /// Short rule identifier (e.g. "dangling-child", "cycle").
    pub rule: &'static str,
}

impl Diagnostic {
    pub fn is_blocking(&self) -> bool {
        self.severity <= Severity::Warning
    }
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run every rule and return diagnostics ordered by element id, then rule.
#[must_use]
pub fn validate_document(doc: &Document) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    check_page_roots(doc, &mut diags);
    check_links(doc, &mut diags);
    check_cycles(doc, &mut diags);
    check_orphans(doc, &mut diags);
    diags.sort_by(|a, b| {
        a.element
            .as_str()
            .cmp(b.element.as_str())
            .then(a.rule.cmp(b.rule))
    });
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn push(
    diags: &mut Vec<Diagnostic>,
    element: ElementId,
    severity: Severity,
    rule: &'static str,
    message: String,
) {
    diags.push(Diagnostic {
        element,
        message,
        severity,
        rule,
    });
}

fn check_page_roots(doc: &Document, diags: &mut Vec<Diagnostic>) {
    let mut claimed = HashSet::new();
    for page in &doc.pages {
        match doc.element(page.root) {
            None => push(
                diags,
                page.root,
                Severity::Error,
                "dangling-page-root",
                format!("page `{}` points at missing root `{}`", page.id, page.root),
            ),
            Some(root) if root.parent.is_some() => push(
                diags,
                page.root,
                Severity::Error,
                "root-has-parent",
                format!("root of page `{}` must not have a parent", page.id),
            ),
            Some(_) => {}
        }
        if !claimed.insert(page.root) {
            push(
                diags,
                page.root,
                Severity::Error,
                "shared-page-root",
                format!("`{}` is the root of more than one page", page.root),
            );
        }
    }
}

fn check_links(doc: &Document, diags: &mut Vec<Diagnostic>) {
    for el in doc.elements.values() {
        if let Some(parent) = el.parent {
            match doc.element(parent) {
                None => push(
                    diags,
                    el.id,
                    Severity::Error,
                    "dangling-parent",
                    format!("`{}` names missing parent `{parent}`", el.id),
                ),
                Some(p) if !p.children.contains(&el.id) => push(
                    diags,
                    el.id,
                    Severity::Error,
                    "parent-mismatch",
                    format!("`{parent}` does not list `{}` as a child", el.id),
                ),
                Some(_) => {}
            }
        }

        let mut seen = HashSet::new();
        for child in &el.children {
            if !seen.insert(*child) {
                push(
                    diags,
                    el.id,
                    Severity::Error,
                    "duplicate-child",
                    format!("`{child}` appears twice in `{}`", el.id),
                );
                continue;
            }
            match doc.element(*child) {
                None => push(
                    diags,
                    el.id,
                    Severity::Error,
                    "dangling-child",
                    format!("`{}` lists missing child `{child}`", el.id),
                ),
                Some(c) if c.parent != Some(el.id) => push(
                    diags,
                    *child,
                    Severity::Error,
                    "parent-mismatch",
                    format!("`{child}` is listed by `{}` but points elsewhere", el.id),
                ),
                Some(_) => {}
            }
        }

        if !el.is_container() && !el.children.is_empty() {
            push(
                diags,
                el.id,
                Severity::Warning,
                "leaf-with-children",
                format!("`{}` is a {} and cannot hold children", el.id, el.kind.as_str()),
            );
        }
    }
}

/// Build the parent→child digraph and report every element on a cycle.
fn check_cycles(doc: &Document, diags: &mut Vec<Diagnostic>) {
    let mut graph: DiGraph<ElementId, ()> = DiGraph::with_capacity(doc.elements.len(), 0);
    let index: HashMap<ElementId, NodeIndex> = doc
        .elements
        .keys()
        .map(|id| (*id, graph.add_node(*id)))
        .collect();
    for el in doc.elements.values() {
        for child in &el.children {
            if let Some(&to) = index.get(child) {
                graph.update_edge(index[&el.id], to, ());
            }
        }
    }
    for component in tarjan_scc(&graph) {
        let looped = component.len() > 1
            || component
                .first()
                .is_some_and(|n| graph.contains_edge(*n, *n));
        if !looped {
            continue;
        }
        for node in component {
            let id = graph[node];
            push(
                diags,
                id,
                Severity::Error,
                "cycle",
                format!("`{id}` is its own ancestor"),
            );
        }
    }
}

fn check_orphans(doc: &Document, diags: &mut Vec<Diagnostic>) {
    for el in doc.elements.values() {
        if el.parent.is_none() && !doc.is_page_root(el.id) {
            push(
                diags,
                el.id,
                Severity::Warning,
                "orphan",
                format!("`{}` is not attached to any page", el.id),
            );
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};
    use crate::model::{Element, ElementType};
    use pretty_assertions::assert_eq;

    fn sample() -> (Document, ElementId) {
        let mut doc = Document::new();
        let page = doc.add_page("Home", Point::ZERO, Size::new(800.0, 600.0));
        let root = doc.page(page).unwrap().root;
        let frame = ElementId::intern("validate_frame");
        doc.elements
            .insert(frame, Element::new(frame, ElementType::Frame));
        doc.attach(frame, root, None);
        (doc, frame)
    }

    fn rules(doc: &Document) -> Vec<&'static str> {
        validate_document(doc).into_iter().map(|d| d.rule).collect()
    }

    #[test]
    fn clean_document_has_no_diagnostics() {
        let (doc, _) = sample();
        assert!(validate_document(&doc).is_empty());
    }

    #[test]
    fn dangling_child_reported() {
        let (mut doc, frame) = sample();
        doc.element_mut(frame)
            .unwrap()
            .children
            .push(ElementId::intern("validate_ghost"));
        assert_eq!(rules(&doc), vec!["dangling-child"]);
    }

    #[test]
    fn duality_break_reported() {
        let (mut doc, frame) = sample();
        let stray = ElementId::intern("validate_stray");
        let mut el = Element::new(stray, ElementType::Text);
        el.parent = Some(frame);
        doc.elements.insert(stray, el);
        assert_eq!(rules(&doc), vec!["parent-mismatch"]);
    }

    #[test]
    fn cycle_detected_with_scc() {
        let (mut doc, frame) = sample();
        let inner = ElementId::intern("validate_inner");
        doc.elements
            .insert(inner, Element::new(inner, ElementType::Box));
        doc.attach(inner, frame, None);
        // inner -> frame closes a loop below the page root.
        doc.element_mut(inner).unwrap().children.push(frame);

        let diags = validate_document(&doc);
        let cyclic: HashSet<ElementId> = diags
            .iter()
            .filter(|d| d.rule == "cycle")
            .map(|d| d.element)
            .collect();
        assert_eq!(cyclic, HashSet::from([frame, inner]));
        assert!(diags.iter().all(Diagnostic::is_blocking));
    }

    #[test]
    fn leaf_children_and_orphans_warn() {
        let (mut doc, frame) = sample();
        let text = ElementId::intern("validate_text");
        let under = ElementId::intern("validate_under_text");
        doc.elements
            .insert(text, Element::new(text, ElementType::Text));
        doc.elements
            .insert(under, Element::new(under, ElementType::Icon));
        doc.attach(text, frame, None);
        doc.attach(under, text, None);
        let lonely = ElementId::intern("validate_lonely");
        doc.elements
            .insert(lonely, Element::new(lonely, ElementType::Box));

        let diags = validate_document(&doc);
        assert_eq!(
            diags
                .iter()
                .map(|d| (d.rule, d.severity))
                .collect::<Vec<_>>(),
            vec![
                ("orphan", Severity::Warning),
                ("leaf-with-children", Severity::Warning),
            ]
        );
    }
}
