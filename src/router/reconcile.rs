//! Chain diffing and incremental DOM updates between renders.

use crate::dom::Element;
use crate::resolver::ChainEntry;

/// Elements appended and scheduled for removal by one render.
#[derive(Debug, Default)]
pub(crate) struct DomUpdate {
    /// New direct children of the deepest reused ancestor.
    pub appearing: Vec<Element>,
    /// Old content under the same ancestor, detached once any configured
    /// transition finishes.
    pub disappearing: Vec<Element>,
}

fn reusable(old: &Option<Element>, new: &Option<Element>) -> bool {
    match (old, new) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.same(b)
                || (a.created_by_router()
                    && b.created_by_router()
                    && a.component() == b.component())
        }
        _ => false,
    }
}

/// First position where the chains differ. Entries are interchangeable when
/// route and consumed path agree and the elements are the same node or both
/// router-created instances of one component.
pub(crate) fn divergence_index(old: &[ChainEntry], new: &[ChainEntry]) -> usize {
    let mut i = 0;
    while i < old.len() && i < new.len() {
        let (o, n) = (&old[i], &new[i]);
        if o.route == n.route && o.path == n.path && reusable(&o.element, &n.element) {
            i += 1;
        } else {
            break;
        }
    }
    i
}

/// Deepest element among `chain[..divergence]`, or the mount point. Entries
/// without an element are skipped; their children render under the nearest
/// rendered ancestor.
fn attach_root(mount: &Element, chain: &[ChainEntry], divergence: usize) -> Element {
    chain[..divergence]
        .iter()
        .rev()
        .find_map(|entry| entry.element.clone())
        .unwrap_or_else(|| mount.clone())
}

/// Mounts the diverging suffix of `new` under the deepest reused ancestor.
/// Old content under that ancestor stays attached and is reported as
/// disappearing; the caller detaches it when the transition is over.
pub(crate) fn apply_chain(mount: &Element, new: &[ChainEntry], divergence: usize) -> DomUpdate {
    let root = attach_root(mount, new, divergence);
    let prior = root.children();

    let mut appearing = Vec::new();
    let mut attach_point = root.clone();
    for entry in &new[divergence..] {
        if let Some(element) = &entry.element {
            attach_point.append_child(element);
            if attach_point.same(&root) {
                appearing.push(element.clone());
            }
            attach_point = element.clone();
        }
    }

    let disappearing = prior
        .into_iter()
        .filter(|old| !appearing.iter().any(|fresh| fresh.same(old)))
        .collect();

    DomUpdate {
        appearing,
        disappearing,
    }
}

/// Tears down content appended by a render that lost to a newer one.
pub(crate) fn remove_appearing_content(update: &DomUpdate) {
    for element in &update.appearing {
        element.detach();
    }
}
