//! Reverse URL generation: the name index and path joining rules.

use crate::error::RouterError;
use crate::routes::{RouteId, RouteTable, ValidationError};

use std::collections::HashMap;

/// Joins two route path segments, collapsing the slash between them.
pub(crate) fn join_paths(a: &str, b: &str) -> String {
    if a.is_empty() {
        return b.to_string();
    }
    if b.is_empty() {
        return a.to_string();
    }
    match (a.ends_with('/'), b.starts_with('/')) {
        (true, true) => format!("{}{}", a, &b[1..]),
        (false, false) => format!("{}/{}", a, b),
        _ => format!("{}{}", a, b),
    }
}

/// A named route, or the marker that the name is claimed more than once.
/// Duplicates are a configuration error raised at lookup time.
pub(crate) enum NameSlot {
    Unique(RouteId),
    Duplicate,
}

/// Indexes every named route in the table. Only statically declared routes
/// are present in the table, so callback-produced children are never
/// reachable by name.
pub(crate) fn build_name_index(table: &RouteTable) -> HashMap<String, NameSlot> {
    let mut index = HashMap::new();
    for def in table.defs() {
        if let Some(name) = &def.name {
            index
                .entry(name.clone())
                .and_modify(|slot| *slot = NameSlot::Duplicate)
                .or_insert(NameSlot::Unique(def.id));
        }
    }
    index
}

/// The route's pattern joined with all ancestor patterns, root first.
pub(crate) fn full_path(table: &RouteTable, id: RouteId) -> String {
    let mut segments = Vec::new();
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        match table.def(current) {
            Some(def) => {
                if !def.synthetic {
                    segments.push(def.path.primary().to_string());
                }
                cursor = def.parent;
            }
            None => break,
        }
    }
    segments
        .iter()
        .rev()
        .fold(String::new(), |acc, s| join_paths(&acc, s))
}

pub(crate) fn lookup_name(
    index: &HashMap<String, NameSlot>,
    name: &str,
) -> Result<RouteId, RouterError> {
    match index.get(name) {
        None => Err(ValidationError::UnknownName {
            name: name.to_string(),
        }
        .into()),
        Some(NameSlot::Duplicate) => Err(ValidationError::DuplicateName {
            name: name.to_string(),
        }
        .into()),
        Some(NameSlot::Unique(id)) => Ok(*id),
    }
}
