//! Key alignment pass
//!
//!     Sibling key/value pairs share one arrow column: the widest key of the group plus one
//!     space. Hash and selector bodies are groups, and so are the attributes under each
//!     resource title. Nested bodies form their own groups.

use crate::manifest::ast::{Ast, NodeId, NodeKind, Variant};

/// Store the shared key width in every key/value pair of every group
pub fn align_keys(ast: &mut Ast) {
    let mut widths: Vec<(NodeId, usize)> = Vec::new();
    for id in ast.ids() {
        match ast.kind(id) {
            NodeKind::Hash { items } | NodeKind::Selector { items, .. } => {
                measure_group(ast, items, &mut widths);
            }
            NodeKind::Resource { items, .. } => {
                // Attributes ahead of the first title belong to its group
                let mut group = Vec::new();
                let mut seen_title = false;
                for &item in items {
                    if ast.variant(item) != Variant::ResourceTitle {
                        group.push(item);
                        continue;
                    }
                    if seen_title {
                        measure_group(ast, &group, &mut widths);
                        group.clear();
                    }
                    seen_title = true;
                }
                measure_group(ast, &group, &mut widths);
            }
            _ => {}
        }
    }

    for (id, width) in widths {
        if let NodeKind::KeyValuePair { key_width, .. } = &mut ast.get_mut(id).kind {
            *key_width = width;
        }
    }
}

fn measure_group(ast: &Ast, items: &[NodeId], widths: &mut Vec<(NodeId, usize)>) {
    let pairs: Vec<(NodeId, usize)> = items
        .iter()
        .filter_map(|item| match ast.kind(*item) {
            NodeKind::KeyValuePair { key, .. } => Some((*item, key.text.chars().count())),
            _ => None,
        })
        .collect();
    let Some(width) = pairs.iter().map(|(_, len)| *len).max() else {
        return;
    };
    widths.extend(pairs.into_iter().map(|(id, _)| (id, width)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::config::PupfmtConfig;
    use crate::manifest::parse_source;

    fn key_widths(source: &str) -> Vec<(String, usize)> {
        let mut ast = parse_source(source, &PupfmtConfig::default()).expect("parse");
        align_keys(&mut ast);
        ast.ids()
            .filter_map(|id| match ast.kind(id) {
                NodeKind::KeyValuePair { key, key_width, .. } => {
                    Some((key.text.clone(), *key_width))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_resource_titles_align_independently() {
        let widths = key_widths("file { 'a': ensure => file, mode => '0644'; 'b': owner => root }");
        assert_eq!(
            widths,
            vec![
                ("ensure".to_string(), 6),
                ("mode".to_string(), 6),
                ("owner".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_nested_hash_aligns_on_its_own() {
        let widths = key_widths("$h = { 'long_key' => { 'a' => 1, 'bb' => 2 }, 'k' => 3 }");
        let map: std::collections::HashMap<String, usize> = widths.into_iter().collect();
        assert_eq!(map["'long_key'"], 10);
        assert_eq!(map["'k'"], 10);
        assert_eq!(map["'a'"], 4);
        assert_eq!(map["'bb'"], 4);
    }

    #[test]
    fn test_selector_alignment() {
        let widths = key_widths("$m = $os ? { 'Debian' => 1, default => 2 }");
        assert_eq!(
            widths,
            vec![("'Debian'".to_string(), 8), ("default".to_string(), 8)]
        );
    }
}
