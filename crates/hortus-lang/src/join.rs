//! Join path discovery.

use std::collections::HashSet;

use crate::ast::Filter;

/// A relation-hop prefix that must be joined to evaluate a filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinPath {
    pub hops: Vec<String>,
}

impl JoinPath {
    pub fn new(hops: Vec<String>) -> Self {
        Self { hops }
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Whether `self` is a proper prefix of `other`.
    pub fn is_prefix_of(&self, other: &JoinPath) -> bool {
        self.hops.len() < other.hops.len() && other.hops.starts_with(&self.hops)
    }
}

impl std::fmt::Display for JoinPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.hops.join("."))
    }
}

/// Collect the distinct relation-hop prefixes referenced by `filter`.
///
/// The walk is depth-first and left-to-right, so paths come out in the order
/// they first appear in the search string. The traversal keeps its own stack
/// and never recurses.
pub fn needs_join(filter: &Filter) -> Vec<JoinPath> {
    let mut seen = HashSet::new();
    let mut joins = Vec::new();
    let mut stack = vec![filter];

    while let Some(node) = stack.pop() {
        match node {
            Filter::And(children) | Filter::Or(children) => {
                stack.extend(children.iter().rev());
            }
            Filter::Not(inner) => stack.push(inner),
            leaf => {
                let Some(path) = leaf.path() else { continue };
                let relations = path.relations();
                if relations.is_empty() {
                    continue;
                }
                let join = JoinPath::new(relations.to_vec());
                if seen.insert(join.clone()) {
                    joins.push(join);
                }
            }
        }
    }

    joins
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Statement;
    use crate::parser::parse_string;
    use pretty_assertions::assert_eq;

    fn joins_for(source: &str) -> Vec<Vec<String>> {
        let Statement::Query(query) = parse_string(source).unwrap() else {
            panic!("expected query");
        };
        needs_join(&query.filter).into_iter().map(|j| j.hops).collect()
    }

    fn hops(path: &[&str]) -> Vec<String> {
        path.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn test_no_joins_for_root_columns() {
        assert!(joins_for("genus where id=1 and genus like 'I%'").is_empty());
    }

    #[test]
    fn test_single_join() {
        assert_eq!(
            joins_for("plant where accession.id=1"),
            vec![hops(&["accession"])]
        );
    }

    #[test]
    fn test_distinct_prefixes_keep_order() {
        assert_eq!(
            joins_for("plant where accession.id=4 or accession.species.id=3"),
            vec![hops(&["accession"]), hops(&["accession", "species"])]
        );
        assert_eq!(
            joins_for("plant where accession.species.id=3 or accession.id=4"),
            vec![hops(&["accession", "species"]), hops(&["accession"])]
        );
    }

    #[test]
    fn test_duplicates_collapse() {
        assert_eq!(
            joins_for("plant where accession.id=1 and accession.id=2 or not accession.code like '2001%'"),
            vec![hops(&["accession"])]
        );
    }

    #[test]
    fn test_joins_from_every_node_kind() {
        assert_eq!(
            joins_for(
                "genus where family.id between 1 and 2 and species.sp in a, b or count(accessions.id) > 1"
            ),
            vec![hops(&["family"]), hops(&["species"]), hops(&["accessions"])]
        );
    }

    #[test]
    fn test_prefix_relation() {
        let short = JoinPath::new(hops(&["accession"]));
        let long = JoinPath::new(hops(&["accession", "species"]));
        assert!(short.is_prefix_of(&long));
        assert!(!long.is_prefix_of(&short));
        assert!(!short.is_prefix_of(&short));
        assert_eq!(long.to_string(), "accession.species");
    }
}
