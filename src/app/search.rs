use std::collections::HashSet;
use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::flow::GraphDocument;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) struct SearchHit {
    pub(in crate::app) node: usize,
    pub(in crate::app) score: i64,
    /// Best-matching text: the node name or one of its address fields.
    pub(in crate::app) matched: String,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Nodes whose name or address fields fuzzy-match `query`, best first.
pub(in crate::app) fn search_nodes(document: &GraphDocument, query: &str) -> Vec<SearchHit> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut hits = document
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let address_fields = node
                .addresses
                .iter()
                .flat_map(|record| record.searchable_fields());
            std::iter::once(node.node_name.as_str())
                .chain(address_fields)
                .filter_map(|text| {
                    fuzzy_match_score(&matcher, text, query).map(|score| (score, text))
                })
                .max_by_key(|(score, _)| *score)
                .map(|(score, text)| SearchHit {
                    node: index,
                    score,
                    matched: text.to_owned(),
                })
        })
        .collect::<Vec<_>>();

    hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.node.cmp(&b.node)));
    hits
}

pub(in crate::app) struct SearchResults {
    pub(in crate::app) hits: Vec<SearchHit>,
    pub(in crate::app) nodes: HashSet<usize>,
}

struct CachedSearch {
    query: String,
    revision: u64,
    results: Arc<SearchResults>,
}

/// Remembers the last query so the canvas and the result list share one
/// search per document revision.
#[derive(Default)]
pub(in crate::app) struct SearchCache {
    cached: Option<CachedSearch>,
}

impl SearchCache {
    pub(in crate::app) fn results(
        &mut self,
        document: &GraphDocument,
        revision: u64,
        query: &str,
    ) -> Option<Arc<SearchResults>> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.cached
            && cached.revision == revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.results));
        }

        let hits = search_nodes(document, query);
        let nodes = hits.iter().map(|hit| hit.node).collect();
        let results = Arc::new(SearchResults { hits, nodes });
        self.cached = Some(CachedSearch {
            query: query.to_owned(),
            revision,
            results: Arc::clone(&results),
        });
        Some(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::flow::{AddressRecord, Node};

    fn document() -> GraphDocument {
        GraphDocument {
            nodes: vec![
                Node {
                    node_name: "Farm Contract".to_owned(),
                    ..Node::default()
                },
                Node {
                    node_name: "Pool".to_owned(),
                    addresses: vec![AddressRecord {
                        address: "0xd0b53D9277642d899DF5C87A3966A349A798F224".to_owned(),
                        label: Some("WETH/USDC".to_owned()),
                        ..AddressRecord::default()
                    }],
                    ..Node::default()
                },
                Node {
                    node_name: "Strategy".to_owned(),
                    ..Node::default()
                },
            ],
            ..GraphDocument::default()
        }
    }

    #[test]
    fn matches_node_names_case_insensitively() {
        let hits = search_nodes(&document(), "farm");

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, 0);
        assert_eq!(hits[0].matched, "Farm Contract");
    }

    #[test]
    fn matches_address_fields() {
        let hits = search_nodes(&document(), "weth");
        assert_eq!(hits.iter().map(|hit| hit.node).collect::<Vec<_>>(), vec![1]);
        assert_eq!(hits[0].matched, "WETH/USDC");

        let hits = search_nodes(&document(), "0xd0b5");
        assert_eq!(hits.iter().map(|hit| hit.node).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn blank_query_matches_nothing() {
        assert!(search_nodes(&document(), "   ").is_empty());

        let mut cache = SearchCache::default();
        assert!(cache.results(&document(), 0, "").is_none());
    }

    #[test]
    fn cache_reuses_results_until_query_or_revision_changes() {
        let document = document();
        let mut cache = SearchCache::default();

        let first = cache.results(&document, 1, "pool").unwrap();
        let again = cache.results(&document, 1, " pool ").unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert!(first.nodes.contains(&1));

        let bumped = cache.results(&document, 2, "pool").unwrap();
        assert!(!Arc::ptr_eq(&first, &bumped));
    }
}
