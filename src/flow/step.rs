use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use super::document::Link;

/// Sort key given to links whose description carries no step marker.
pub const UNORDERED_STEP: u64 = 999;

static STEP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+[a-z]?)\]").expect("step marker pattern is valid"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepKey {
    pub number: u64,
    pub token: String,
}

impl StepKey {
    pub fn unordered() -> Self {
        Self {
            number: UNORDERED_STEP,
            token: UNORDERED_STEP.to_string(),
        }
    }
}

impl Ord for StepKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.token.cmp(&other.token))
    }
}

impl PartialOrd for StepKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// First `[<digits><optional lowercase letter>]` token in `description`.
pub fn parse_step_marker(description: &str) -> Option<StepKey> {
    let captures = STEP_MARKER.captures(description)?;
    let token = captures.get(1)?.as_str();
    let digits = token.trim_end_matches(|c: char| c.is_ascii_lowercase());
    let number = digits.parse::<u64>().ok()?;

    Some(StepKey {
        number,
        token: token.to_owned(),
    })
}

/// The link's step marker, if its description carries one.
pub fn step_marker(link: &Link) -> Option<StepKey> {
    parse_step_marker(link.description())
}

/// Sort key for `link`; unmarked links sort as [`UNORDERED_STEP`].
fn step_key(link: &Link) -> StepKey {
    step_marker(link).unwrap_or_else(StepKey::unordered)
}

/// Link indices in animation order. The sort is stable, so links sharing a
/// key (including every unmarked link) keep document order.
pub fn flow_order(links: &[Link]) -> Vec<usize> {
    let mut keyed = links
        .iter()
        .enumerate()
        .map(|(index, link)| (step_key(link), index))
        .collect::<Vec<_>>();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, index)| index).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(name: &str, description: &str) -> Link {
        Link {
            name: name.to_owned(),
            from: "A".to_owned(),
            to: "B".to_owned(),
            description: Some(description.to_owned()),
            ..Link::default()
        }
    }

    #[test]
    fn parses_number_and_suffix() {
        assert_eq!(
            parse_step_marker("[3a] Strategy swaps"),
            Some(StepKey {
                number: 3,
                token: "3a".to_owned()
            })
        );
        assert_eq!(parse_step_marker("- **[12]** Harvest").map(|key| key.number), Some(12));
        assert_eq!(parse_step_marker("no marker"), None);
        assert_eq!(parse_step_marker("[A1] upper case"), None);
        assert_eq!(parse_step_marker("[3ab] two letters"), None);
        assert_eq!(parse_step_marker("[] empty"), None);
    }

    #[test]
    fn orders_by_number_then_token() {
        let links = vec![
            link("b", "[2] b"),
            link("a", "[1] a"),
            link("c", "[1b] c"),
            link("d", "no marker d"),
        ];

        let order = flow_order(&links)
            .into_iter()
            .map(|index| links[index].name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn suffixed_steps_follow_plain_step() {
        let links = vec![link("3b", "[3b]"), link("3", "[3]"), link("3a", "[3a]")];
        let order = flow_order(&links)
            .into_iter()
            .map(|index| links[index].name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["3", "3a", "3b"]);
    }

    #[test]
    fn unmarked_links_keep_insertion_order_at_the_end() {
        let links = vec![
            link("x", "plain"),
            Link {
                name: "y".to_owned(),
                description: None,
                ..Link::default()
            },
            link("z", "[1000] after the unmarked block"),
            link("w", "[5] early"),
        ];
        let order = flow_order(&links)
            .into_iter()
            .map(|index| links[index].name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["w", "x", "y", "z"]);
        assert_eq!(step_marker(&links[0]), None);
    }

    #[test]
    fn explicit_999_marker_is_still_a_marker() {
        let marked = link("m", "[999] last on purpose");
        let plain = link("p", "no marker");

        assert_eq!(step_marker(&marked).map(|key| key.token), Some("999".to_owned()));
        assert_eq!(step_marker(&plain), None);
        assert_eq!(step_key(&marked), step_key(&plain));
    }
}
