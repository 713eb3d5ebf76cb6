use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const BUILTIN_PHRASES: [(&str, &str, &str); 16] = [
    ("User", "Farm Contract", "User sends tokens to the Farm"),
    ("Farm Contract", "Strategy", "Farm requests reward claim from Strategy"),
    ("Strategy", "Zap", "Strategy swaps tokens for correct ratio"),
    ("Zap", "Strategy", "Swapped tokens returned to Strategy"),
    ("Strategy", "Position Manager", "Strategy adds liquidity to position"),
    ("Position Manager", "Pool", "Liquidity added to trading pool"),
    ("Strategy", "Tracker Token", "Strategy mints share tokens for user"),
    ("Tracker Token", "User", "Share tokens sent to user wallet"),
    ("Tracker Token", "Farm Contract", "User burns share tokens to withdraw"),
    ("Strategy", "User", "Tokens transferred back to user"),
    ("Controller", "Strategy", "Controller triggers management action"),
    ("Strategy", "Fund Manager", "Earnings distributed to fund managers"),
    ("Pool", "Strategy", "Trading fees collected from pool"),
    ("Position Manager", "Old NFT Position", "Old position burned"),
    ("Position Manager", "New NFT Position", "New position created with updated range"),
    ("Strategy", "Pool", "Liquidity added to new position"),
];

/// Plain-language phrases for `"{from}|{to}"` node pairs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryTable {
    phrases: BTreeMap<String, String>,
}

impl Default for SummaryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SummaryTable {
    pub fn builtin() -> Self {
        let phrases = BUILTIN_PHRASES
            .iter()
            .map(|(from, to, phrase)| (Self::key(from, to), (*phrase).to_owned()))
            .collect();
        Self { phrases }
    }

    fn key(from: &str, to: &str) -> String {
        format!("{from}|{to}")
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn phrase(&self, from: &str, to: &str) -> String {
        self.phrases
            .get(&Self::key(from, to))
            .cloned()
            .unwrap_or_else(|| format!("{from} transfers to {to}"))
    }
}

/// First description line without markdown emphasis, list dash or step marker.
pub fn description_headline(description: &str) -> Option<String> {
    let first_line = description.lines().next()?;
    let mut line = first_line.replace("**", "");
    if let Some(rest) = line.trim_start().strip_prefix("- ") {
        line = rest.to_owned();
    }

    if let Some(open) = line.find('[')
        && let Some(close) = line[open..].find(']')
    {
        let after = line[open + close + 1..].trim_start().to_owned();
        line = format!("{}{}", &line[..open], after);
    }

    let line = line.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_owned())
    }
}
