use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Two pseudo-random fractions in `[0, 1]` derived from `id`.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    (x, y)
}

/// Node labels wrap on spaces, one word per line.
pub fn label_lines(name: &str) -> Vec<String> {
    let words = name.split(' ').filter(|word| !word.is_empty()).collect::<Vec<_>>();
    if words.len() > 1 {
        words.into_iter().map(str::to_owned).collect()
    } else {
        vec![name.to_owned()]
    }
}

pub fn short_address(address: &str) -> String {
    let chars = address.chars().collect::<Vec<_>>();
    if chars.len() <= 14 {
        return address.to_owned();
    }

    let head = chars[..8].iter().collect::<String>();
    let tail = chars[chars.len() - 6..].iter().collect::<String>();
    format!("{head}…{tail}")
}
