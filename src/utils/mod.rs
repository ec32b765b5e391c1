//! Utils Module

/// Drop repeated entries, keeping the first occurrence of each
pub fn dedup_preserving_order<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let item = item.into();
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_seen_order() {
        let out = dedup_preserving_order(["b", "a", "b", "c", "a"]);
        assert_eq!(out, vec!["b", "a", "c"]);
    }
}
