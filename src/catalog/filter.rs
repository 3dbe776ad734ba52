use std::fmt;

use crate::catalog::model::EmoticonRecord;

/// Which pack a view is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PackSelector {
    #[default]
    All,
    /// Compared against the record's pack id rendered as text.
    Id(String),
}

impl PackSelector {
    pub const ALL: &'static str = "all";

    /// `all` (any case) or empty text selects every pack.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(Self::ALL) {
            PackSelector::All
        } else {
            PackSelector::Id(raw.to_string())
        }
    }

    fn admits(&self, record: &EmoticonRecord) -> bool {
        match self {
            PackSelector::All => true,
            PackSelector::Id(id) => record.pack_id.to_string() == *id,
        }
    }
}

impl fmt::Display for PackSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackSelector::All => f.write_str(Self::ALL),
            PackSelector::Id(id) => f.write_str(id),
        }
    }
}

fn matches_query(record: &EmoticonRecord, needle: &str) -> bool {
    record.title.to_lowercase().contains(needle)
        || record.description.to_lowercase().contains(needle)
        || record.keywords.iter().any(|k| k.to_lowercase().contains(needle))
        || record.pack_title.to_lowercase().contains(needle)
}

/// Records passing both the pack selector and the case-insensitive substring query, in input order.
pub fn filter<'a>(
    records: &'a [EmoticonRecord],
    selector: &PackSelector,
    query: &str,
) -> Vec<&'a EmoticonRecord> {
    let needle = query.trim().to_lowercase();
    records
        .iter()
        .filter(|record| selector.admits(record))
        .filter(|record| needle.is_empty() || matches_query(record, &needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::PackId;

    fn record(
        pack_id: i64,
        pack_title: &str,
        title: &str,
        description: &str,
        keywords: &[&str],
    ) -> EmoticonRecord {
        EmoticonRecord {
            pack_id: PackId::Id(pack_id),
            pack_title: pack_title.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            img_src: format!("images/{}/{}", pack_title, title),
            img_verified: false,
        }
    }

    fn sample() -> Vec<EmoticonRecord> {
        vec![
            record(1, "Cats", "meow.png", "Hello World", &["cute"]),
            record(2, "Dogs", "woof.png", "barking", &["Loud", "happy"]),
            record(1, "Cats", "purr.png", "", &[]),
            record(12, "Birds", "tweet.png", "", &["morning"]),
        ]
    }

    fn titles(records: &[&EmoticonRecord]) -> Vec<String> {
        records.iter().map(|r| r.title.clone()).collect()
    }

    #[test]
    fn test_pack_only() {
        let records = sample();
        let selector = PackSelector::parse("1");
        assert_eq!(titles(&filter(&records, &selector, "")), vec!["meow.png", "purr.png"]);
        assert_eq!(titles(&filter(&records, &selector, "purr")), vec!["purr.png"]);
        assert!(filter(&records, &selector, "woof").is_empty());
    }

    #[test]
    fn test_pack_match_is_exact_text() {
        let records = sample();
        let selected = filter(&records, &PackSelector::parse("12"), "");
        assert_eq!(titles(&selected), vec!["tweet.png"]);
        assert!(filter(&records, &PackSelector::parse("01"), "").is_empty());
    }

    #[test]
    fn test_case_insensitive_description() {
        let records = sample();
        let all = PackSelector::All;
        assert_eq!(titles(&filter(&records, &all, "hello")), vec!["meow.png"]);
        assert_eq!(titles(&filter(&records, &all, "WORLD")), vec!["meow.png"]);
    }

    #[test]
    fn test_each_field_can_match() {
        let records = sample();
        let all = PackSelector::All;
        assert_eq!(titles(&filter(&records, &all, "woof")), vec!["woof.png"]);
        assert_eq!(titles(&filter(&records, &all, "loud")), vec!["woof.png"]);
        assert_eq!(titles(&filter(&records, &all, "bird")), vec!["tweet.png"]);
        assert_eq!(titles(&filter(&records, &all, "cats")), vec!["meow.png", "purr.png"]);
    }

    #[test]
    fn test_substring_not_word_match() {
        let records = sample();
        assert_eq!(titles(&filter(&records, &PackSelector::All, "ppy")), vec!["woof.png"]);
    }

    #[test]
    fn test_empty_query_keeps_order() {
        let records = sample();
        assert_eq!(filter(&records, &PackSelector::All, "   ").len(), records.len());
        assert_eq!(
            titles(&filter(&records, &PackSelector::All, "")),
            vec!["meow.png", "woof.png", "purr.png", "tweet.png"]
        );
    }

    #[test]
    fn test_query_is_trimmed() {
        let records = sample();
        assert_eq!(titles(&filter(&records, &PackSelector::All, "  tweet ")), vec!["tweet.png"]);
    }

    #[test]
    fn test_idempotent() {
        let records = sample();
        let selector = PackSelector::parse("1");
        let run = || -> Vec<EmoticonRecord> {
            filter(&records, &selector, "p").into_iter().cloned().collect()
        };
        let first = run();
        let second = run();
        assert_eq!(first, second);
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!(PackSelector::parse("ALL"), PackSelector::All);
        assert_eq!(PackSelector::parse(""), PackSelector::All);
        assert_eq!(PackSelector::parse(" 3 "), PackSelector::Id("3".into()));
        assert_eq!(PackSelector::Id("3".into()).to_string(), "3");
    }
}
