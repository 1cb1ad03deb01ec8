//! Canonical tag sets and the number/total normalisation of both tag shapes.

use std::collections::btree_map;
use std::collections::BTreeMap;

use id3::{Tag, TagLike};

use super::{first_value, text_frame};

pub(crate) const TOTAL_SEPARATOR: char = '/';

/// A number field, its total field and the frame holding both as `N/M`.
pub(crate) struct NumberPair {
    pub number_field: &'static str,
    pub total_field: &'static str,
    pub frame_id: &'static str,
}

pub(crate) const NUMBER_PAIRS: [NumberPair; 2] = [
    NumberPair {
        number_field: "tracknumber",
        total_field: "tracktotal",
        frame_id: "TRCK",
    },
    NumberPair {
        number_field: "discnumber",
        total_field: "disctotal",
        frame_id: "TPOS",
    },
];

/// Field name to ordered values. Equality is key-set equality with
/// order-sensitive value lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(BTreeMap<String, Vec<String>>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any values already stored under `field`.
    pub fn insert(&mut self, field: impl Into<String>, values: Vec<String>) {
        self.0.insert(field.into(), values);
    }

    /// Appends one value, keeping earlier values for the same field.
    pub fn push(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(value.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits combined `N/M` number values into separate number and total fields.
    pub fn split_totals(mut self) -> Self {
        for pair in &NUMBER_PAIRS {
            let split = self
                .get(pair.number_field)
                .and_then(|values| values.first())
                .and_then(|value| value.split_once(TOTAL_SEPARATOR))
                .map(|(number, total)| (number.to_string(), total.to_string()));

            if let Some((number, total)) = split {
                self.insert(pair.number_field, vec![number]);
                self.insert(pair.total_field, vec![total]);
            }
        }
        self
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = btree_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Folds a `TXXX` total into its number frame as `N/M`. A total with no
/// number frame is left as a user frame.
pub(crate) fn merge_totals(tag: &mut Tag) {
    for pair in &NUMBER_PAIRS {
        let total = tag
            .extended_texts()
            .find(|t| t.description == pair.total_field)
            .map(|t| first_value(&t.value).to_string());
        let number = tag
            .get(pair.frame_id)
            .and_then(|frame| frame.content().text())
            .map(|text| {
                let number = first_value(text);
                number
                    .split_once(TOTAL_SEPARATOR)
                    .map_or(number, |(n, _)| n)
                    .to_string()
            });

        if let (Some(number), Some(total)) = (number, total) {
            tag.add_frame(text_frame(
                pair.frame_id,
                format!("{number}{TOTAL_SEPARATOR}{total}"),
            ));
            tag.remove_extended_text(Some(pair.total_field), None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use id3::frame::ExtendedText;
    use pretty_assertions::assert_eq;

    fn set(pairs: &[(&str, &[&str])]) -> TagSet {
        pairs
            .iter()
            .map(|(k, vs)| (*k, vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn splits_track_and_disc_independently() {
        let fields = set(&[("tracknumber", &["3/12"]), ("discnumber", &["1"])]).split_totals();
        assert_eq!(
            fields,
            set(&[("tracknumber", &["3"]), ("tracktotal", &["12"]), ("discnumber", &["1"])])
        );
    }

    #[test]
    fn split_uses_first_separator_only() {
        let fields = set(&[("discnumber", &["1/2/3"])]).split_totals();
        assert_eq!(fields.get("discnumber").unwrap(), &["1".to_string()]);
        assert_eq!(fields.get("disctotal").unwrap(), &["2/3".to_string()]);
    }

    #[test]
    fn equality_is_order_sensitive_within_a_key() {
        let a = set(&[("artist", &["A", "B"]), ("title", &["T"])]);
        let b = set(&[("title", &["T"]), ("artist", &["A", "B"])]);
        let c = set(&[("artist", &["B", "A"]), ("title", &["T"])]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn merge_replaces_a_stale_total_in_the_number_frame() {
        let mut tag = Tag::new();
        tag.set_text("TPOS", "2/9");
        tag.add_frame(ExtendedText {
            description: "disctotal".to_string(),
            value: "3".to_string(),
        });

        merge_totals(&mut tag);

        assert_eq!(tag.get("TPOS").and_then(|f| f.content().text()), Some("2/3"));
        assert_eq!(tag.extended_texts().count(), 0);
    }

    #[test]
    fn frames_fold_total_into_number_frame() {
        let mut tag = Tag::new();
        tag.set_text("TRCK", "3");
        tag.add_frame(ExtendedText {
            description: "tracktotal".to_string(),
            value: "12".to_string(),
        });
        tag.add_frame(ExtendedText {
            description: "disctotal".to_string(),
            value: "2".to_string(),
        });

        merge_totals(&mut tag);

        assert_eq!(tag.get("TRCK").and_then(|f| f.content().text()), Some("3/12"));
        assert_eq!(tag.extended_texts().count(), 1, "disctotal stays without TPOS");
    }
}
