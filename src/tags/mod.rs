//! Translation between Vorbis-style fields and ID3v2 frames.
//!
//! Both sides are reduced to a [`TagSet`] before comparison: mapped frames
//! take their field name from the mapping table, other frames are keyed by
//! their description, and frames in the ignore set are dropped.

pub mod canonical;
pub mod frames;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use id3::frame::{Comment, Content, ExtendedText};
use id3::{Encoding, Frame, Tag, TagLike, Version};
use log::warn;

use crate::config::Config;
use crate::{Result, SyncError};

pub use canonical::TagSet;
pub use frames::FrameKind;

use canonical::{merge_totals, NUMBER_PAIRS};

const VALUE_SEPARATOR: char = '\0';
/// Language code written on new comment frames.
const COMMENT_LANG: &str = "XXX";

pub(crate) fn first_value(text: &str) -> &str {
    text.split(VALUE_SEPARATOR).next().unwrap_or(text)
}

fn split_values(text: &str) -> Vec<String> {
    text.split(VALUE_SEPARATOR).map(str::to_string).collect()
}

fn join_values(values: &[String]) -> String {
    values.join(&VALUE_SEPARATOR.to_string())
}

fn utf8(frame: Frame) -> Frame {
    frame.set_encoding(Some(Encoding::UTF8))
}

pub(crate) fn text_frame(id: &str, text: impl Into<String>) -> Frame {
    utf8(Frame::text(id, text))
}

fn frame_description(content: &Content) -> Option<&str> {
    match content {
        Content::ExtendedText(et) => Some(&et.description),
        Content::Comment(c) => Some(&c.description),
        Content::Lyrics(l) => Some(&l.description),
        Content::ExtendedLink(el) => Some(&el.description),
        Content::Picture(p) => Some(&p.description),
        _ => None,
    }
}

fn frame_values(content: &Content) -> Option<Vec<String>> {
    match content {
        Content::Text(text) => Some(split_values(text)),
        Content::ExtendedText(et) => Some(split_values(&et.value)),
        Content::Comment(c) => Some(split_values(&c.text)),
        Content::Lyrics(l) => Some(split_values(&l.text)),
        Content::Link(link) => Some(vec![link.clone()]),
        Content::ExtendedLink(el) => Some(vec![el.link.clone()]),
        _ => None,
    }
}

/// Reads the ID3 tag of `path`; a file without one yields an empty tag.
pub fn read_id3(path: &Path) -> Result<Tag> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(tag),
        Err(e) if matches!(e.kind, id3::ErrorKind::NoTag) => Ok(Tag::new()),
        Err(e) => Err(e.into()),
    }
}

/// Mapping table resolved once at startup.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    to_frame: BTreeMap<String, FrameKind>,
    to_field: HashMap<&'static str, String>,
    ignore_frames: BTreeSet<String>,
}

impl Canonicalizer {
    pub fn new(
        field_map: &BTreeMap<String, String>,
        ignore_frames: &BTreeSet<String>,
    ) -> Result<Self> {
        let mut to_frame = BTreeMap::new();
        let mut to_field = HashMap::new();

        for (field, frame_id) in field_map {
            let field = field.to_lowercase();
            if NUMBER_PAIRS.iter().any(|p| p.total_field == field) {
                return Err(SyncError::Config(format!(
                    "'{field}' must not be mapped; it is merged into its number frame"
                )));
            }

            let kind = FrameKind::resolve(frame_id)?;
            if let Some(other) = to_field.insert(kind.id(), field.clone()) {
                return Err(SyncError::Config(format!(
                    "'{other}' and '{field}' both map to {frame_id}"
                )));
            }
            to_frame.insert(field, kind);
        }

        Ok(Self {
            to_frame,
            to_field,
            ignore_frames: ignore_frames.clone(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.field_map, &config.ignore_frames)
    }

    fn frame_for(&self, field: &str, values: &[String]) -> Frame {
        let text = join_values(values);
        match self.to_frame.get(field) {
            Some(FrameKind::Text(id)) => text_frame(id, text),
            Some(FrameKind::Comment) => utf8(
                Comment {
                    lang: COMMENT_LANG.to_string(),
                    description: String::new(),
                    text,
                }
                .into(),
            ),
            None => utf8(
                ExtendedText {
                    description: field.to_string(),
                    value: text,
                }
                .into(),
            ),
        }
    }

    /// Adds every field to `tag` as a frame, replacing frames with the same
    /// identity, then folds totals into the number frames.
    pub fn fields_to_frames(&self, fields: &TagSet, mut tag: Tag) -> Tag {
        for (field, values) in fields {
            tag.add_frame(self.frame_for(field, values));
        }
        merge_totals(&mut tag);
        tag
    }

    /// Canonical field view of an ID3 tag.
    pub fn frames_to_fields(&self, tag: &Tag) -> TagSet {
        let mut fields = TagSet::new();

        for frame in tag.frames() {
            let id = frame.id();
            let field = if let Some(field) = self.to_field.get(id) {
                field.clone()
            } else if self.ignore_frames.contains(id) {
                continue;
            } else if let Some(description) = frame_description(frame.content()) {
                description.to_string()
            } else {
                warn!(
                    "Ignored {id} frame in {} - {}",
                    tag.artist().unwrap_or_default(),
                    tag.title().unwrap_or_default()
                );
                continue;
            };

            let Some(values) = frame_values(frame.content()) else {
                warn!(
                    "Ignored {id} frame in {} - {}",
                    tag.artist().unwrap_or_default(),
                    tag.title().unwrap_or_default()
                );
                continue;
            };

            fields.insert(field, values);
        }

        fields.split_totals()
    }

    pub fn read_mp3(&self, path: &Path) -> Result<TagSet> {
        Ok(self.frames_to_fields(&read_id3(path)?))
    }

    /// Writes `fields` onto the mp3 at `path` in place as ID3v2.4.
    pub fn write_mp3(&self, path: &Path, fields: &TagSet) -> Result<()> {
        let tag = self.fields_to_frames(fields, read_id3(path)?);
        tag.write_to_path(path, Version::Id3v24)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use id3::frame::Popularimeter;
    use pretty_assertions::assert_eq;

    fn canonicalizer() -> Canonicalizer {
        Canonicalizer::from_config(&Config::default()).unwrap()
    }

    fn set(pairs: &[(&str, &[&str])]) -> TagSet {
        pairs
            .iter()
            .map(|(k, vs)| (*k, vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn round_trip_through_frames_keeps_fields() {
        let c = canonicalizer();
        let fields = set(&[
            ("artist", &["Someone", "Someone Else"]),
            ("title", &["Song"]),
            ("comment", &["nice"]),
            ("tracknumber", &["3"]),
            ("tracktotal", &["12"]),
            ("discnumber", &["1"]),
            ("disctotal", &["2"]),
            ("musicbrainz_trackid", &["abc"]),
        ]);

        let tag = c.fields_to_frames(&fields, Tag::new());

        assert_eq!(tag.get("TRCK").and_then(|f| f.content().text()), Some("3/12"));
        assert_eq!(tag.get("TPOS").and_then(|f| f.content().text()), Some("1/2"));
        assert!(tag.extended_texts().all(|t| !t.description.ends_with("total")));
        assert_eq!(c.frames_to_fields(&tag), fields);
    }

    #[test]
    fn total_without_number_stays_a_user_frame() {
        let c = canonicalizer();
        let fields = set(&[("tracktotal", &["12"])]);

        let tag = c.fields_to_frames(&fields, Tag::new());

        assert!(tag.get("TRCK").is_none());
        assert_eq!(c.frames_to_fields(&tag), fields);
    }

    #[test]
    fn ignored_frames_are_dropped() {
        let c = canonicalizer();
        let mut tag = Tag::new();
        tag.set_text("TSSE", "LAME 3.100");
        tag.set_text("TIT2", "Song");

        assert_eq!(c.frames_to_fields(&tag), set(&[("title", &["Song"])]));
    }

    #[test]
    fn frames_without_text_are_skipped() {
        let c = canonicalizer();
        let mut tag = Tag::new();
        tag.set_text("TPE1", "Someone");
        tag.add_frame(Frame::with_content(
            "POPM",
            Content::Popularimeter(Popularimeter {
                user: "me@example.com".to_string(),
                rating: 200,
                counter: 4,
            }),
        ));

        assert_eq!(c.frames_to_fields(&tag), set(&[("artist", &["Someone"])]));
    }

    #[test]
    fn unmapped_text_frame_is_skipped_without_description() {
        let c = canonicalizer();
        let mut tag = Tag::new();
        tag.set_text("TMOO", "calm");

        assert!(c.frames_to_fields(&tag).is_empty());
    }

    #[test]
    fn existing_target_frames_are_replaced() {
        let c = canonicalizer();
        let mut tag = Tag::new();
        tag.set_text("TIT2", "Old");
        tag.set_text("TRCK", "9/9");

        let tag = c.fields_to_frames(&set(&[("title", &["New"]), ("tracknumber", &["2"])]), tag);

        assert_eq!(
            c.frames_to_fields(&tag),
            set(&[("title", &["New"]), ("tracknumber", &["2"])])
        );
    }

    #[test]
    fn mapping_errors_are_fatal() {
        let ignore = BTreeSet::new();
        let bad_frame: BTreeMap<_, _> = [("artist".to_string(), "ZZZZ".to_string())].into();
        assert!(matches!(
            Canonicalizer::new(&bad_frame, &ignore),
            Err(SyncError::Config(_))
        ));

        let twice: BTreeMap<_, _> = [
            ("artist".to_string(), "TPE1".to_string()),
            ("performer".to_string(), "TPE1".to_string()),
        ]
        .into();
        assert!(matches!(Canonicalizer::new(&twice, &ignore), Err(SyncError::Config(_))));

        let total: BTreeMap<_, _> = [("tracktotal".to_string(), "TRCK".to_string())].into();
        assert!(matches!(Canonicalizer::new(&total, &ignore), Err(SyncError::Config(_))));
    }

    #[test]
    fn tags_survive_a_file_write() {
        let c = canonicalizer();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not really audio").unwrap();

        assert!(c.read_mp3(file.path()).unwrap().is_empty());

        let fields = set(&[("album", &["Record"]), ("tracknumber", &["1"]), ("tracktotal", &["8"])]);
        c.write_mp3(file.path(), &fields).unwrap();

        assert_eq!(c.read_mp3(file.path()).unwrap(), fields);
    }

    #[test]
    fn multi_value_fields_survive_a_file_write() {
        let c = canonicalizer();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not really audio").unwrap();
        let fields = set(&[
            ("artist", &["Björk", "Someone Else"]),
            ("genre", &["Electronic", "Pop"]),
            ("comment", &["first", "second"]),
            ("date", &["1997"]),
            ("discnumber", &["1"]),
            ("disctotal", &["2"]),
            ("mood", &["calm", "dark"]),
        ]);

        c.write_mp3(file.path(), &fields).unwrap();

        let tag = read_id3(file.path()).unwrap();
        assert_eq!(tag.get("TPOS").and_then(|f| f.content().text()), Some("1/2"));
        assert_eq!(c.read_mp3(file.path()).unwrap(), fields);
    }
}
