use crate::{Result, SyncError};

/// Standard ID3v2.4 text information frames, `TXXX` excluded.
const TEXT_FRAME_IDS: &[&str] = &[
    "TALB", "TBPM", "TCOM", "TCON", "TCOP", "TDEN", "TDLY", "TDOR", "TDRC", "TDRL", "TDTG",
    "TENC", "TEXT", "TFLT", "TIPL", "TIT1", "TIT2", "TIT3", "TKEY", "TLAN", "TLEN", "TMCL",
    "TMED", "TMOO", "TOAL", "TOFN", "TOLY", "TOPE", "TOWN", "TPE1", "TPE2", "TPE3", "TPE4",
    "TPOS", "TPRO", "TPUB", "TRCK", "TRSN", "TRSO", "TSO2", "TSOA", "TSOC", "TSOP", "TSOT",
    "TSRC", "TSSE", "TSST", "TCMP",
];

pub const COMMENT_FRAME_ID: &str = "COMM";

/// Frame a mapped field is written as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    Text(&'static str),
    Comment,
}

impl FrameKind {
    /// Fails on ids that are not a text frame or `COMM`.
    pub fn resolve(id: &str) -> Result<Self> {
        if id == COMMENT_FRAME_ID {
            return Ok(FrameKind::Comment);
        }
        TEXT_FRAME_IDS
            .iter()
            .copied()
            .find(|known| *known == id)
            .map(FrameKind::Text)
            .ok_or_else(|| SyncError::Config(format!("'{id}' is not a valid frame type")))
    }

    pub fn id(&self) -> &'static str {
        match self {
            FrameKind::Text(id) => *id,
            FrameKind::Comment => COMMENT_FRAME_ID,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_text_and_comment_frames() {
        assert_eq!(FrameKind::resolve("TPE1").unwrap(), FrameKind::Text("TPE1"));
        assert_eq!(FrameKind::resolve("COMM").unwrap(), FrameKind::Comment);
        assert_eq!(FrameKind::Comment.id(), "COMM");
    }

    #[test]
    fn rejects_unknown_and_user_frames() {
        for id in ["XXXX", "TXXX", "tpe1", "APIC", ""] {
            assert!(matches!(FrameKind::resolve(id), Err(SyncError::Config(_))), "{id}");
        }
    }
}
