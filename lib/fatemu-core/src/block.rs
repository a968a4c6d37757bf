//! Block records.
//!
//! ```toml
//! payload = "once upon a time the"
//! next_ref = "story.1.blk"
//! is_last = false
//! ```
//!
//! `is_last` is redundant with `next_ref` being empty, but both are kept
//! and must agree.
use serde::{Deserialize, Serialize};

use crate::{BlockRef, FatError, MAX_BLOCK, Result};

#[derive(Serialize, Deserialize)]
struct BlockRecord {
    payload: String,
    next_ref: String,
    is_last: bool,
}

/// A fragment of file content plus a forward link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Block {
    pub payload: String,
    pub next: Option<BlockRef>,
    pub is_last: bool,
}

impl Block {
    fn check(&self) -> std::result::Result<(), String> {
        let len = self.payload.chars().count();
        if len > MAX_BLOCK {
            return Err(format!("payload has {len} characters, max is {MAX_BLOCK}"));
        }
        if self.is_last != self.next.is_none() {
            return Err(format!(
                "is_last = {} disagrees with next_ref = {:?}",
                self.is_last,
                BlockRef::to_persisted(self.next.as_ref())
            ));
        }

        Ok(())
    }

    /// Serialize to the text stored under `record`.
    pub fn encode(&self, record: &str) -> Result<String> {
        self.check().map_err(FatError::validation)?;

        let raw = BlockRecord {
            payload: self.payload.clone(),
            next_ref: BlockRef::to_persisted(self.next.as_ref()),
            is_last: self.is_last,
        };
        toml::to_string(&raw).map_err(|err| FatError::format(record, err))
    }

    /// Parse the text stored under `record`.
    pub fn decode(record: &str, text: &str) -> Result<Self> {
        let raw: BlockRecord = toml::from_str(text).map_err(|err| FatError::format(record, err))?;

        let block = Self {
            payload: raw.payload,
            next: BlockRef::from_persisted(raw.next_ref),
            is_last: raw.is_last,
        };
        block
            .check()
            .map_err(|reason| FatError::format(record, reason))?;

        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_err(text: &str) -> String {
        match Block::decode("t.0.blk", text) {
            Err(FatError::Format { record, reason }) => {
                assert_eq!("t.0.blk", record);
                reason
            }
            other => panic!("expected a format error, got {other:?}"),
        }
    }

    #[test]
    fn decode_valid() {
        let block = Block::decode(
            "t.0.blk",
            "payload = \"hello\"\nnext_ref = \"t.1.blk\"\nis_last = false\n",
        )
        .unwrap();
        assert_eq!("hello", block.payload);
        assert_eq!(Some("t.1.blk"), block.next.as_ref().map(BlockRef::as_str));
        assert!(!block.is_last);

        let tail =
            Block::decode("t.1.blk", "payload = \"\"\nnext_ref = \"\"\nis_last = true\n").unwrap();
        assert!(tail.next.is_none());
        assert!(tail.is_last);
    }

    #[test]
    fn payload_survives_quoting() {
        let block = Block {
            payload: "say \"hi\"\n\\ tab\tÿ€".to_owned(),
            next: None,
            is_last: true,
        };
        let text = block.encode("q.0.blk").unwrap();
        assert_eq!(block, Block::decode("q.0.blk", &text).unwrap());
    }

    #[test]
    fn decode_rejects_missing_fields() {
        decode_err("payload = \"x\"\nis_last = true\n");
        decode_err("next_ref = \"\"\nis_last = true\n");
        decode_err("payload = \"x\"\nnext_ref = \"\"\n");
        decode_err("not toml at all {");
    }

    #[test]
    fn decode_rejects_oversized_payload() {
        let text = format!(
            "payload = \"{}\"\nnext_ref = \"\"\nis_last = true\n",
            "x".repeat(MAX_BLOCK + 1)
        );
        assert!(decode_err(&text).contains("max is 20"));

        // Characters, not bytes.
        let text = format!(
            "payload = \"{}\"\nnext_ref = \"\"\nis_last = true\n",
            "é".repeat(MAX_BLOCK)
        );
        assert_eq!(MAX_BLOCK, Block::decode("t.0.blk", &text).unwrap().payload.chars().count());
    }

    #[test]
    fn decode_rejects_inconsistent_terminator() {
        decode_err("payload = \"x\"\nnext_ref = \"t.1.blk\"\nis_last = true\n");
        decode_err("payload = \"x\"\nnext_ref = \"\"\nis_last = false\n");
    }

    #[test]
    fn encode_rejects_invalid_block() {
        let block = Block {
            payload: "x".repeat(MAX_BLOCK + 1),
            next: None,
            is_last: true,
        };
        assert!(matches!(block.encode("t.0.blk"), Err(FatError::Validation(_))));

        let block = Block {
            payload: "x".to_owned(),
            next: None,
            is_last: false,
        };
        assert!(matches!(block.encode("t.0.blk"), Err(FatError::Validation(_))));
    }
}
