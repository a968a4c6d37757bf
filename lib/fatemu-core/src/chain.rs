//! Block chains: splitting content into linked block records, walking
//! them back into content, and freeing them.
//!
//! Write order matters, as it is the only crash-safety this scheme has:
//! blocks are written tail first, so every `next_ref` that reaches the
//! store points at a block that is already there. A crash in the middle of
//! `write_chain` leaves unreferenced blocks behind, never a dangling link.

use record_store::RecordStore;
use std::io::ErrorKind;

use crate::block::Block;
use crate::layout::block_record_name;
use crate::{BlockRef, ChainBreak, FatError, MAX_BLOCK, Result};

/// The outcome of freeing a chain.
#[derive(Debug)]
pub(crate) struct FreeReport {
    /// Block records removed.
    pub freed: usize,
    /// Why the walk stopped before reaching the terminal block, if it did.
    pub incomplete: Option<FatError>,
}

pub(crate) struct ChainAllocator<'a> {
    store: &'a mut dyn RecordStore,
    max_hops: usize,
}

/// Consecutive fragments of at most MAX_BLOCK characters, in order.
fn split_content(content: &str) -> Vec<String> {
    let chars: Vec<char> = content.chars().collect();
    chars
        .chunks(MAX_BLOCK)
        .map(|fragment| fragment.iter().collect())
        .collect()
}

/// The number of blocks `write_chain` would use for `content`.
pub(crate) fn blocks_needed(content: &str) -> usize {
    content.chars().count().div_ceil(MAX_BLOCK)
}

impl<'a> ChainAllocator<'a> {
    pub fn new(store: &'a mut dyn RecordStore, max_hops: usize) -> Self {
        Self { store, max_hops }
    }

    /// Write `content` as a new chain of blocks named after `base_name`.
    /// Returns the head reference, or None for empty content.
    pub fn write_chain(&mut self, content: &str, base_name: &str) -> Result<Option<BlockRef>> {
        let fragments = split_content(content);
        if fragments.is_empty() {
            return Ok(None);
        }
        if fragments.len() > self.max_hops {
            return Err(FatError::validation(format!(
                "content needs {} blocks, the limit is {}",
                fragments.len(),
                self.max_hops
            )));
        }

        let names: Vec<String> = (0..fragments.len())
            .map(|idx| block_record_name(base_name, idx))
            .collect();
        let num_blocks = fragments.len();

        // Tail first: block idx is written only after block idx + 1 exists.
        for (idx, payload) in fragments.into_iter().enumerate().rev() {
            let block = Block {
                payload,
                next: names.get(idx + 1).cloned().map(BlockRef::new),
                is_last: idx == num_blocks - 1,
            };
            let text = block.encode(&names[idx])?;
            log::trace!("write block {}", names[idx]);
            self.store.write(&names[idx], &text)?;
        }

        log::debug!("wrote chain '{base_name}': {num_blocks} block(s)");
        Ok(Some(BlockRef::new(names[0].clone())))
    }

    fn load_block(&self, block_ref: &BlockRef, last_good: Option<&BlockRef>) -> Result<Block> {
        let text = self.store.read(block_ref.as_str()).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                FatError::BrokenChain {
                    last_good: last_good.cloned(),
                    missing: block_ref.clone(),
                    cause: ChainBreak::MissingBlock,
                }
            } else {
                FatError::Store(err)
            }
        })?;

        Block::decode(block_ref.as_str(), &text)
    }

    /// Walk the chain from `head` and concatenate the payloads.
    /// Any break in the chain is an error; partial content is never returned.
    pub fn read_chain(&self, head: Option<&BlockRef>) -> Result<String> {
        let mut content = String::new();
        let mut last_good: Option<BlockRef> = None;
        let mut next = head.cloned();
        let mut hops = 0;

        while let Some(current) = next {
            if hops == self.max_hops {
                return Err(FatError::BrokenChain {
                    last_good,
                    missing: current,
                    cause: ChainBreak::TooManyHops,
                });
            }
            hops += 1;

            let block = self.load_block(&current, last_good.as_ref())?;
            content.push_str(&block.payload);
            if block.is_last {
                break;
            }
            next = block.next;
            last_good = Some(current);
        }

        Ok(content)
    }

    /// Remove every block of the chain starting at `head`.
    ///
    /// Best effort: a missing or undecodable block ends the walk (there is
    /// no way to find the rest of the chain) and is reported, not returned
    /// as an error. Only store failures are errors.
    pub fn free_chain(&mut self, head: Option<&BlockRef>) -> Result<FreeReport> {
        let mut report = FreeReport {
            freed: 0,
            incomplete: None,
        };
        let mut last_good: Option<BlockRef> = None;
        let mut next = head.cloned();
        let mut hops = 0;

        while let Some(current) = next.take() {
            if hops == self.max_hops {
                report.incomplete = Some(FatError::BrokenChain {
                    last_good,
                    missing: current,
                    cause: ChainBreak::TooManyHops,
                });
                break;
            }
            hops += 1;

            match self.load_block(&current, last_good.as_ref()) {
                Ok(block) => next = block.next,
                Err(err @ FatError::BrokenChain { .. }) => {
                    report.incomplete = Some(err);
                    break;
                }
                Err(err @ FatError::Format { .. }) => {
                    // Still ours to remove, but the rest of the chain is lost.
                    report.incomplete = Some(err);
                }
                Err(err) => return Err(err),
            }

            log::trace!("delete block {current}");
            match self.store.delete(current.as_str()) {
                Ok(()) => report.freed += 1,
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    log::warn!("block '{current}' vanished while being freed");
                }
                Err(err) => return Err(err.into()),
            }
            last_good = Some(current);
        }

        if let Some(err) = report.incomplete.as_ref() {
            log::warn!("freed {} block(s), chain incomplete: {err}", report.freed);
        } else {
            log::debug!("freed {} block(s)", report.freed);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use record_store::MemRecordStore;

    fn put_block(store: &mut MemRecordStore, name: &str, payload: &str, next: Option<&str>) {
        let block = Block {
            payload: payload.to_owned(),
            next: next.map(|n| BlockRef::new(n.to_owned())),
            is_last: next.is_none(),
        };
        store.write(name, &block.encode(name).unwrap()).unwrap();
    }

    #[test]
    fn split() {
        assert!(split_content("").is_empty());
        assert_eq!(vec!["abc"], split_content("abc"));
        let fragments = split_content(&"x".repeat(45));
        assert_eq!(vec![20, 20, 5], fragments.iter().map(|f| f.len()).collect::<Vec<_>>());
        assert_eq!(1, split_content(&"ñ".repeat(20)).len());
        assert_eq!(2, split_content(&"ñ".repeat(21)).len());
        for len in [0, 1, 19, 20, 21, 45, 400] {
            let content = "y".repeat(len);
            assert_eq!(split_content(&content).len(), blocks_needed(&content));
        }
    }

    #[test]
    fn write_read_free() {
        let mut store = MemRecordStore::new();
        let mut chain = ChainAllocator::new(&mut store, 100);

        let content = "The quick brown fox jumps over the lazy dog.";
        let head = chain.write_chain(content, "fox").unwrap();
        assert_eq!(Some("fox.0.blk"), head.as_ref().map(BlockRef::as_str));
        assert_eq!(content, chain.read_chain(head.as_ref()).unwrap());

        let report = chain.free_chain(head.as_ref()).unwrap();
        assert_eq!(3, report.freed);
        assert!(report.incomplete.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn empty_content_has_no_chain() {
        let mut store = MemRecordStore::new();
        let mut chain = ChainAllocator::new(&mut store, 100);
        assert_eq!(None, chain.write_chain("", "void").unwrap());
        assert_eq!("", chain.read_chain(None).unwrap());
        assert_eq!(0, chain.free_chain(None).unwrap().freed);
        assert!(store.is_empty());
    }

    #[test]
    fn too_long_for_hop_limit() {
        let mut store = MemRecordStore::new();
        let mut chain = ChainAllocator::new(&mut store, 2);
        assert!(chain.write_chain(&"x".repeat(40), "ok").unwrap().is_some());
        assert!(matches!(
            chain.write_chain(&"x".repeat(41), "big"),
            Err(FatError::Validation(_))
        ));
        // Rejected before anything was written.
        assert!(store.list(".blk").unwrap().iter().all(|n| n.starts_with("ok.")));
    }

    #[test]
    fn cycle_is_bounded() {
        let mut store = MemRecordStore::new();
        put_block(&mut store, "a.0.blk", "ping", Some("a.1.blk"));
        put_block(&mut store, "a.1.blk", "pong", Some("a.0.blk"));
        let head = BlockRef::new("a.0.blk".to_owned());

        let mut chain = ChainAllocator::new(&mut store, 16);
        match chain.read_chain(Some(&head)) {
            Err(FatError::BrokenChain { cause, missing, .. }) => {
                assert_eq!(ChainBreak::TooManyHops, cause);
                assert_eq!("a.0.blk", missing.as_str());
            }
            other => panic!("expected a broken chain, got {other:?}"),
        }

        // Freeing a cycle stops when it comes back to a removed block.
        let report = chain.free_chain(Some(&head)).unwrap();
        assert_eq!(2, report.freed);
        assert!(matches!(
            report.incomplete,
            Some(FatError::BrokenChain {
                cause: ChainBreak::MissingBlock,
                ..
            })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn free_skips_past_missing_block() {
        let mut store = MemRecordStore::new();
        put_block(&mut store, "m.0.blk", "one", Some("m.1.blk"));
        put_block(&mut store, "m.2.blk", "three", None);
        let head = BlockRef::new("m.0.blk".to_owned());

        let mut chain = ChainAllocator::new(&mut store, 16);
        let report = chain.free_chain(Some(&head)).unwrap();
        assert_eq!(1, report.freed);
        match report.incomplete {
            Some(FatError::BrokenChain {
                last_good, missing, ..
            }) => {
                assert_eq!(Some("m.0.blk"), last_good.as_ref().map(BlockRef::as_str));
                assert_eq!("m.1.blk", missing.as_str());
            }
            other => panic!("unexpected {other:?}"),
        }
        // Unreachable past the gap.
        assert_eq!(vec!["m.2.blk".to_owned()], store.names());
    }

    #[test]
    fn free_removes_undecodable_block() {
        let mut store = MemRecordStore::new();
        put_block(&mut store, "g.0.blk", "one", Some("g.1.blk"));
        store.write("g.1.blk", "garbage").unwrap();
        let head = BlockRef::new("g.0.blk".to_owned());

        let mut chain = ChainAllocator::new(&mut store, 16);
        assert!(matches!(
            chain.read_chain(Some(&head)),
            Err(FatError::Format { ref record, .. }) if record == "g.1.blk"
        ));
        let report = chain.free_chain(Some(&head)).unwrap();
        assert_eq!(2, report.freed);
        assert!(matches!(report.incomplete, Some(FatError::Format { .. })));
        assert!(store.is_empty());
    }
}
