//! Parsing of encapsulated pixel data into offset table and fragments.
//!
//! Encapsulated pixel data is a sequence of length-prefixed items:
//! a leading basic offset table item,
//! followed by one fragment item per compressed chunk,
//! closed by a sequence delimitation item.
//! [`FragmentStream::parse`] walks that sequence
//! and [`FragmentStream::frame_fragments`] groups fragments into frames
//! with the offset table when one is present.

use byteorder::{ByteOrder, LittleEndian};
use snafu::OptionExt;
use tracing::warn;

use dcmpix_core::error::{InvalidPixelDataSnafu, Result};

/// The item tag group of every encapsulation item.
const ITEM_GROUP: u16 = 0xFFFE;
/// The element number of an item start.
const ITEM: u16 = 0xE000;
/// The element number of the sequence delimitation item.
const SEQUENCE_DELIMITER: u16 = 0xE0DD;

/// A single fragment of an encapsulated pixel data element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// the fragment's bytes, without the item header
    pub data: Vec<u8>,
    /// absolute offset of the fragment's item header
    /// within the pixel data byte stream
    pub start_offset: u64,
}

/// The outcome of splitting an encapsulated pixel data element:
/// a basic offset table (possibly empty) and the fragment items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentStream {
    basic_offset_table: Vec<u32>,
    fragments: Vec<Fragment>,
}

/// One raw item header: element number and body length.
fn read_item_header(src: &[u8], at: usize) -> Result<(u16, u32)> {
    let header = src.get(at..at + 8).with_context(|| InvalidPixelDataSnafu {
        field: "pixel data item",
        expected: format!("8-byte item header at offset {}", at),
        actual: format!("{} bytes left", src.len() - at),
    })?;
    let group = LittleEndian::read_u16(&header[0..2]);
    let element = LittleEndian::read_u16(&header[2..4]);
    let length = LittleEndian::read_u32(&header[4..8]);
    snafu::ensure!(
        group == ITEM_GROUP,
        InvalidPixelDataSnafu {
            field: "pixel data item",
            expected: format!("item tag group {:04X}", ITEM_GROUP),
            actual: format!("{:04X}", group),
        }
    );
    Ok((element, length))
}

impl FragmentStream {
    /// Split an encapsulated pixel data byte stream
    /// into its basic offset table and fragments.
    ///
    /// The first item must be the basic offset table
    /// (of zero length when absent),
    /// every subsequent item is a fragment,
    /// and the walk stops at the sequence delimitation item.
    pub fn parse(src: &[u8]) -> Result<Self> {
        let mut pos = 0usize;

        // basic offset table item
        let (element, length) = read_item_header(src, pos)?;
        snafu::ensure!(
            element == ITEM,
            InvalidPixelDataSnafu {
                field: "basic offset table",
                expected: format!("item element {:04X}", ITEM),
                actual: format!("{:04X}", element),
            }
        );
        let length = length as usize;
        pos += 8;
        let table_data = src.get(pos..pos + length).with_context(|| InvalidPixelDataSnafu {
            field: "basic offset table",
            expected: format!("{} bytes of table data", length),
            actual: format!("{} bytes left", src.len() - pos),
        })?;
        snafu::ensure!(
            length % 4 == 0,
            InvalidPixelDataSnafu {
                field: "basic offset table",
                expected: "a length which is a multiple of 4",
                actual: length.to_string(),
            }
        );
        let mut basic_offset_table = vec![0u32; length / 4];
        LittleEndian::read_u32_into(table_data, &mut basic_offset_table);
        pos += length;

        // fragment items until the sequence delimiter
        let mut fragments = Vec::new();
        loop {
            let start_offset = pos as u64;
            let (element, length) = read_item_header(src, pos)?;
            pos += 8;
            match element {
                SEQUENCE_DELIMITER => {
                    if length != 0 {
                        warn!("non-empty sequence delimitation item (length {})", length);
                    }
                    if pos < src.len() {
                        warn!(
                            "{} trailing bytes after the sequence delimitation item",
                            src.len() - pos
                        );
                    }
                    break;
                }
                ITEM => {
                    let length = length as usize;
                    let data =
                        src.get(pos..pos + length)
                            .with_context(|| InvalidPixelDataSnafu {
                                field: format!("pixel data fragment #{}", fragments.len()),
                                expected: format!("{} bytes of fragment data", length),
                                actual: format!("{} bytes left", src.len() - pos),
                            })?;
                    fragments.push(Fragment {
                        data: data.to_vec(),
                        start_offset,
                    });
                    pos += length;
                }
                other => {
                    return InvalidPixelDataSnafu {
                        field: "pixel data item",
                        expected: format!("item element {:04X} or {:04X}", ITEM, SEQUENCE_DELIMITER),
                        actual: format!("{:04X}", other),
                    }
                    .fail()
                }
            }
        }

        Ok(FragmentStream {
            basic_offset_table,
            fragments,
        })
    }

    /// The basic offset table entries,
    /// each an offset relative to the first fragment's item start.
    #[inline]
    pub fn basic_offset_table(&self) -> &[u32] {
        &self.basic_offset_table
    }

    /// The fragment items, in stream order.
    #[inline]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// The fragments which make up the frame at the given index.
    ///
    /// With an empty offset table, each fragment is one complete frame.
    /// Otherwise the table entry pair `[offset[i], offset[i + 1])`
    /// (the end of the last frame being the end of the last fragment)
    /// delimits the frame in table space,
    /// and every fragment starting inside that range belongs to the frame.
    pub fn frame_fragments(&self, frame_index: u32) -> Result<Vec<&[u8]>> {
        let index = frame_index as usize;

        if self.basic_offset_table.is_empty() {
            let fragment =
                self.fragments
                    .get(index)
                    .with_context(|| InvalidPixelDataSnafu {
                        field: format!("frame #{}", frame_index),
                        expected: format!("a fragment index below {}", self.fragments.len()),
                        actual: index.to_string(),
                    })?;
            return Ok(vec![&fragment.data[..]]);
        }

        let first = self
            .fragments
            .first()
            .with_context(|| InvalidPixelDataSnafu {
                field: format!("frame #{}", frame_index),
                expected: "at least one pixel data fragment",
                actual: "none",
            })?;
        let offset = *self
            .basic_offset_table
            .get(index)
            .with_context(|| InvalidPixelDataSnafu {
                field: format!("frame #{}", frame_index),
                expected: format!(
                    "a frame index below {}",
                    self.basic_offset_table.len()
                ),
                actual: index.to_string(),
            })?;
        let end = match self.basic_offset_table.get(index + 1) {
            Some(&next) => u64::from(next),
            None => {
                // the absolute end of the final fragment, in table space
                let last = self.fragments.last().unwrap_or(first);
                last.start_offset - first.start_offset + 8 + last.data.len() as u64
            }
        };

        let range = u64::from(offset)..end;
        let selected: Vec<_> = self
            .fragments
            .iter()
            .filter(|f| range.contains(&(f.start_offset - first.start_offset)))
            .map(|f| &f.data[..])
            .collect();
        snafu::ensure!(
            !selected.is_empty(),
            InvalidPixelDataSnafu {
                field: format!("frame #{}", frame_index),
                expected: format!("fragments in table range {:?}", range),
                actual: "none",
            }
        );
        Ok(selected)
    }

    /// Concatenate the fragments of a frame into one contiguous byte vector,
    /// suitable as codec input.
    pub fn frame_data(&self, frame_index: u32) -> Result<Vec<u8>> {
        let fragments = self.frame_fragments(frame_index)?;
        Ok(fragments.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an encapsulated stream from an offset table and fragments.
    fn encapsulate(table: &[u32], fragments: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xFFFEu16.to_le_bytes());
        out.extend_from_slice(&ITEM.to_le_bytes());
        out.extend_from_slice(&((table.len() * 4) as u32).to_le_bytes());
        for offset in table {
            out.extend_from_slice(&offset.to_le_bytes());
        }
        for fragment in fragments {
            out.extend_from_slice(&0xFFFEu16.to_le_bytes());
            out.extend_from_slice(&ITEM.to_le_bytes());
            out.extend_from_slice(&(fragment.len() as u32).to_le_bytes());
            out.extend_from_slice(fragment);
        }
        out.extend_from_slice(&0xFFFEu16.to_le_bytes());
        out.extend_from_slice(&SEQUENCE_DELIMITER.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out
    }

    #[test]
    fn parse_without_offset_table() {
        let src = encapsulate(&[], &[&[1, 2, 3, 4], &[5, 6], &[7, 8]]);
        let stream = FragmentStream::parse(&src).unwrap();

        assert!(stream.basic_offset_table().is_empty());
        assert_eq!(stream.fragments().len(), 3);
        assert_eq!(stream.fragments()[0].data, vec![1, 2, 3, 4]);
        assert_eq!(stream.fragments()[0].start_offset, 8);
        assert_eq!(stream.fragments()[1].start_offset, 8 + 8 + 4);
    }

    /// Without an offset table, each fragment is one whole frame,
    /// and an out-of-range frame request is rejected.
    #[test]
    fn frame_grouping_without_table() {
        let src = encapsulate(&[], &[&[1, 2], &[3, 4], &[5, 6]]);
        let stream = FragmentStream::parse(&src).unwrap();

        assert_eq!(stream.frame_fragments(0).unwrap(), vec![&[1u8, 2][..]]);
        assert_eq!(stream.frame_fragments(2).unwrap(), vec![&[5u8, 6][..]]);
        assert!(stream.frame_fragments(3).is_err());
    }

    /// With an offset table, all fragments in the frame's range are collected.
    #[test]
    fn frame_grouping_with_table() {
        // frame 0: two 4-byte fragments (items of 12 bytes each);
        // frame 1: one 4-byte fragment starting at table offset 24
        let src = encapsulate(&[0, 24], &[&[1; 4], &[2; 4], &[3; 4]]);
        let stream = FragmentStream::parse(&src).unwrap();

        assert_eq!(
            stream.frame_fragments(0).unwrap(),
            vec![&[1u8; 4][..], &[2u8; 4][..]]
        );
        assert_eq!(stream.frame_fragments(1).unwrap(), vec![&[3u8; 4][..]]);
        assert_eq!(stream.frame_data(0).unwrap().len(), 8);
        assert!(stream.frame_fragments(2).is_err());
    }

    #[test]
    fn rejects_foreign_items() {
        // an item with an unexpected element number after the table
        let mut src = encapsulate(&[], &[&[1, 2]]);
        // corrupt the fragment's element number
        src[10] = 0xAD;
        assert!(FragmentStream::parse(&src).is_err());

        // an item not starting with the FFFE group
        let mut src = encapsulate(&[], &[&[1, 2]]);
        src[1] = 0x00;
        assert!(FragmentStream::parse(&src).is_err());
    }

    #[test]
    fn rejects_truncation() {
        let src = encapsulate(&[], &[&[1, 2, 3, 4]]);
        // cut inside the fragment body
        assert!(FragmentStream::parse(&src[..12]).is_err());
        // cut inside an item header
        assert!(FragmentStream::parse(&src[..src.len() - 4]).is_err());
        // missing delimiter
        assert!(FragmentStream::parse(&src[..src.len() - 8]).is_err());
    }

    #[test]
    fn rejects_misaligned_offset_table() {
        let mut src = Vec::new();
        src.extend_from_slice(&0xFFFEu16.to_le_bytes());
        src.extend_from_slice(&ITEM.to_le_bytes());
        src.extend_from_slice(&6u32.to_le_bytes());
        src.extend_from_slice(&[0; 6]);
        src.extend_from_slice(&0xFFFEu16.to_le_bytes());
        src.extend_from_slice(&SEQUENCE_DELIMITER.to_le_bytes());
        src.extend_from_slice(&0u32.to_le_bytes());
        assert!(FragmentStream::parse(&src).is_err());
    }

    #[test]
    fn empty_sequence_parses() {
        // offset table with zero length and no fragments
        let src = encapsulate(&[], &[]);
        let stream = FragmentStream::parse(&src).unwrap();
        assert!(stream.basic_offset_table().is_empty());
        assert!(stream.fragments().is_empty());
        assert!(stream.frame_fragments(0).is_err());
    }
}
