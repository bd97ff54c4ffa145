//! Palette color lookup and segmented LUT expansion.

use snafu::{ensure, OptionExt};
use tracing::warn;

use dcmpix_core::error::{InvalidPixelDataSnafu, MissingRequiredAttributeSnafu, Result};
use dcmpix_core::{tags, Dataset, Element, PhotometricInterpretation, PixelRepresentation, Tag};

use crate::buffer::{PixelBuffer, TypedView};

/// One palette channel:
/// its descriptor triplet and the expanded 16-bit table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LutChannel {
    /// the number of entries in the table
    pub entries: usize,
    /// the stored sample value mapped onto the first entry
    pub first_mapped: u16,
    /// the bit depth of the stored entries
    pub bits: u16,
    /// the table data
    pub data: Vec<u16>,
}

impl LutChannel {
    /// Look up a stored sample value.
    ///
    /// Out-of-range values yield 0.
    fn lookup(&self, value: i64) -> u16 {
        let index = value - i64::from(self.first_mapped);
        if (0..self.data.len() as i64).contains(&index) {
            self.data[index as usize]
        } else {
            0
        }
    }
}

/// The three palette color channels of a data set,
/// segmented tables already expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteColorLut {
    red: LutChannel,
    green: LutChannel,
    blue: LutChannel,
}

impl PaletteColorLut {
    /// Read the palette from the data set's
    /// lookup table descriptor and data attributes.
    ///
    /// Flat table data is used when present,
    /// otherwise the segmented form is expanded.
    pub fn from_dataset<D: Dataset>(ds: &D) -> Result<Self> {
        Ok(PaletteColorLut {
            red: read_channel(
                ds,
                "RedPaletteColorLookupTable",
                tags::RED_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR,
                tags::RED_PALETTE_COLOR_LOOKUP_TABLE_DATA,
                tags::SEGMENTED_RED_PALETTE_COLOR_LOOKUP_TABLE_DATA,
            )?,
            green: read_channel(
                ds,
                "GreenPaletteColorLookupTable",
                tags::GREEN_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR,
                tags::GREEN_PALETTE_COLOR_LOOKUP_TABLE_DATA,
                tags::SEGMENTED_GREEN_PALETTE_COLOR_LOOKUP_TABLE_DATA,
            )?,
            blue: read_channel(
                ds,
                "BluePaletteColorLookupTable",
                tags::BLUE_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR,
                tags::BLUE_PALETTE_COLOR_LOOKUP_TABLE_DATA,
                tags::SEGMENTED_BLUE_PALETTE_COLOR_LOOKUP_TABLE_DATA,
            )?,
        })
    }

    /// The red channel.
    pub fn red(&self) -> &LutChannel {
        &self.red
    }

    /// The green channel.
    pub fn green(&self) -> &LutChannel {
        &self.green
    }

    /// The blue channel.
    pub fn blue(&self) -> &LutChannel {
        &self.blue
    }

    /// Map a `PALETTE COLOR` buffer through the three channels
    /// into 8-bit interleaved RGB,
    /// taking the high byte of each 16-bit table entry.
    pub fn apply(&self, buffer: &PixelBuffer) -> Result<PixelBuffer> {
        let descriptor = buffer.descriptor();
        ensure!(
            descriptor.photometric_interpretation == PhotometricInterpretation::PaletteColor
                && descriptor.samples_per_pixel == 1,
            InvalidPixelDataSnafu {
                field: "photometric_interpretation",
                expected: "single-sample PALETTE COLOR data",
                actual: format!(
                    "{} with {} samples per pixel",
                    descriptor.photometric_interpretation, descriptor.samples_per_pixel
                ),
            }
        );

        let samples: Vec<i64> = match buffer.typed_view()? {
            TypedView::U8(v) => v.into_iter().map(i64::from).collect(),
            TypedView::U16(v) => v.into_iter().map(i64::from).collect(),
            TypedView::I8(_) | TypedView::I16(_) => {
                return InvalidPixelDataSnafu {
                    field: "pixel_representation",
                    expected: "unsigned palette indices",
                    actual: "signed samples",
                }
                .fail()
            }
        };

        let mut data = Vec::with_capacity(samples.len() * 3);
        for value in samples {
            data.push((self.red.lookup(value) >> 8) as u8);
            data.push((self.green.lookup(value) >> 8) as u8);
            data.push((self.blue.lookup(value) >> 8) as u8);
        }

        let mut descriptor = descriptor.clone();
        descriptor.bits_allocated = 8;
        descriptor.bits_stored = 8;
        descriptor.high_bit = 7;
        descriptor.samples_per_pixel = 3;
        descriptor.photometric_interpretation = PhotometricInterpretation::Rgb;
        descriptor.pixel_representation = PixelRepresentation::Unsigned;
        Ok(PixelBuffer::from_parts(descriptor, data))
    }
}

fn read_channel<D: Dataset>(
    ds: &D,
    name: &'static str,
    descriptor_tag: Tag,
    data_tag: Tag,
    segmented_tag: Tag,
) -> Result<LutChannel> {
    let descriptor = ds
        .get(descriptor_tag)
        .context(MissingRequiredAttributeSnafu {
            name,
            tag: descriptor_tag,
        })?
        .to_u16s()
        .with_context(|| InvalidPixelDataSnafu {
            field: name,
            expected: "a three-value descriptor",
            actual: "an incompatible value",
        })?;
    ensure!(
        descriptor.len() == 3,
        InvalidPixelDataSnafu {
            field: name,
            expected: "a three-value descriptor",
            actual: format!("{} values", descriptor.len()),
        }
    );
    // a zero entry count conventionally means 65536 entries
    let entries = match descriptor[0] {
        0 => 0x1_0000,
        n => usize::from(n),
    };
    let first_mapped = descriptor[1];
    let bits = descriptor[2];

    let data = match ds.get(data_tag).and_then(Element::to_u16s) {
        Some(flat) => flat,
        None => {
            let words = ds
                .get(segmented_tag)
                .and_then(Element::to_u16s)
                .with_context(|| InvalidPixelDataSnafu {
                    field: name,
                    expected: "flat or segmented lookup table data",
                    actual: "neither attribute",
                })?;
            expand_segmented_lut(&words)?
        }
    };
    if data.len() != entries {
        warn!(
            "{} holds {} entries, {} declared",
            name,
            data.len(),
            entries
        );
    }

    Ok(LutChannel {
        entries,
        first_mapped,
        bits,
        data,
    })
}

/// Expand a segmented lookup table opcode stream into a flat table.
///
/// Each opcode word carries the segment type in its high byte
/// and the segment length in its low byte:
/// type 0 copies the next `length` words verbatim,
/// type 1 interpolates `length` samples from the last emitted value
/// towards an endpoint word,
/// type 2 re-emits `length` already-expanded entries
/// starting at an offset word.
pub fn expand_segmented_lut(words: &[u16]) -> Result<Vec<u16>> {
    let mut out = Vec::new();
    let mut position = 0usize;

    let take = |position: &mut usize, n: usize| -> Result<std::ops::Range<usize>> {
        let start = *position;
        let end = start + n;
        ensure!(
            end <= words.len(),
            InvalidPixelDataSnafu {
                field: "segmented LUT",
                expected: format!("{} more words at word {}", n, start),
                actual: format!("{} words in total", words.len()),
            }
        );
        *position = end;
        Ok(start..end)
    };

    while position < words.len() {
        let opcode = words[position];
        position += 1;
        let segment_type = opcode >> 8;
        let length = usize::from(opcode & 0xFF);

        match segment_type {
            // discrete: copy the next `length` words
            0 => {
                let range = take(&mut position, length)?;
                out.extend_from_slice(&words[range]);
            }
            // linear: interpolate from the last emitted value
            1 => {
                let range = take(&mut position, 1)?;
                let end_value = f64::from(words[range.start]);
                let start_value = f64::from(*out.last().with_context(|| {
                    InvalidPixelDataSnafu {
                        field: "segmented LUT",
                        expected: "a previous entry before a linear segment",
                        actual: "an empty table",
                    }
                })?);
                for j in 0..length {
                    let fraction = j as f64 / length as f64;
                    let value = start_value + fraction * (end_value - start_value);
                    out.push(value.round() as u16);
                }
            }
            // indirect: re-emit already-expanded entries
            2 => {
                let range = take(&mut position, 1)?;
                let offset = usize::from(words[range.start]);
                ensure!(
                    offset + length <= out.len(),
                    InvalidPixelDataSnafu {
                        field: "segmented LUT",
                        expected: format!("a source range within {} expanded entries", out.len()),
                        actual: format!("offset {} with length {}", offset, length),
                    }
                );
                let copied: Vec<u16> = out[offset..offset + length].to_vec();
                out.extend_from_slice(&copied);
            }
            other => {
                return InvalidPixelDataSnafu {
                    field: "segmented LUT",
                    expected: "segment type 0, 1, or 2",
                    actual: other.to_string(),
                }
                .fail()
            }
        }
    }

    Ok(out)
}
