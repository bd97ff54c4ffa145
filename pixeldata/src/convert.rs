//! Photometric interpretation and planar configuration conversions.

use byteorder::{ByteOrder, LittleEndian};
use snafu::ensure;

#[cfg(feature = "rayon")]
use rayon::iter::ParallelIterator;
#[cfg(feature = "rayon")]
use rayon::slice::ParallelSliceMut;

use dcmpix_core::error::{InvalidPixelDataSnafu, Result};
use dcmpix_core::{PhotometricInterpretation, PlanarConfiguration};

use crate::buffer::{PixelBuffer, TypedView};

/// Rearrange a multi-sample buffer between
/// pixel-major (interleaved) and channel-major (planar) layouts.
///
/// Sample `s` of pixel `i` sits at `i * spp + s` when interleaved
/// and at `s * P + i` when planar,
/// where `P` is the pixel count over all frames.
/// Single-sample buffers and same-to-same requests pass through.
pub fn to_planar_configuration(
    buffer: &PixelBuffer,
    target: PlanarConfiguration,
) -> Result<PixelBuffer> {
    let descriptor = buffer.descriptor();
    if descriptor.samples_per_pixel == 1 || descriptor.planar_configuration == target {
        return Ok(buffer.clone());
    }
    ensure!(
        descriptor.bits_allocated == 8 || descriptor.bits_allocated == 16,
        InvalidPixelDataSnafu {
            field: "bits_allocated",
            expected: "8 or 16",
            actual: descriptor.bits_allocated.to_string(),
        }
    );
    ensure!(
        buffer.data().len() == descriptor.expected_len(),
        InvalidPixelDataSnafu {
            field: "data",
            expected: format!("{} bytes for the described raster", descriptor.expected_len()),
            actual: buffer.data().len().to_string(),
        }
    );

    let samples_per_pixel = usize::from(descriptor.samples_per_pixel);
    let bytes_per_sample = descriptor.bytes_per_sample();
    let pixels = usize::from(descriptor.rows)
        * usize::from(descriptor.columns)
        * descriptor.number_of_frames as usize;

    let src = buffer.data();
    let mut dst = vec![0; src.len()];
    for i in 0..pixels {
        for s in 0..samples_per_pixel {
            let interleaved = (i * samples_per_pixel + s) * bytes_per_sample;
            let planar = (s * pixels + i) * bytes_per_sample;
            let (from, to) = match target {
                PlanarConfiguration::Planar => (interleaved, planar),
                PlanarConfiguration::Interleaved => (planar, interleaved),
            };
            dst[to..to + bytes_per_sample].copy_from_slice(&src[from..from + bytes_per_sample]);
        }
    }

    let mut descriptor = descriptor.clone();
    descriptor.planar_configuration = target;
    Ok(PixelBuffer::from_parts(descriptor, dst))
}

/// Convert a buffer to another photometric interpretation.
///
/// The supported conversions are
/// `RGB` to and from the full-range luma/chroma forms
/// (`YBR_FULL`, `YBR_FULL_422`) on 8-bit samples,
/// and the mutual inversion of the two monochrome interpretations
/// on 8 and 16-bit samples.
/// Everything else, unknown interpretations included,
/// is rejected with `InvalidPixelData`.
pub fn to_photometric_interpretation(
    buffer: &PixelBuffer,
    target: &PhotometricInterpretation,
) -> Result<PixelBuffer> {
    use PhotometricInterpretation::*;

    let source = &buffer.descriptor().photometric_interpretation;
    if source == target {
        return Ok(buffer.clone());
    }

    match (source, target) {
        (Monochrome1, Monochrome2) | (Monochrome2, Monochrome1) => {
            let data = invert_sample_bytes(buffer)?;
            let mut descriptor = buffer.descriptor().clone();
            descriptor.photometric_interpretation = target.clone();
            Ok(PixelBuffer::from_parts(descriptor, data))
        }
        (Rgb, YbrFull) => color_converted(buffer, target, |data, _| {
            for_each_pixel(data, rgb_to_ybr_pixel)
        }),
        (Rgb, YbrFull422) => color_converted(buffer, target, |data, columns| {
            for_each_pixel(data, rgb_to_ybr_pixel);
            average_chroma_pairs(data, columns);
        }),
        (YbrFull, Rgb) => color_converted(buffer, target, |data, _| {
            for_each_pixel(data, ybr_to_rgb_pixel)
        }),
        (YbrFull422, Rgb) => color_converted(buffer, target, |data, columns| {
            share_chroma_pairs(data, columns);
            for_each_pixel(data, ybr_to_rgb_pixel);
        }),
        (source, target) => InvalidPixelDataSnafu {
            field: "photometric_interpretation",
            expected: "a supported conversion pair",
            actual: format!("{} to {}", source, target),
        }
        .fail(),
    }
}

/// Run an 8-bit three-sample conversion over interleaved pixels,
/// preserving the buffer's planar configuration.
fn color_converted(
    buffer: &PixelBuffer,
    target: &PhotometricInterpretation,
    convert: impl Fn(&mut [u8], usize),
) -> Result<PixelBuffer> {
    let descriptor = buffer.descriptor();
    ensure!(
        descriptor.samples_per_pixel == 3 && descriptor.bits_allocated == 8,
        InvalidPixelDataSnafu {
            field: "photometric_interpretation",
            expected: "8-bit data with 3 samples per pixel",
            actual: format!(
                "{} samples at {} bits",
                descriptor.samples_per_pixel, descriptor.bits_allocated
            ),
        }
    );

    let planar = descriptor.planar_configuration;
    let interleaved = to_planar_configuration(buffer, PlanarConfiguration::Interleaved)?;
    let mut data = interleaved.into_vec();
    convert(&mut data, usize::from(descriptor.columns));

    let mut descriptor = descriptor.clone();
    descriptor.photometric_interpretation = target.clone();
    descriptor.planar_configuration = PlanarConfiguration::Interleaved;
    let converted = PixelBuffer::from_parts(descriptor, data);
    to_planar_configuration(&converted, planar)
}

fn for_each_pixel(data: &mut [u8], f: impl Fn(&mut [u8]) + Send + Sync) {
    #[cfg(feature = "rayon")]
    data.par_chunks_exact_mut(3).for_each(|pixel| f(pixel));
    #[cfg(not(feature = "rayon"))]
    data.chunks_exact_mut(3).for_each(|pixel| f(pixel));
}

// ITU-R BT.601 with full-range chroma centered on 128
fn rgb_to_ybr_pixel(pixel: &mut [u8]) {
    let r = f32::from(pixel[0]);
    let g = f32::from(pixel[1]);
    let b = f32::from(pixel[2]);

    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = -0.169 * r - 0.331 * g + 0.5 * b + 128.;
    let cr = 0.5 * r - 0.419 * g - 0.081 * b + 128.;

    pixel[0] = y.round().clamp(0., 255.) as u8;
    pixel[1] = cb.round().clamp(0., 255.) as u8;
    pixel[2] = cr.round().clamp(0., 255.) as u8;
}

fn ybr_to_rgb_pixel(pixel: &mut [u8]) {
    let y = f32::from(pixel[0]);
    let cb = f32::from(pixel[1]) - 128.;
    let cr = f32::from(pixel[2]) - 128.;

    let r = y + 1.402 * cr;
    let g = y - 0.344 * cb - 0.714 * cr;
    let b = y + 1.772 * cb;

    pixel[0] = r.round().clamp(0., 255.) as u8;
    pixel[1] = g.round().clamp(0., 255.) as u8;
    pixel[2] = b.round().clamp(0., 255.) as u8;
}

/// Average Cb and Cr over each horizontal pair of pixels.
///
/// A trailing odd column takes the chroma of the pixel before it;
/// a single-column image keeps its own chroma.
fn average_chroma_pairs(data: &mut [u8], columns: usize) {
    if columns < 2 {
        return;
    }
    for row in data.chunks_exact_mut(columns * 3) {
        let mut col = 0;
        while col + 1 < columns {
            for channel in 1..3 {
                let a = u16::from(row[col * 3 + channel]);
                let b = u16::from(row[(col + 1) * 3 + channel]);
                let mean = ((a + b) / 2) as u8;
                row[col * 3 + channel] = mean;
                row[(col + 1) * 3 + channel] = mean;
            }
            col += 2;
        }
        if col < columns {
            row[col * 3 + 1] = row[(col - 1) * 3 + 1];
            row[col * 3 + 2] = row[(col - 1) * 3 + 2];
        }
    }
}

/// Propagate each pair's first chroma sample onto the second,
/// so both pixels of a pair decode with the shared value.
fn share_chroma_pairs(data: &mut [u8], columns: usize) {
    if columns < 2 {
        return;
    }
    for row in data.chunks_exact_mut(columns * 3) {
        let mut col = 0;
        while col + 1 < columns {
            row[(col + 1) * 3 + 1] = row[col * 3 + 1];
            row[(col + 1) * 3 + 2] = row[col * 3 + 2];
            col += 2;
        }
    }
}

/// Value-invert every sample against the stored-bit maximum,
/// returning the inverted payload bytes.
pub(crate) fn invert_sample_bytes(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let descriptor = buffer.descriptor();
    ensure!(
        descriptor.samples_per_pixel == 1,
        InvalidPixelDataSnafu {
            field: "samples_per_pixel",
            expected: "grayscale data",
            actual: descriptor.samples_per_pixel.to_string(),
        }
    );
    let max_stored = (1i64 << descriptor.bits_stored) - 1;

    match buffer.typed_view()? {
        TypedView::U8(samples) => Ok(samples
            .into_iter()
            .map(|v| (max_stored - i64::from(v)).clamp(0, 0xFF) as u8)
            .collect()),
        TypedView::I8(samples) => Ok(samples
            .into_iter()
            .map(|v| (max_stored - i64::from(v)).clamp(i64::from(i8::MIN), i64::from(i8::MAX)) as i8 as u8)
            .collect()),
        TypedView::U16(samples) => {
            let inverted: Vec<u16> = samples
                .into_iter()
                .map(|v| (max_stored - i64::from(v)).clamp(0, 0xFFFF) as u16)
                .collect();
            let mut data = vec![0u8; inverted.len() * 2];
            LittleEndian::write_u16_into(&inverted, &mut data);
            Ok(data)
        }
        TypedView::I16(samples) => {
            let inverted: Vec<i16> = samples
                .into_iter()
                .map(|v| {
                    (max_stored - i64::from(v)).clamp(i64::from(i16::MIN), i64::from(i16::MAX))
                        as i16
                })
                .collect();
            let mut data = vec![0u8; inverted.len() * 2];
            LittleEndian::write_i16_into(&inverted, &mut data);
            Ok(data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PixelBufferBuilder;

    fn rgb_buffer(samples: Vec<u8>, rows: u16, columns: u16) -> PixelBuffer {
        PixelBuffer::from_rgb8(samples, rows, columns).unwrap()
    }

    /// Interleaved to planar and back is bit-identical.
    #[test]
    fn planar_round_trip_is_lossless() {
        let buffer = rgb_buffer((0..24).collect(), 2, 4);
        let planar = to_planar_configuration(&buffer, PlanarConfiguration::Planar).unwrap();
        assert_eq!(
            planar.descriptor().planar_configuration,
            PlanarConfiguration::Planar
        );
        let back = to_planar_configuration(&planar, PlanarConfiguration::Interleaved).unwrap();
        assert_eq!(back.data(), buffer.data());
    }

    #[test]
    fn planar_rearranges_channels() {
        let buffer = rgb_buffer(vec![1, 2, 3, 4, 5, 6], 1, 2);
        let planar = to_planar_configuration(&buffer, PlanarConfiguration::Planar).unwrap();
        assert_eq!(planar.data(), &[1, 4, 2, 5, 3, 6]);
    }

    /// RGB to YBR_FULL and back stays within 2 levels per channel.
    #[test]
    fn rgb_ybr_round_trip_is_close() {
        let samples: Vec<u8> = vec![
            255, 0, 0, 0, 255, 0, 0, 0, 255, //
            255, 255, 255, 0, 0, 0, 128, 64, 200, //
            10, 250, 30, 90, 90, 90, 17, 203, 111,
        ];
        let buffer = rgb_buffer(samples.clone(), 3, 3);
        let ybr =
            to_photometric_interpretation(&buffer, &PhotometricInterpretation::YbrFull).unwrap();
        let back =
            to_photometric_interpretation(&ybr, &PhotometricInterpretation::Rgb).unwrap();

        for (index, (a, b)) in samples.iter().zip(back.data()).enumerate() {
            let diff = (i16::from(*a) - i16::from(*b)).abs();
            assert!(diff <= 2, "sample {} differs by {}", index, diff);
        }
    }

    /// The 422 form shares one chroma value per horizontal pair.
    #[test]
    fn ybr_422_shares_chroma_over_pairs() {
        let buffer = rgb_buffer(vec![255, 0, 0, 250, 0, 0, 0, 0, 255, 10, 0, 255], 1, 4);
        let ybr =
            to_photometric_interpretation(&buffer, &PhotometricInterpretation::YbrFull422).unwrap();

        let data = ybr.data();
        // pair 0: identical chroma
        assert_eq!(data[1], data[4]);
        assert_eq!(data[2], data[5]);
        // pair 1: identical chroma, distinct from pair 0
        assert_eq!(data[7], data[10]);
        assert_eq!(data[8], data[11]);
        assert_ne!(data[2], data[8]);
    }

    /// A trailing odd column duplicates the previous pixel's chroma.
    #[test]
    fn ybr_422_odd_width_duplicates_chroma() {
        let buffer = rgb_buffer(vec![255, 0, 0, 250, 0, 0, 0, 255, 0], 1, 3);
        let ybr =
            to_photometric_interpretation(&buffer, &PhotometricInterpretation::YbrFull422).unwrap();

        let data = ybr.data();
        assert_eq!(data[7], data[4]);
        assert_eq!(data[8], data[5]);

        // and the conversion back reads every output byte
        let back = to_photometric_interpretation(&ybr, &PhotometricInterpretation::Rgb).unwrap();
        assert_eq!(back.data().len(), 9);
    }

    /// MONOCHROME2 to MONOCHROME1 and back is bit-identical.
    #[test]
    fn monochrome_round_trip_is_lossless() {
        let buffer = PixelBuffer::from_mono16(&[0, 1, 1000, 4095], 2, 2).unwrap();
        let mut buffer = PixelBuffer::from_parts(
            {
                let mut d = buffer.descriptor().clone();
                d.bits_stored = 12;
                d.high_bit = 11;
                d
            },
            buffer.data().to_vec(),
        );

        let inverted =
            to_photometric_interpretation(&buffer, &PhotometricInterpretation::Monochrome1)
                .unwrap();
        match inverted.typed_view().unwrap() {
            TypedView::U16(samples) => assert_eq!(samples, vec![4095, 4094, 3095, 0]),
            other => panic!("unexpected view: {:?}", other),
        }

        let back =
            to_photometric_interpretation(&inverted, &PhotometricInterpretation::Monochrome2)
                .unwrap();
        assert_eq!(back.data(), buffer.data());
        buffer = back;
        assert_eq!(
            buffer.descriptor().photometric_interpretation,
            PhotometricInterpretation::Monochrome2
        );
    }

    #[test]
    fn unsupported_pairs_are_rejected() {
        let buffer = rgb_buffer(vec![0; 12], 2, 2);
        assert!(
            to_photometric_interpretation(&buffer, &PhotometricInterpretation::PaletteColor)
                .is_err()
        );

        // 16-bit color is out of range for the BT.601 path
        let buffer = PixelBufferBuilder::new()
            .rows(1)
            .columns(2)
            .bits_allocated(16)
            .samples_per_pixel(3)
            .photometric_interpretation("RGB")
            .data(vec![0; 12])
            .build()
            .unwrap();
        assert!(
            to_photometric_interpretation(&buffer, &PhotometricInterpretation::YbrFull).is_err()
        );
    }
}
