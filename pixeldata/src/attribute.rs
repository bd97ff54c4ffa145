//! Utility module for fetching key attributes from a data set.

use snafu::OptionExt;

use dcmpix_core::error::{
    InvalidPixelDataSnafu, MissingRequiredAttributeSnafu, PixelDataNotFoundSnafu, Result,
};
use dcmpix_core::{
    tags, Dataset, Element, PhotometricInterpretation, PixelRepresentation, PlanarConfiguration,
    Tag,
};

fn required<'a, D: Dataset>(ds: &'a D, tag: Tag, name: &'static str) -> Result<&'a Element> {
    ds.get(tag).context(MissingRequiredAttributeSnafu { name, tag })
}

fn required_u16<D: Dataset>(ds: &D, tag: Tag, name: &'static str) -> Result<u16> {
    required(ds, tag, name)?
        .to_u16()
        .with_context(|| InvalidPixelDataSnafu {
            field: name,
            expected: "an unsigned 16-bit integer",
            actual: format!("{:?}", ds.get(tag).map(Element::value)),
        })
}

/// Get the Rows from the data set
pub fn rows<D: Dataset>(ds: &D) -> Result<u16> {
    required_u16(ds, tags::ROWS, "Rows")
}

/// Get the Columns from the data set
pub fn columns<D: Dataset>(ds: &D) -> Result<u16> {
    required_u16(ds, tags::COLUMNS, "Columns")
}

/// Get the BitsAllocated from the data set
pub fn bits_allocated<D: Dataset>(ds: &D) -> Result<u16> {
    required_u16(ds, tags::BITS_ALLOCATED, "BitsAllocated")
}

/// Get the BitsStored from the data set
pub fn bits_stored<D: Dataset>(ds: &D) -> Result<u16> {
    required_u16(ds, tags::BITS_STORED, "BitsStored")
}

/// Get the HighBit from the data set
pub fn high_bit<D: Dataset>(ds: &D) -> Result<u16> {
    required_u16(ds, tags::HIGH_BIT, "HighBit")
}

/// Get the SamplesPerPixel from the data set
pub fn samples_per_pixel<D: Dataset>(ds: &D) -> Result<u16> {
    required_u16(ds, tags::SAMPLES_PER_PIXEL, "SamplesPerPixel")
}

/// Get the PixelRepresentation from the data set
pub fn pixel_representation<D: Dataset>(ds: &D) -> Result<PixelRepresentation> {
    let code = required_u16(ds, tags::PIXEL_REPRESENTATION, "PixelRepresentation")?;
    PixelRepresentation::from_code(code).with_context(|| InvalidPixelDataSnafu {
        field: "PixelRepresentation",
        expected: "0 or 1",
        actual: code.to_string(),
    })
}

/// Get the PhotometricInterpretation from the data set
pub fn photometric_interpretation<D: Dataset>(ds: &D) -> Result<PhotometricInterpretation> {
    let element = required(
        ds,
        tags::PHOTOMETRIC_INTERPRETATION,
        "PhotometricInterpretation",
    )?;
    let value = element.string().with_context(|| InvalidPixelDataSnafu {
        field: "PhotometricInterpretation",
        expected: "a code string",
        actual: format!("{:?}", element.value()),
    })?;
    Ok(PhotometricInterpretation::from(value.trim()))
}

/// Get the PlanarConfiguration from the data set, interleaved by default
pub fn planar_configuration<D: Dataset>(ds: &D) -> PlanarConfiguration {
    ds.get(tags::PLANAR_CONFIGURATION)
        .and_then(Element::to_u16)
        .and_then(PlanarConfiguration::from_code)
        .unwrap_or(PlanarConfiguration::Interleaved)
}

/// Get the NumberOfFrames from the data set, 1 by default.
///
/// The attribute may arrive as an integer or as a decimal string;
/// both forms are accepted.
pub fn number_of_frames<D: Dataset>(ds: &D) -> Result<u32> {
    match ds.get(tags::NUMBER_OF_FRAMES) {
        None => Ok(1),
        Some(element) => {
            let frames = element.to_i64().with_context(|| InvalidPixelDataSnafu {
                field: "NumberOfFrames",
                expected: "an integer or decimal string",
                actual: format!("{:?}", element.value()),
            })?;
            if frames >= 1 && frames <= i64::from(u32::MAX) {
                Ok(frames as u32)
            } else {
                InvalidPixelDataSnafu {
                    field: "NumberOfFrames",
                    expected: "a positive frame count",
                    actual: frames.to_string(),
                }
                .fail()
            }
        }
    }
}

/// Get the TransferSyntaxUID from the data set
pub fn transfer_syntax_uid<D: Dataset>(ds: &D) -> Result<String> {
    let element = required(ds, tags::TRANSFER_SYNTAX_UID, "TransferSyntaxUID")?;
    element
        .string()
        .map(|s| s.trim_end_matches(|c: char| c.is_whitespace() || c == '\0').to_string())
        .with_context(|| InvalidPixelDataSnafu {
            field: "TransferSyntaxUID",
            expected: "a UID string",
            actual: format!("{:?}", element.value()),
        })
}

/// Get the PixelData element from the data set
pub fn pixel_data<D: Dataset>(ds: &D) -> Result<&Element> {
    ds.get(tags::PIXEL_DATA).context(PixelDataNotFoundSnafu)
}

/// Get the RescaleSlope from the data set, 1.0 by default
pub fn rescale_slope<D: Dataset>(ds: &D) -> f64 {
    ds.get(tags::RESCALE_SLOPE)
        .and_then(Element::to_f64)
        .unwrap_or(1.0)
}

/// Get the RescaleIntercept from the data set, 0.0 by default
pub fn rescale_intercept<D: Dataset>(ds: &D) -> f64 {
    ds.get(tags::RESCALE_INTERCEPT)
        .and_then(Element::to_f64)
        .unwrap_or(0.0)
}

/// Get the RescaleType from the data set, if any
pub fn rescale_type<D: Dataset>(ds: &D) -> Option<String> {
    ds.get(tags::RESCALE_TYPE)
        .and_then(Element::string)
        .map(|s| s.trim().to_string())
}

/// Get the first WindowCenter from the data set, if any
pub fn window_center<D: Dataset>(ds: &D) -> Option<f64> {
    ds.get(tags::WINDOW_CENTER).and_then(Element::to_f64)
}

/// Get the first WindowWidth from the data set, if any
pub fn window_width<D: Dataset>(ds: &D) -> Option<f64> {
    ds.get(tags::WINDOW_WIDTH).and_then(Element::to_f64)
}

/// Get the PresentationLUTShape from the data set, if any
pub fn presentation_lut_shape<D: Dataset>(ds: &D) -> Option<String> {
    ds.get(tags::PRESENTATION_LUT_SHAPE)
        .and_then(Element::string)
        .map(|s| s.trim().to_string())
}

/// Get the raw ICC Profile bytes from the data set, if any
pub fn icc_profile<D: Dataset>(ds: &D) -> Option<&[u8]> {
    ds.get(tags::ICC_PROFILE).and_then(Element::bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmpix_core::{Error, MemDataset};

    #[test]
    fn required_attributes_report_name_and_tag() {
        let ds = MemDataset::new();
        match rows(&ds) {
            Err(Error::MissingRequiredAttribute { name, tag, .. }) => {
                assert_eq!(name, "Rows");
                assert_eq!(tag, tags::ROWS);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(matches!(pixel_data(&ds), Err(Error::PixelDataNotFound { .. })));
    }

    #[test]
    fn number_of_frames_integer_and_decimal_string() {
        let ds = MemDataset::new();
        assert_eq!(number_of_frames(&ds).unwrap(), 1);

        let ds = MemDataset::new().with_int(tags::NUMBER_OF_FRAMES, 12);
        assert_eq!(number_of_frames(&ds).unwrap(), 12);

        let ds = MemDataset::new().with_str(tags::NUMBER_OF_FRAMES, "12");
        assert_eq!(number_of_frames(&ds).unwrap(), 12);

        let ds = MemDataset::new().with_str(tags::NUMBER_OF_FRAMES, "12.0");
        assert_eq!(number_of_frames(&ds).unwrap(), 12);

        let ds = MemDataset::new().with_int(tags::NUMBER_OF_FRAMES, 0);
        assert!(number_of_frames(&ds).is_err());
    }

    #[test]
    fn defaults_apply() {
        let ds = MemDataset::new();
        assert_eq!(planar_configuration(&ds), PlanarConfiguration::Interleaved);
        assert_eq!(rescale_slope(&ds), 1.0);
        assert_eq!(rescale_intercept(&ds), 0.0);
        assert_eq!(window_center(&ds), None);
    }

    #[test]
    fn transfer_syntax_uid_is_unpadded() {
        let ds = MemDataset::new().with_str(tags::TRANSFER_SYNTAX_UID, "1.2.840.10008.1.2.1\0");
        assert_eq!(transfer_syntax_uid(&ds).unwrap(), "1.2.840.10008.1.2.1");
    }
}
