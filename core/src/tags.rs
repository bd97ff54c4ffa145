//! Attribute tag constants used by the pixel data subsystem.
//!
//! Only the imaging-related subset of the data dictionary is declared here;
//! the values are the standard DICOM tag numbers.

use crate::Tag;

/// (0002,0010) Transfer Syntax UID
pub const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);

/// (0028,0002) Samples per Pixel
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
/// (0028,0004) Photometric Interpretation
pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);
/// (0028,0006) Planar Configuration
pub const PLANAR_CONFIGURATION: Tag = Tag(0x0028, 0x0006);
/// (0028,0008) Number of Frames
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
/// (0028,0010) Rows
pub const ROWS: Tag = Tag(0x0028, 0x0010);
/// (0028,0011) Columns
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
/// (0028,0100) Bits Allocated
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
/// (0028,0101) Bits Stored
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
/// (0028,0102) High Bit
pub const HIGH_BIT: Tag = Tag(0x0028, 0x0102);
/// (0028,0103) Pixel Representation
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);

/// (0028,1050) Window Center
pub const WINDOW_CENTER: Tag = Tag(0x0028, 0x1050);
/// (0028,1051) Window Width
pub const WINDOW_WIDTH: Tag = Tag(0x0028, 0x1051);
/// (0028,1052) Rescale Intercept
pub const RESCALE_INTERCEPT: Tag = Tag(0x0028, 0x1052);
/// (0028,1053) Rescale Slope
pub const RESCALE_SLOPE: Tag = Tag(0x0028, 0x1053);
/// (0028,1054) Rescale Type
pub const RESCALE_TYPE: Tag = Tag(0x0028, 0x1054);

/// (0028,1101) Red Palette Color Lookup Table Descriptor
pub const RED_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR: Tag = Tag(0x0028, 0x1101);
/// (0028,1102) Green Palette Color Lookup Table Descriptor
pub const GREEN_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR: Tag = Tag(0x0028, 0x1102);
/// (0028,1103) Blue Palette Color Lookup Table Descriptor
pub const BLUE_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR: Tag = Tag(0x0028, 0x1103);
/// (0028,1201) Red Palette Color Lookup Table Data
pub const RED_PALETTE_COLOR_LOOKUP_TABLE_DATA: Tag = Tag(0x0028, 0x1201);
/// (0028,1202) Green Palette Color Lookup Table Data
pub const GREEN_PALETTE_COLOR_LOOKUP_TABLE_DATA: Tag = Tag(0x0028, 0x1202);
/// (0028,1203) Blue Palette Color Lookup Table Data
pub const BLUE_PALETTE_COLOR_LOOKUP_TABLE_DATA: Tag = Tag(0x0028, 0x1203);
/// (0028,1221) Segmented Red Palette Color Lookup Table Data
pub const SEGMENTED_RED_PALETTE_COLOR_LOOKUP_TABLE_DATA: Tag = Tag(0x0028, 0x1221);
/// (0028,1222) Segmented Green Palette Color Lookup Table Data
pub const SEGMENTED_GREEN_PALETTE_COLOR_LOOKUP_TABLE_DATA: Tag = Tag(0x0028, 0x1222);
/// (0028,1223) Segmented Blue Palette Color Lookup Table Data
pub const SEGMENTED_BLUE_PALETTE_COLOR_LOOKUP_TABLE_DATA: Tag = Tag(0x0028, 0x1223);

/// (0028,2000) ICC Profile
pub const ICC_PROFILE: Tag = Tag(0x0028, 0x2000);

/// (2050,0010) Presentation LUT Sequence
pub const PRESENTATION_LUT_SEQUENCE: Tag = Tag(0x2050, 0x0010);
/// (2050,0020) Presentation LUT Shape
pub const PRESENTATION_LUT_SHAPE: Tag = Tag(0x2050, 0x0020);

/// (7FE0,0010) Pixel Data
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);
