/// Still images handed to the normalizer
pub mod picked_image;
/// Decoded symbols
pub mod scan_result;

pub use picked_image::{ImageHandle, NormalizeOptions, OutputFormat, PickedImage, Rotation};
pub use scan_result::{RawSymbol, ScanResult, SymbolType};
