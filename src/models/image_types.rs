use base64::Engine;

/// A normalized upload ready for classification: orientation-corrected,
/// at most 640 px wide, alpha flattened onto white, re-encoded as JPEG.
///
/// Only `image_processor::prepare_image` constructs these, so anything
/// downstream can assume the normalization already happened.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PreparedImage {
    /// Base64 data-URL view, the same shape the browser front end consumes.
    pub fn to_data_url(&self) -> String {
        let b64 = base64::engine::general_purpose::STANDARD.encode(&self.jpeg);
        format!("data:image/jpeg;base64,{}", b64)
    }
}
