pub mod engine;
pub mod inference;
pub mod model_manager;

use async_trait::async_trait;

use crate::error::ClassifierError;
use crate::models::classify_types::ModelOutput;
use crate::models::image_types::PreparedImage;
use crate::models::seasoning::Gender;

/// The classifier as the analysis engine sees it: one call, raw labels out.
///
/// [`model_manager::ModelManager`] is the real implementation; tests swap
/// in scripted ones.
#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    async fn classify(
        &self,
        image: &PreparedImage,
        gender: Gender,
    ) -> Result<ModelOutput, ClassifierError>;
}
