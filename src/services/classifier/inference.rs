//! Tensor preparation and forward pass for a loaded model.

use ndarray::Array4;
use ort::value::Value;

use crate::error::ClassifierError;
use crate::models::classify_types::{ModelOutput, Prediction};
use crate::models::image_types::PreparedImage;
use crate::services::classifier::model_manager::LoadedModel;

pub const INPUT_SIZE: u32 = 224;
const CROP_PCT: f32 = 0.875;

/// Decode a prepared photo into the model's NCHW input tensor.
///
/// Shortest edge is resized to `INPUT_SIZE / CROP_PCT`, center-cropped to
/// `INPUT_SIZE` square, and pixels scaled to `[-1, 1]` the way the model
/// was trained.
pub fn preprocess(image: &PreparedImage) -> Result<Array4<f32>, ClassifierError> {
    let img = image::load_from_memory(&image.jpeg)
        .map_err(|e| ClassifierError::Inference(format!("failed to decode prepared photo: {e}")))?;

    let crop_size = INPUT_SIZE;
    let resize_size = (crop_size as f32 / CROP_PCT).ceil() as u32;
    let (w, h) = (img.width(), img.height());
    let (new_w, new_h) = if w < h {
        (resize_size, ((h as f32 / w as f32) * resize_size as f32).round() as u32)
    } else {
        (((w as f32 / h as f32) * resize_size as f32).round() as u32, resize_size)
    };
    let resized = img.resize_exact(new_w, new_h, image::imageops::FilterType::Triangle);

    // Center crop to crop_size x crop_size
    let crop_x = (new_w.saturating_sub(crop_size)) / 2;
    let crop_y = (new_h.saturating_sub(crop_size)) / 2;
    let cropped = resized.crop_imm(crop_x, crop_y, crop_size, crop_size);
    let rgb = cropped.to_rgb8();

    // Pass 1: scale pixels sequentially while reads stay contiguous.
    let raw = rgb.into_raw();
    let hw = (crop_size * crop_size) as usize;
    let mut interleaved = vec![0f32; 3 * hw];
    for (i, pixel) in raw.chunks_exact(3).enumerate() {
        let off = i * 3;
        interleaved[off] = pixel[0] as f32 / 127.5 - 1.0;
        interleaved[off + 1] = pixel[1] as f32 / 127.5 - 1.0;
        interleaved[off + 2] = pixel[2] as f32 / 127.5 - 1.0;
    }

    // Pass 2: transpose HWC -> CHW in cache-friendly tiles.
    let mut data = vec![0f32; 3 * hw];
    const TILE: usize = 1024;
    for base in (0..hw).step_by(TILE) {
        let end = (base + TILE).min(hw);
        for i in base..end {
            let src = i * 3;
            data[i] = interleaved[src];
            data[hw + i] = interleaved[src + 1];
            data[2 * hw + i] = interleaved[src + 2];
        }
    }

    let tensor = Array4::from_shape_vec((1, 3, crop_size as usize, crop_size as usize), data)
        .map_err(|e| ClassifierError::Inference(format!("failed to create tensor: {e}")))?;

    Ok(tensor)
}

/// Run the forward pass and return one prediction per label, softmaxed.
pub fn run_model(model: &LoadedModel, input: Array4<f32>) -> Result<Vec<Prediction>, ClassifierError> {
    let mut session = model.session.lock().unwrap();

    // Assume a single input; its name varies between exports.
    let input_name = session.inputs()[0].name().to_string();

    let input_tensor = Value::from_array(input)
        .map_err(|e| ClassifierError::Inference(format!("failed to create tensor value: {e}")))?;

    let outputs = session
        .run(ort::inputs![input_name.as_str() => input_tensor])
        .map_err(|e| ClassifierError::Inference(format!("inference failed: {e}")))?;

    let output_value = outputs
        .values()
        .next()
        .ok_or_else(|| ClassifierError::Inference("model produced no outputs".to_string()))?;

    let (_, data) = output_value
        .try_extract_tensor::<f32>()
        .map_err(|e| ClassifierError::Inference(format!("failed to extract output tensor: {e}")))?;

    // Softmax over the logits.
    let max_logit = data.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exp_sum: f32 = data.iter().map(|&x| (x - max_logit).exp()).sum();

    let predictions = data
        .iter()
        .enumerate()
        .map(|(idx, &logit)| {
            let label = model
                .labels
                .get(idx)
                .cloned()
                .unwrap_or_else(|| format!("class_{idx}"));
            Prediction {
                label,
                probability: (logit - max_logit).exp() / exp_sum,
            }
        })
        .collect();

    Ok(predictions)
}

/// Full classification of a prepared photo against a loaded model.
pub fn classify(model: &LoadedModel, image: &PreparedImage) -> Result<ModelOutput, ClassifierError> {
    let tensor = preprocess(image)?;
    let predictions = run_model(model, tensor)?;
    Ok(ModelOutput {
        predictions,
        model_version: model.version.clone(),
    })
}
