//! BlazeFace face detector using ONNX Runtime via `ort`.
//!
//! Short-range BlazeFace model: 128×128 RGB input, 896 anchors, one score
//! and sixteen regressors per anchor. Boxes come out normalized to the frame.

use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::MIN_DETECTION_CONFIDENCE;
use crate::shared::frame::Frame;

use super::execution_provider::{preferred_execution_providers, provider_name};

/// BlazeFace model input resolution.
const INPUT_SIZE: u32 = 128;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.3;

/// Number of BlazeFace anchors (short-range model).
const NUM_ANCHORS: usize = 896;

/// Regressor values per anchor: box (4) + six keypoints (12).
const REGRESSOR_STRIDE: usize = 16;

/// BlazeFace face detector backed by an ONNX Runtime session.
///
/// The session is the detector's model context: it is loaded once in
/// [`OnnxBlazefaceDetector::new`] and released when the detector drops.
pub struct OnnxBlazefaceDetector {
    session: ort::session::Session,
    confidence: f64,
    anchors: Vec<[f32; 2]>,
}

impl OnnxBlazefaceDetector {
    /// Load a BlazeFace ONNX model with the default confidence threshold.
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_confidence(model_path, MIN_DETECTION_CONFIDENCE)
    }

    pub fn with_confidence(
        model_path: &Path,
        confidence: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;
        log::info!(
            "Loaded face detection model {} ({} provider)",
            model_path.display(),
            provider_name()
        );
        Ok(Self {
            session,
            confidence,
            anchors: generate_anchors(),
        })
    }
}

impl FaceDetector for OnnxBlazefaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        if frame.width() == 0 || frame.height() == 0 {
            return Ok(Vec::new());
        }

        // 1. Preprocess: RGB ordering, resize to 128x128, normalize to [0,1], NCHW
        let rgb = frame.to_rgb();
        let input_tensor = preprocess(&rgb, INPUT_SIZE);

        // 2. Inference
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        // BlazeFace outputs two tensors:
        // - regressors: [1, 896, 16] (box deltas + keypoints)
        // - classificators: [1, 896, 1] (confidence logits)
        if outputs.len() < 2 {
            return Err(
                format!("BlazeFace model expected 2 outputs, got {}", outputs.len()).into(),
            );
        }

        let first = outputs[0].try_extract_array::<f32>()?;
        let second = outputs[1].try_extract_array::<f32>()?;
        let first = first.as_slice().ok_or("Cannot get output slice")?;
        let second = second.as_slice().ok_or("Cannot get output slice")?;

        // Exported models disagree on output order; regressors are the larger tensor.
        let (reg_data, score_data) = if first.len() >= second.len() {
            (first, second)
        } else {
            (second, first)
        };

        // 3. Decode anchors and filter by confidence
        let mut candidates = decode_boxes(reg_data, score_data, &self.anchors, self.confidence);

        // 4. NMS
        Ok(nms(&mut candidates, NMS_IOU_THRESH))
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Resize frame to `size × size` and normalize to [0,1] NCHW float32.
fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    tensor
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Generate BlazeFace anchors for the short-range model.
///
/// Two feature maps: 16×16 with 2 anchors per cell and 8×8 with 6.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8, 2), (16, 6)]; // (stride, anchors_per_cell)
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(stride, num) in &strides {
        let grid_size = INPUT_SIZE as usize / stride;
        for y in 0..grid_size {
            for x in 0..grid_size {
                let cx = (x as f32 + 0.5) / grid_size as f32;
                let cy = (y as f32 + 0.5) / grid_size as f32;
                for _ in 0..num {
                    anchors.push([cx, cy]);
                }
            }
        }
    }

    anchors
}

fn decode_boxes(
    reg_data: &[f32],
    score_data: &[f32],
    anchors: &[[f32; 2]],
    confidence: f64,
) -> Vec<BoundingBox> {
    let num_anchors = anchors.len().min(NUM_ANCHORS);
    let mut boxes = Vec::new();

    for (i, &raw_score) in score_data.iter().enumerate().take(num_anchors) {
        let score = sigmoid(raw_score) as f64;
        if score < confidence {
            continue;
        }

        let offset = i * REGRESSOR_STRIDE;
        if offset + 4 > reg_data.len() {
            break;
        }

        let anchor = &anchors[i];
        let size = INPUT_SIZE as f32;
        let cx = anchor[0] + reg_data[offset] / size;
        let cy = anchor[1] + reg_data[offset + 1] / size;
        let w = reg_data[offset + 2] / size;
        let h = reg_data[offset + 3] / size;

        let bbox = BoundingBox::from_corners(
            (cx - w / 2.0) as f64,
            (cy - h / 2.0) as f64,
            (cx + w / 2.0) as f64,
            (cy + h / 2.0) as f64,
        )
        .with_score(score);
        boxes.push(bbox);
    }

    boxes
}

fn nms(boxes: &mut [BoundingBox], iou_thresh: f64) -> Vec<BoundingBox> {
    boxes.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; boxes.len()];

    for i in 0..boxes.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(boxes[i]);
        for j in (i + 1)..boxes.len() {
            if !suppressed[j] && boxes[i].iou(&boxes[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
