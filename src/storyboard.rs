//! Storyboard job requests.
//!
//! A [`StoryboardRequest`] is what gets sent to the render provider. It is
//! either deserialized directly from the JSON API or assembled from raw web
//! form values by [`StoryboardForm::build`].

use crate::error::{Error, Result};
use crate::normalize::{merge_frames, parse_optional_list};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::str::FromStr;

pub const DEFAULT_CFG_SCALE: f64 = 5.0;
pub const DEFAULT_STEPS: u32 = 28;
pub const DEFAULT_WIDTH: u32 = 768;
pub const DEFAULT_HEIGHT: u32 = 1024;
pub const DEFAULT_SCHEDULER: &str = "dpmpp_2m";

/// Upper bound on frames per storyboard job.
pub const MAX_FRAMES: usize = 12;

/// Message returned when a form has no usable frame prompt.
pub const NO_PROMPTS_MESSAGE: &str = "Provide at least one frame prompt.";

const CFG_SCALE_RANGE: (f64, f64) = (0.0, 20.0);
const STEPS_RANGE: (u32, u32) = (1, 150);
const DIMENSION_RANGE: (u32, u32) = (256, 1536);

/// One image-generation instruction within a storyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,

    /// Per-frame seed to stabilize outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,

    /// Per-frame CFG override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f64>,

    /// Per-frame inference steps override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
}

impl Frame {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            seed: None,
            guidance_scale: None,
            steps: None,
        }
    }

    pub fn with_negative_prompt(mut self, negative: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative.into());
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }
}

pub(crate) fn default_cfg_scale() -> f64 {
    DEFAULT_CFG_SCALE
}

pub(crate) fn default_steps() -> u32 {
    DEFAULT_STEPS
}

pub(crate) fn default_width() -> u32 {
    DEFAULT_WIDTH
}

pub(crate) fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

pub(crate) fn default_scheduler() -> String {
    DEFAULT_SCHEDULER.to_string()
}

/// A storyboard generation job: an ordered set of frames plus render parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryboardRequest {
    /// Human-friendly project label.
    pub project_name: String,

    /// HTTP-accessible reference image URLs.
    #[serde(default)]
    pub reference_images: Vec<String>,

    pub frames: Vec<Frame>,

    #[serde(default = "default_cfg_scale")]
    pub cfg_scale: f64,

    #[serde(default = "default_steps")]
    pub steps: u32,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Sampler to use on the remote service.
    #[serde(default = "default_scheduler")]
    pub scheduler: String,

    /// Global seed to anchor the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,

    /// Provider-specific options merged into the job parameters.
    #[serde(default)]
    pub extras: Map<String, Value>,
}

impl StoryboardRequest {
    /// Create a request with default render parameters.
    pub fn new(project_name: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self {
            project_name: project_name.into(),
            reference_images: Vec::new(),
            frames,
            cfg_scale: DEFAULT_CFG_SCALE,
            steps: DEFAULT_STEPS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scheduler: DEFAULT_SCHEDULER.to_string(),
            seed: None,
            extras: Map::new(),
        }
    }

    pub fn with_reference_images(mut self, urls: Vec<String>) -> Self {
        self.reference_images = urls;
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    /// Check frame count, parameter ranges, and reference URLs.
    ///
    /// Runs before any network call; every failure is a [`Error::Validation`].
    pub fn validate(&self) -> Result<()> {
        if self.frames.is_empty() {
            return Err(Error::validation(NO_PROMPTS_MESSAGE));
        }
        if self.frames.len() > MAX_FRAMES {
            return Err(Error::validation(format!(
                "A maximum of {} frames per storyboard is supported",
                MAX_FRAMES
            )));
        }

        check_range("cfg_scale", self.cfg_scale, CFG_SCALE_RANGE)?;
        check_range("steps", self.steps, STEPS_RANGE)?;
        check_range("width", self.width, DIMENSION_RANGE)?;
        check_range("height", self.height, DIMENSION_RANGE)?;

        for (idx, frame) in self.frames.iter().enumerate() {
            if frame.prompt.trim().is_empty() {
                return Err(Error::validation(format!(
                    "Frame {} has an empty prompt",
                    idx + 1
                )));
            }
            if let Some(scale) = frame.guidance_scale {
                check_range("guidance_scale", scale, CFG_SCALE_RANGE)?;
            }
            if let Some(steps) = frame.steps {
                check_range("steps", steps, STEPS_RANGE)?;
            }
        }

        for raw in &self.reference_images {
            let parsed = url::Url::parse(raw)
                .map_err(|e| Error::validation(format!("Invalid reference image URL '{}': {}", raw, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::validation(format!(
                    "Reference image URL '{}' must use http or https",
                    raw
                )));
            }
        }

        Ok(())
    }

    /// Build the wire payload expected by the render provider.
    ///
    /// Extras are merged into `parameters` after the fixed fields, so they
    /// can override them; a global `seed` is applied last.
    pub fn to_job_payload(&self) -> Value {
        let mut parameters = json!({
            "cfg_scale": self.cfg_scale,
            "steps": self.steps,
            "width": self.width,
            "height": self.height,
            "scheduler": self.scheduler,
        });

        if let Some(params) = parameters.as_object_mut() {
            for (key, value) in &self.extras {
                params.insert(key.clone(), value.clone());
            }
            if let Some(seed) = self.seed {
                params.insert("seed".into(), json!(seed));
            }
        }

        json!({
            "action": "storyboard.generate",
            "project": self.project_name,
            "reference_images": self.reference_images,
            "frames": self.frames,
            "parameters": parameters,
        })
    }
}

fn check_range<T>(field: &str, value: T, (min, max): (T, T)) -> Result<()>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if !(min..=max).contains(&value) {
        return Err(Error::validation(format!(
            "{} must be between {} and {} (got {})",
            field, min, max, value
        )));
    }
    Ok(())
}

/// Raw storyboard form values, exactly as submitted.
///
/// Text areas hold newline- or comma-separated lists; numeric fields are
/// strings and may be missing or garbage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryboardForm {
    #[serde(default)]
    pub project_name: String,
    pub prompts: Option<String>,
    pub negative_prompts: Option<String>,
    pub reference_images: Option<String>,
    pub cfg_scale: Option<String>,
    pub steps: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

impl StoryboardForm {
    /// Normalize the form into a [`StoryboardRequest`].
    ///
    /// Fails only when no frame prompt survives normalization. Numeric fields
    /// that are absent or unparseable silently fall back to their defaults.
    /// Note: this masks typos such as `cfg_scale=7,5`; callers see the default
    /// rather than an error.
    pub fn build(&self) -> Result<StoryboardRequest> {
        let prompts = parse_optional_list(self.prompts.as_deref());
        if prompts.is_empty() {
            return Err(Error::validation(NO_PROMPTS_MESSAGE));
        }
        let negatives = parse_optional_list(self.negative_prompts.as_deref());
        let frames = merge_frames(prompts, &negatives);

        let mut request = StoryboardRequest::new(self.project_name.trim(), frames)
            .with_reference_images(parse_optional_list(self.reference_images.as_deref()));
        request.cfg_scale = coerce_finite("cfg_scale", self.cfg_scale.as_deref(), DEFAULT_CFG_SCALE);
        request.steps = coerce("steps", self.steps.as_deref(), DEFAULT_STEPS);
        request.width = coerce("width", self.width.as_deref(), DEFAULT_WIDTH);
        request.height = coerce("height", self.height.as_deref(), DEFAULT_HEIGHT);
        Ok(request)
    }
}

/// Parse a numeric form field, falling back to `default` on absence or garbage.
fn coerce<T>(field: &str, raw: Option<&str>, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
{
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            tracing::debug!(field, raw, ?default, "Non-numeric form value, using default");
            default
        }
    }
}

/// Like [`coerce`], but `NaN` and infinities count as garbage too.
fn coerce_finite(field: &str, raw: Option<&str>, default: f64) -> f64 {
    let value = coerce(field, raw, default);
    if value.is_finite() {
        value
    } else {
        tracing::debug!(field, ?raw, default, "Non-finite form value, using default");
        default
    }
}
