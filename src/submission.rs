//! Hand-off of a committed ROI to the diagnosis service.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::geometry::Roi;

/// Body of a cardiac diagnosis request: the ROI in native video pixels,
/// flattened, plus an optional reference to the uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisRequest {
    #[serde(flatten)]
    pub roi: Roi,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

impl DiagnosisRequest {
    pub fn new(roi: Roi, video: Option<String>) -> Self {
        Self { roi, video }
    }
}

/// Accepts finalized ROIs.
pub trait RoiSubmitter {
    fn submit(&mut self, request: &DiagnosisRequest) -> Result<(), AppError>;
}

/// Writes each request as one JSON line.
pub struct JsonSubmitter<W> {
    writer: W,
}

impl<W: Write> JsonSubmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonSubmitter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl JsonSubmitter<File> {
    /// Append to `path`, creating it if needed.
    pub fn append_to(path: &Path) -> Result<Self, AppError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> RoiSubmitter for JsonSubmitter<W> {
    fn submit(&mut self, request: &DiagnosisRequest) -> Result<(), AppError> {
        serde_json::to_writer(&mut self.writer, request)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        info!(roi = ?request.roi, "diagnosis request written");
        Ok(())
    }
}
