//! Collaborators the experiment drives but does not own: camera capture and
//! statistics upload.

use tracing::trace;

use crate::error::UploadError;

/// Side-effecting capture hooks called at fixed points of the trial lifecycle.
pub trait MediaCapture {
    fn start_recording(&mut self);
    /// Stops the current clip, either sending it right away or buffering it.
    fn stop_recording(&mut self, send_immediately: bool);
    /// Discards buffered stills.
    fn clear_buffer(&mut self);
    fn add_last_video_metadata(&mut self, metadata: &str);
    fn send_videos(&mut self);
    fn take_picture(&mut self, metadata: &str);
}

/// Receives one statistics payload per finished experiment.
pub trait StatisticsUploader {
    fn upload_statistics(&mut self, metadata: &str, statistics: &str) -> Result<(), UploadError>;
}

/// Capture stand-in for hosts without a camera.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMedia;

impl MediaCapture for NullMedia {
    fn start_recording(&mut self) {
        trace!("start_recording");
    }
    fn stop_recording(&mut self, send_immediately: bool) {
        trace!(send_immediately, "stop_recording");
    }
    fn clear_buffer(&mut self) {
        trace!("clear_buffer");
    }
    fn add_last_video_metadata(&mut self, metadata: &str) {
        trace!(metadata, "add_last_video_metadata");
    }
    fn send_videos(&mut self) {
        trace!("send_videos");
    }
    fn take_picture(&mut self, metadata: &str) {
        trace!(metadata, "take_picture");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    StartRecording,
    StopRecording { send_immediately: bool },
    ClearBuffer,
    AddLastVideoMetadata(String),
    SendVideos,
    TakePicture(String),
}

/// Keeps every call in order, for dry runs and assertions.
#[derive(Debug, Default, Clone)]
pub struct RecordingMedia {
    pub calls: Vec<MediaCall>,
}

impl RecordingMedia {
    pub fn count(&self, call: &MediaCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl MediaCapture for RecordingMedia {
    fn start_recording(&mut self) {
        self.calls.push(MediaCall::StartRecording);
    }
    fn stop_recording(&mut self, send_immediately: bool) {
        self.calls.push(MediaCall::StopRecording { send_immediately });
    }
    fn clear_buffer(&mut self) {
        self.calls.push(MediaCall::ClearBuffer);
    }
    fn add_last_video_metadata(&mut self, metadata: &str) {
        self.calls
            .push(MediaCall::AddLastVideoMetadata(metadata.to_owned()));
    }
    fn send_videos(&mut self) {
        self.calls.push(MediaCall::SendVideos);
    }
    fn take_picture(&mut self, metadata: &str) {
        self.calls.push(MediaCall::TakePicture(metadata.to_owned()));
    }
}

/// Holds uploads in memory as `(metadata, statistics)` pairs.
#[derive(Debug, Default, Clone)]
pub struct MemoryUploader {
    pub uploads: Vec<(String, String)>,
}

impl StatisticsUploader for MemoryUploader {
    fn upload_statistics(&mut self, metadata: &str, statistics: &str) -> Result<(), UploadError> {
        self.uploads.push((metadata.to_owned(), statistics.to_owned()));
        Ok(())
    }
}
