use crate::timeline::ClipFile;

/// Builds URLs for recordings served by the recorder host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUrls {
    host: String,
}

impl MediaUrls {
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            host: host.trim_end_matches('/').to_string(),
        }
    }

    pub fn video_url(&self, base_name: &str) -> String {
        self.file_url(&format!("{base_name}.mp4"))
    }

    pub fn thumbnail_url(&self, base_name: &str) -> String {
        self.file_url(&format!("{base_name}.jpg"))
    }

    pub fn file_url(&self, file_name: &str) -> String {
        format!("http://{}/recorded_video/{}", self.host, file_name)
    }

    pub fn clip_video_url(&self, clip: &ClipFile) -> String {
        self.video_url(&clip.name)
    }
}
