//! The inference gateway orchestrates one upload end to end: store the file,
//! preprocess it, call the remote service, decode the winning label

use crate::classes::ClassIndex;
use crate::client::{self, InferenceClient};
use crate::tensor;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// An uploaded file as pulled out of the multipart body
#[derive(Debug)]
pub struct UploadedImage {
    /// Client-supplied name; only its extension is trusted
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// What one upload request amounted to
#[derive(Debug, PartialEq)]
pub enum UploadOutcome {
    /// No file field, or an empty filename: redisplay the form
    NoFile,

    /// The remote service could not produce a prediction
    Failed,

    /// A prediction, plus where the stored upload is served from
    Classified { label: String, image_url: String },
}

/// Per-process gateway state: the read-only class index, the outbound client,
/// and the upload directory. Shared by reference across requests
#[derive(Debug)]
pub struct Gateway {
    classes: ClassIndex,
    client: InferenceClient,
    upload_dir: PathBuf,
}

impl Gateway {
    pub fn new(classes: ClassIndex, client: InferenceClient, upload_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&upload_dir)
            .with_context(|| format!("could not create upload dir {}", upload_dir.display()))?;
        info!(
            "gateway ready with {} classes, uploads in {}",
            classes.len(),
            upload_dir.display()
        );
        Ok(Gateway {
            classes,
            client,
            upload_dir,
        })
    }

    /// Run the full upload cycle. Predict failures map to
    /// [`UploadOutcome::Failed`]; decode and filesystem failures propagate
    pub async fn handle_upload(&self, upload: Option<UploadedImage>) -> Result<UploadOutcome> {
        let upload = match upload {
            Some(u) if !u.filename.is_empty() => u,
            _ => return Ok(UploadOutcome::NoFile),
        };

        let stored_name = self.save_upload(&upload)?;
        let tensor = tensor::preprocess(&upload.bytes)?;

        let response = match self.client.predict(&tensor).await {
            Ok(response) => response,
            Err(err) => {
                warn!("prediction failed: {err}");
                return Ok(UploadOutcome::Failed);
            }
        };

        let label = client::decode_label(&response, &self.classes)?;
        info!("classified upload {stored_name} as {label:?}");

        Ok(UploadOutcome::Classified {
            label,
            image_url: format!("/uploads/{stored_name}"),
        })
    }

    /// Write the upload under a generated name so concurrent uploads sharing a
    /// client filename cannot clobber each other. Keeps the original extension
    fn save_upload(&self, upload: &UploadedImage) -> Result<String> {
        let stored_name = match Path::new(&upload.filename)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };

        let path = self.upload_dir.join(&stored_name);
        fs::write(&path, &upload.bytes)
            .with_context(|| format!("could not store upload at {}", path.display()))?;
        debug!("stored upload {:?} as {stored_name}", upload.filename);

        Ok(stored_name)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PREDICT_TIMEOUT_SECS;
    use std::time::Duration;

    fn test_gateway(dir: &Path) -> Gateway {
        let classes =
            ClassIndex::from_reader(&br#"{"0": ["n00000000", "anything"]}"#[..]).unwrap();
        let client = InferenceClient::new(
            "http://127.0.0.1:9/infer".into(),
            Duration::from_secs(PREDICT_TIMEOUT_SECS),
        )
        .unwrap();
        Gateway::new(classes, client, dir.to_path_buf()).unwrap()
    }

    #[actix_web::test]
    async fn test_missing_upload_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = test_gateway(dir.path());

        let outcome = gateway.handle_upload(None).await.unwrap();
        assert_eq!(outcome, UploadOutcome::NoFile);
    }

    #[actix_web::test]
    async fn test_empty_filename_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = test_gateway(dir.path());

        let upload = UploadedImage {
            filename: String::new(),
            bytes: vec![1, 2, 3],
        };
        let outcome = gateway.handle_upload(Some(upload)).await.unwrap();
        assert_eq!(outcome, UploadOutcome::NoFile);
    }

    #[test]
    fn test_stored_names_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = test_gateway(dir.path());

        let upload = UploadedImage {
            filename: "cat.jpg".into(),
            bytes: vec![0xff],
        };
        let first = gateway.save_upload(&upload).unwrap();
        let second = gateway.save_upload(&upload).unwrap();

        assert_ne!(first, second);
        assert!(first.ends_with(".jpg"));
        assert!(dir.path().join(&first).exists());
        assert!(dir.path().join(&second).exists());
    }
}
