use axum::body::Bytes;
use axum::extract::Multipart;
use std::collections::HashMap;

use crate::errors::{AppError, Result};

const PDF_MAGIC: &[u8] = b"%PDF-";
/// Readers accept the header anywhere in this prefix.
const PDF_HEADER_WINDOW: usize = 1024;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// File parts keyed by field name, plus the plain text fields.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub files: HashMap<String, UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();

            if let Some(file_name) = field.file_name().map(|s| s.to_string()) {
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await?;
                form.files.insert(
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        data,
                    },
                );
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name).filter(|file| !file.data.is_empty())
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Confirms the bytes are an image and returns the content type to forward.
pub fn validate_image(file: &UploadedFile) -> Result<String> {
    image::guess_format(&file.data)
        .map_err(|_| AppError::Validation("Uploaded file is not a supported image".to_string()))?;

    let content_type = match &file.content_type {
        Some(content_type) if content_type.starts_with("image/") => content_type.clone(),
        _ => mime_guess::from_path(&file.file_name)
            .first_or_octet_stream()
            .to_string(),
    };

    Ok(content_type)
}

fn has_pdf_header(data: &[u8]) -> bool {
    let window = &data[..data.len().min(PDF_HEADER_WINDOW)];
    window
        .windows(PDF_MAGIC.len())
        .any(|candidate| candidate == PDF_MAGIC)
}

pub fn validate_pdf(file: &UploadedFile) -> Result<()> {
    let is_pdf_name = mime_guess::from_path(&file.file_name)
        .first()
        .map(|mime| mime == mime::APPLICATION_PDF)
        .unwrap_or(false);

    if !is_pdf_name || !has_pdf_header(&file.data) {
        return Err(AppError::Validation(
            "Invalid file type. Please upload a PDF.".to_string(),
        ));
    }

    Ok(())
}
