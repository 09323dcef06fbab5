use crate::services::media::{UploadError, UploadedFile};

/// The only check applied to writes: the image must carry an allowed extension.
pub(crate) fn validate_image_upload(
    file: &UploadedFile,
    allowed_extensions: &[String],
) -> Result<(), UploadError> {
    let extension = file.extension().ok_or(UploadError::MissingExtension)?;

    if allowed_extensions.iter().any(|allowed| allowed == &extension) {
        Ok(())
    } else {
        Err(UploadError::ExtensionNotAllowed(extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::media::IMAGE_FORM_FIELD;

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            field: IMAGE_FORM_FIELD.to_string(),
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    fn allowed() -> Vec<String> {
        vec!["png".to_string(), "jpg".to_string()]
    }

    #[test]
    fn accepts_allowed_extension_case_insensitively() {
        assert!(validate_image_upload(&file("lamp.PNG"), &allowed()).is_ok());
    }

    #[test]
    fn rejects_missing_extension() {
        let err = validate_image_upload(&file("lamp"), &allowed()).expect_err("no extension");
        assert!(matches!(err, UploadError::MissingExtension));
    }

    #[test]
    fn rejects_unlisted_extension() {
        let err = validate_image_upload(&file("lamp.exe"), &allowed()).expect_err("exe");
        assert!(matches!(err, UploadError::ExtensionNotAllowed(ref ext) if ext == "exe"));
    }
}
