/// Content types accepted besides any `image/*`, `video/*` or `audio/*`.
pub const ALLOWED_DOCUMENT_TYPES: [&str; 6] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
];

const ALLOWED_PREFIXES: [&str; 3] = ["image/", "video/", "audio/"];

const MB: usize = 1024 * 1024;

/// Column width of the stored file name and content type.
pub const MAX_STORED_CHARS: usize = 255;
pub const MAX_CAPTION_CHARS: usize = 200;

/// Trimmed caption, `None` when blank.
pub fn clean_caption(value: Option<&str>) -> Result<Option<String>, String> {
    let caption = super::clean_text(value);
    if let Some(text) = &caption {
        let length = text.chars().count();
        if length > MAX_CAPTION_CHARS {
            return Err(format!(
                "Ensure this value has at most {MAX_CAPTION_CHARS} characters (it has {length})."
            ));
        }
    }
    Ok(caption)
}

/// One file read from a multipart upload.
///
/// Once `size` passes the policy limit the reader stops buffering, so `data`
/// may be shorter than `size`; such files never pass validation.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: usize,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<&str>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.map(str::to_string),
            size: data.len(),
            data,
        }
    }

    /// Media type without parameters, lowercased.
    pub fn essence(&self) -> Option<String> {
        let raw = self.content_type.as_deref()?;
        let essence = raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        (!essence.is_empty()).then_some(essence)
    }
}

/// Size and type allow-list applied to every evidence file.
#[derive(Debug, Clone, Copy)]
pub struct EvidencePolicy {
    pub max_bytes: usize,
}

impl EvidencePolicy {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_megabytes(&self) -> usize {
        self.max_bytes / MB
    }

    pub fn is_allowed_type(content_type: &str) -> bool {
        ALLOWED_PREFIXES.iter().any(|p| content_type.starts_with(p))
            || ALLOWED_DOCUMENT_TYPES.contains(&content_type)
    }

    pub fn check(&self, file: &UploadedFile) -> Result<(), String> {
        if file.size > self.max_bytes {
            return Err(format!("\"{}\" exceeds {} MB.", file.file_name, self.max_megabytes()));
        }

        if file.file_name.chars().count() > MAX_STORED_CHARS {
            return Err(format!(
                "File name is longer than {MAX_STORED_CHARS} characters: \"{}...\".",
                file.file_name.chars().take(40).collect::<String>()
            ));
        }

        let Some(content_type) = file.essence() else {
            return Err(format!("Could not determine content type: \"{}\".", file.file_name));
        };

        if content_type.chars().count() > MAX_STORED_CHARS {
            return Err(format!(
                "\"{}\" has a content type longer than {MAX_STORED_CHARS} characters.",
                file.file_name
            ));
        }

        if !Self::is_allowed_type(&content_type) {
            return Err(format!(
                "\"{}\" has unsupported type: \"{}\".",
                file.file_name, content_type
            ));
        }

        Ok(())
    }

    /// Every problem across all files, in upload order.
    pub fn check_all(&self, files: &[UploadedFile]) -> Vec<String> {
        files.iter().filter_map(|f| self.check(f).err()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, ctype: Option<&str>, size: usize) -> UploadedFile {
        UploadedFile {
            file_name: name.into(),
            content_type: ctype.map(str::to_string),
            size,
            data: Vec::new(),
        }
    }

    #[test]
    fn oversized_file_is_rejected() {
        let policy = EvidencePolicy::new(25 * MB);
        let err = policy.check(&file("video.mp4", Some("video/mp4"), 25 * MB + 1)).unwrap_err();
        assert_eq!(err, "\"video.mp4\" exceeds 25 MB.");
        assert!(policy.check(&file("video.mp4", Some("video/mp4"), 25 * MB)).is_ok());
    }

    #[test]
    fn anonymous_limit_is_larger() {
        let policy = EvidencePolicy::new(100 * MB);
        assert!(policy.check(&file("clip.mov", Some("video/quicktime"), 60 * MB)).is_ok());
        assert!(policy.check(&file("clip.mov", Some("video/quicktime"), 101 * MB)).is_err());
    }

    #[test]
    fn media_prefixes_and_documents_pass() {
        let policy = EvidencePolicy::new(MB);
        for ctype in ["image/jpeg", "audio/ogg", "video/webm", "application/pdf", "text/plain; charset=utf-8", "APPLICATION/MSWORD"] {
            assert!(policy.check(&file("f", Some(ctype), 10)).is_ok(), "{ctype} should pass");
        }
    }

    #[test]
    fn executables_and_archives_fail() {
        let policy = EvidencePolicy::new(MB);
        let err = policy.check(&file("setup.exe", Some("application/x-msdownload"), 10)).unwrap_err();
        assert_eq!(err, "\"setup.exe\" has unsupported type: \"application/x-msdownload\".");
        assert!(policy.check(&file("a.zip", Some("application/zip"), 10)).is_err());
        assert!(policy.check(&file("page.html", Some("text/html"), 10)).is_err());
    }

    #[test]
    fn missing_content_type_fails() {
        let policy = EvidencePolicy::new(MB);
        let err = policy.check(&file("blob", None, 10)).unwrap_err();
        assert_eq!(err, "Could not determine content type: \"blob\".");
        assert!(policy.check(&file("blob", Some(" "), 10)).is_err());
    }

    #[test]
    fn names_and_types_must_fit_their_columns() {
        let policy = EvidencePolicy::new(MB);
        let long_name = format!("{}.jpg", "a".repeat(300));
        let err = policy.check(&file(&long_name, Some("image/jpeg"), 10)).unwrap_err();
        assert!(err.starts_with("File name is longer than 255 characters"));

        let long_type = format!("image/{}", "x".repeat(300));
        let err = policy.check(&file("scene.jpg", Some(&long_type), 10)).unwrap_err();
        assert_eq!(err, "\"scene.jpg\" has a content type longer than 255 characters.");

        let fits = format!("{}.png", "b".repeat(251));
        assert!(policy.check(&file(&fits, Some("image/png"), 10)).is_ok());
    }

    #[test]
    fn captions_are_trimmed_and_bounded() {
        assert_eq!(clean_caption(Some("  Front gate  ")).unwrap().as_deref(), Some("Front gate"));
        assert_eq!(clean_caption(Some("   ")).unwrap(), None);
        assert_eq!(clean_caption(None).unwrap(), None);
        assert!(clean_caption(Some(&"é".repeat(200))).is_ok());
        let err = clean_caption(Some(&"c".repeat(201))).unwrap_err();
        assert!(err.contains("(it has 201)"));
    }

    #[test]
    fn check_all_collects_every_problem() {
        let policy = EvidencePolicy::new(MB);
        let files = [
            file("ok.png", Some("image/png"), 10),
            file("big.png", Some("image/png"), 2 * MB),
            file("bad.bin", Some("application/octet-stream"), 10),
        ];
        assert_eq!(policy.check_all(&files).len(), 2);
    }
}
