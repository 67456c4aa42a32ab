//! `multipart/form-data` bodies for file uploads.
//!
//! The API's image collections only accept form uploads, so these bodies
//! are built here as plain bytes. The transport never needs to know the
//! difference.

use rand::Rng;

/// One `multipart/form-data` body under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    name: String,
    file: Option<(String, String)>,
    bytes: Vec<u8>,
}

impl MultipartForm {
    /// An empty form with a random boundary.
    pub fn new() -> Self {
        Self::with_boundary(generate_boundary())
    }

    /// An empty form with a fixed boundary.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Adds a plain text field.
    pub fn text(mut self, name: &str, value: impl ToString) -> Self {
        self.parts.push(Part {
            name: quote(name),
            file: None,
            bytes: value.to_string().into_bytes(),
        });
        self
    }

    /// Adds a file field. The part's content type is guessed from the
    /// extension of `file_name`.
    pub fn file(
        mut self,
        name: &str,
        file_name: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.parts.push(Part {
            name: quote(name),
            file: Some((quote(file_name), content_type_for(file_name).to_string())),
            bytes: bytes.into(),
        });
        self
    }

    /// The `Content-Type` header value, boundary included.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Serializes every part followed by the closing delimiter.
    pub fn into_body(self) -> Vec<u8> {
        let mut body = Vec::new();
        for part in self.parts {
            body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            match part.file {
                Some((file_name, content_type)) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: {content_type}\r\n\r\n",
                            part.name
                        )
                        .as_bytes(),
                    );
                }
                None => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                            part.name
                        )
                        .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(&part.bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        body
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_boundary() -> String {
    let bytes: [u8; 12] = rand::rng().random();
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("pronovet-{hex}")
}

/// Escapes a header parameter the way browsers do for form field names.
fn quote(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
