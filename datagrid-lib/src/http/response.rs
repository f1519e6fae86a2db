//! Response value returned by exports and mass action callbacks

/// A minimal HTTP response produced by an export or a mass action callback.
///
/// The grid never constructs responses of its own; it only captures the ones
/// its collaborators return so the surrounding framework can send them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl Response {
    /// Creates an empty 200 response.
    pub fn ok() -> Self {
        Self {
            status: 200,
            content_type: None,
            body: Vec::new(),
        }
    }

    /// Creates a response with the given status.
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    /// Sets the content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the content type, if set.
    pub fn content_type_value(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the body bytes.
    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }
}
