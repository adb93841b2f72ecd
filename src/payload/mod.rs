//! Secret payloads and their framing.
//!
//! Before encryption every secret is wrapped in a small frame so extraction
//! can tell a typed message from a file and restore the file's name:
//!
//! ```text
//! [4] magic "ISF1"
//! [1] kind      0 = text, 1 = file
//! [1] flags     bit0 = body is DEFLATE-compressed
//! [2] name_len  big-endian, 0 for text
//! [n] name      UTF-8
//! [4] body_len  big-endian
//! [m] body
//! ```

pub mod compression;

use std::fmt;

use serde::Serialize;
use zeroize::Zeroizing;

use crate::error::{InscryptError, Result};

pub use compression::{deflate, inflate, CompressionError};

const MAGIC: &[u8; 4] = b"ISF1";
const FLAG_DEFLATE: u8 = 0x01;
const FIXED_LEN: usize = 4 + 1 + 1 + 2 + 4;

/// What the secret is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    File,
}

impl ContentKind {
    fn tag(&self) -> u8 {
        match self {
            Self::Text => 0,
            Self::File => 1,
        }
    }

    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Text),
            1 => Ok(Self::File),
            other => Err(InscryptError::payload(format!("unknown content kind {}", other))),
        }
    }
}

/// The data being hidden. Bytes are wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretPayload {
    kind: ContentKind,
    name: Option<String>,
    data: Zeroizing<Vec<u8>>,
}

impl SecretPayload {
    /// A typed message.
    pub fn text(message: &str) -> Self {
        Self {
            kind: ContentKind::Text,
            name: None,
            data: Zeroizing::new(message.as_bytes().to_vec()),
        }
    }

    /// File contents with the file's original name.
    pub fn file(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            kind: ContentKind::File,
            name: Some(name.into()),
            data: Zeroizing::new(bytes),
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The secret as text. Fails if it is not valid UTF-8.
    pub fn as_text(&self) -> Result<&str> {
        std::str::from_utf8(&self.data)
            .map_err(|_| InscryptError::payload("payload is not valid UTF-8 text"))
    }

    pub fn into_bytes(self) -> Zeroizing<Vec<u8>> {
        self.data
    }
}

impl fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPayload")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Serializes `payload` into a frame, compressing the body when it helps.
pub fn frame(payload: &SecretPayload) -> Result<Zeroizing<Vec<u8>>> {
    let name = payload.name().unwrap_or_default().as_bytes();
    if name.len() > u16::MAX as usize {
        return Err(InscryptError::config(format!(
            "file name is {} bytes, the limit is {}",
            name.len(),
            u16::MAX
        )));
    }

    let compressed = deflate(payload.as_bytes())
        .map_err(|e| InscryptError::payload(e.to_string()))?
        .map(Zeroizing::new);
    let (flags, body) = match &compressed {
        Some(deflated) => (FLAG_DEFLATE, deflated.as_slice()),
        None => (0u8, payload.as_bytes()),
    };
    if body.len() > u32::MAX as usize {
        return Err(InscryptError::config("payload body exceeds 4 GiB"));
    }

    let mut out = Zeroizing::new(Vec::with_capacity(FIXED_LEN + name.len() + body.len()));
    out.extend_from_slice(MAGIC);
    out.push(payload.kind().tag());
    out.push(flags);
    out.extend_from_slice(&(name.len() as u16).to_be_bytes());
    out.extend_from_slice(name);
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(body);

    log::debug!(
        "framed {} byte {:?} payload into {} bytes (deflate: {})",
        payload.len(),
        payload.kind(),
        out.len(),
        flags & FLAG_DEFLATE != 0
    );
    Ok(out)
}

/// Parses a frame produced by [`frame`].
pub fn unframe(bytes: &[u8]) -> Result<SecretPayload> {
    if bytes.len() < FIXED_LEN {
        return Err(InscryptError::payload("frame is truncated"));
    }
    if &bytes[..4] != MAGIC {
        return Err(InscryptError::payload("bad frame magic"));
    }

    let kind = ContentKind::from_tag(bytes[4])?;
    let flags = bytes[5];
    if flags & !FLAG_DEFLATE != 0 {
        return Err(InscryptError::payload(format!("unknown frame flags {:#04x}", flags)));
    }

    let name_len = u16::from_be_bytes([bytes[6], bytes[7]]) as usize;
    let rest = &bytes[8..];
    if rest.len() < name_len + 4 {
        return Err(InscryptError::payload("frame is truncated"));
    }
    let (name, rest) = rest.split_at(name_len);
    let name = std::str::from_utf8(name)
        .map_err(|_| InscryptError::payload("file name is not valid UTF-8"))?;

    let (len_bytes, body) = rest.split_at(4);
    let body_len = u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
    if body_len as usize != body.len() {
        return Err(InscryptError::payload(format!(
            "frame declares {} body bytes but carries {}",
            body_len,
            body.len()
        )));
    }

    let data = if flags & FLAG_DEFLATE != 0 {
        inflate(body).map_err(|e| InscryptError::payload(e.to_string()))?
    } else {
        body.to_vec()
    };

    match kind {
        ContentKind::Text => {
            if name_len != 0 {
                return Err(InscryptError::payload("text payload carries a file name"));
            }
            let payload = SecretPayload {
                kind,
                name: None,
                data: Zeroizing::new(data),
            };
            payload.as_text()?;
            Ok(payload)
        }
        ContentKind::File => Ok(SecretPayload::file(name, data)),
    }
}
