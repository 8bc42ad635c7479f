//! Minimal STOMP framing for the broker-backed ticket topic. Only the
//! commands this client exchanges are covered: CONNECT/CONNECTED, SUBSCRIBE,
//! MESSAGE and ERROR, with headers and a NUL-terminated body.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum StompError {
    #[error("Frame has no command line")]
    MissingCommand,

    #[error("Frame body is not NUL-terminated")]
    UnterminatedBody,

    #[error("Malformed header line: {0}")]
    MalformedHeader(String),

    #[error("Frame is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

impl Frame {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The CONNECT frame sent right after the WebSocket opens.
    pub fn connect(host: &str) -> Self {
        Frame::new("CONNECT")
            .with_header("accept-version", "1.2")
            .with_header("host", host)
            .with_header("heart-beat", "0,0")
    }

    pub fn subscribe(id: &str, destination: &str) -> Self {
        Frame::new("SUBSCRIBE")
            .with_header("id", id)
            .with_header("destination", destination)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.command.as_bytes());
        out.push(b'\n');
        for (name, value) in &self.headers {
            out.extend_from_slice(name.as_bytes());
            out.push(b':');
            out.extend_from_slice(value.as_bytes());
            out.push(b'\n');
        }
        out.push(b'\n');
        out.extend_from_slice(&self.body);
        out.push(0);
        out
    }

    /// Decodes one frame. `Ok(None)` means the input was a heartbeat (a bare
    /// newline), which the broker sends to keep the connection alive.
    pub fn decode(raw: &[u8]) -> Result<Option<Frame>, StompError> {
        if raw.is_empty() || raw == b"\n" || raw == b"\r\n" {
            return Ok(None);
        }

        // Head is everything up to the blank line separating headers from body.
        let separator = find_blank_line(raw).ok_or(StompError::UnterminatedBody)?;
        let head = std::str::from_utf8(&raw[..separator.start])?;
        let mut lines = head.lines();

        let command = lines
            .next()
            .filter(|l| !l.is_empty())
            .ok_or(StompError::MissingCommand)?
            .to_string();

        let mut headers = Vec::new();
        for line in lines {
            if line.is_empty() {
                continue;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| StompError::MalformedHeader(line.to_string()))?;
            headers.push((name.to_string(), value.to_string()));
        }

        let rest = &raw[separator.end..];
        let body_end = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or(StompError::UnterminatedBody)?;

        Ok(Some(Frame {
            command,
            headers,
            body: rest[..body_end].to_vec(),
        }))
    }
}

struct Separator {
    start: usize,
    end: usize,
}

fn find_blank_line(raw: &[u8]) -> Option<Separator> {
    for i in 0..raw.len().saturating_sub(1) {
        if raw[i] == b'\n' && raw[i + 1] == b'\n' {
            return Some(Separator {
                start: i,
                end: i + 2,
            });
        }
        if i + 3 < raw.len() && &raw[i..i + 4] == b"\r\n\r\n" {
            return Some(Separator {
                start: i,
                end: i + 4,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_frame_encodes_with_version_and_host() {
        let encoded = Frame::connect("localhost").encode();
        let text = String::from_utf8_lossy(&encoded);
        assert!(text.starts_with("CONNECT\n"));
        assert!(text.contains("accept-version:1.2\n"));
        assert!(text.contains("host:localhost\n"));
        assert!(encoded.ends_with(&[0]));
    }

    #[test]
    fn frames_round_trip() {
        let frame = Frame::subscribe("sub-0", "/topic/user/7/tickets");
        let decoded = Frame::decode(&frame.encode()).unwrap().unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn message_frame_with_body_decodes() {
        let raw = b"MESSAGE\ndestination:/topic/user/7/tickets\nsubscription:sub-0\n\n{\"changed\":true}\0";
        let frame = Frame::decode(raw).unwrap().unwrap();
        assert_eq!(frame.command, "MESSAGE");
        assert_eq!(frame.header("destination"), Some("/topic/user/7/tickets"));
        assert_eq!(frame.body, b"{\"changed\":true}");
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let raw = b"CONNECTED\r\nversion:1.2\r\n\r\n\0";
        let frame = Frame::decode(raw).unwrap().unwrap();
        assert_eq!(frame.command, "CONNECTED");
        assert_eq!(frame.header("version"), Some("1.2"));
        assert!(frame.body.is_empty());
    }

    #[test]
    fn heartbeat_decodes_to_none() {
        assert!(Frame::decode(b"\n").unwrap().is_none());
        assert!(Frame::decode(b"\r\n").unwrap().is_none());
    }

    #[test]
    fn missing_nul_terminator_is_an_error() {
        let raw = b"MESSAGE\n\nbody-without-terminator";
        assert!(matches!(
            Frame::decode(raw),
            Err(StompError::UnterminatedBody)
        ));
    }

    #[test]
    fn malformed_header_is_an_error() {
        let raw = b"MESSAGE\nnot-a-header\n\n\0";
        assert!(matches!(
            Frame::decode(raw),
            Err(StompError::MalformedHeader(_))
        ));
    }
}
