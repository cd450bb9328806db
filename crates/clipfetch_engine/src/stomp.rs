//! Minimal STOMP 1.2 frame codec.
//!
//! Only what a subscribing client needs: building `CONNECT`, `SUBSCRIBE`,
//! `UNSUBSCRIBE` and `DISCONNECT`, and parsing `CONNECTED`, `MESSAGE`,
//! `RECEIPT` and `ERROR`. One frame per WebSocket message.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StompError {
    #[error("frame is missing its NUL terminator")]
    Unterminated,
    #[error("frame has no command line")]
    MissingCommand,
    #[error("malformed header line: {0}")]
    MalformedHeader(String),
    #[error("invalid escape sequence in header: {0}")]
    BadEscape(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StompFrame {
    pub command: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StompFrame {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// First occurrence wins when a header is repeated.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn encode(&self) -> String {
        let escaped = escapes_headers(&self.command);
        let mut out = String::with_capacity(self.command.len() + self.body.len() + 64);
        out.push_str(&self.command);
        out.push('\n');
        for (name, value) in &self.headers {
            if escaped {
                out.push_str(&escape(name));
                out.push(':');
                out.push_str(&escape(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Parse one frame. `Ok(None)` for a heart-beat (bare EOLs).
    pub fn parse(text: &str) -> Result<Option<Self>, StompError> {
        let text = text.trim_start_matches(['\r', '\n']);
        if text.is_empty() {
            return Ok(None);
        }

        let (head, rest) = split_head(text).ok_or(StompError::Unterminated)?;
        let mut lines = head.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));
        let command = lines
            .next()
            .filter(|line| !line.is_empty())
            .ok_or(StompError::MissingCommand)?
            .to_string();

        let escaped = escapes_headers(&command);
        let mut headers = Vec::new();
        for line in lines.filter(|line| !line.is_empty()) {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| StompError::MalformedHeader(line.to_string()))?;
            if escaped {
                headers.push((unescape(name)?, unescape(value)?));
            } else {
                headers.push((name.to_string(), value.to_string()));
            }
        }

        let mut frame = Self {
            command,
            headers,
            body: String::new(),
        };
        frame.body = read_body(rest, frame.get("content-length"))?.to_string();
        Ok(Some(frame))
    }
}

fn escapes_headers(command: &str) -> bool {
    !matches!(command, "CONNECT" | "CONNECTED")
}

fn split_head(text: &str) -> Option<(&str, &str)> {
    if let Some(idx) = text.find("\n\n") {
        return Some((&text[..idx], &text[idx + 2..]));
    }
    text.find("\r\n\r\n")
        .map(|idx| (&text[..idx], &text[idx + 4..]))
}

fn read_body<'a>(rest: &'a str, content_length: Option<&str>) -> Result<&'a str, StompError> {
    if let Some(len) = content_length.and_then(|value| value.trim().parse::<usize>().ok()) {
        if len < rest.len() && rest.is_char_boundary(len) && rest.as_bytes()[len] == 0 {
            return Ok(&rest[..len]);
        }
    }
    rest.find('\0')
        .map(|end| &rest[..end])
        .ok_or(StompError::Unterminated)
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(raw: &str) -> Result<String, StompError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            _ => return Err(StompError::BadEscape(raw.to_string())),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_connect_without_escaping() {
        let frame = StompFrame::new("CONNECT")
            .header("accept-version", "1.2")
            .header("host", "localhost:8080");
        assert_eq!(
            frame.encode(),
            "CONNECT\naccept-version:1.2\nhost:localhost:8080\n\n\0"
        );
    }

    #[test]
    fn escapes_header_values_in_other_frames() {
        let frame = StompFrame::new("SUBSCRIBE").header("destination", "/a:b\nc");
        assert_eq!(frame.encode(), "SUBSCRIBE\ndestination:/a\\cb\\nc\n\n\0");
    }

    #[test]
    fn parses_message_frame() {
        let raw = "MESSAGE\ndestination:/user/topic/progress\nsubscription:sub-0\nmessage-id:1\ncontent-type:text/plain;charset=UTF-8\n\nDownload finished: clip.mp4\0";
        let frame = StompFrame::parse(raw).unwrap().unwrap();
        assert_eq!(frame.command, "MESSAGE");
        assert_eq!(frame.get("subscription"), Some("sub-0"));
        assert_eq!(frame.get("content-type"), Some("text/plain;charset=UTF-8"));
        assert_eq!(frame.body, "Download finished: clip.mp4");
    }

    #[test]
    fn parses_crlf_frames_and_unescapes() {
        let raw = "ERROR\r\nmessage:bad\\csession\r\n\r\nboom\0";
        let frame = StompFrame::parse(raw).unwrap().unwrap();
        assert_eq!(frame.get("message"), Some("bad:session"));
        assert_eq!(frame.body, "boom");
    }

    #[test]
    fn connected_headers_are_taken_verbatim() {
        let raw = "CONNECTED\nversion:1.2\nserver:broker\\x\n\n\0";
        let frame = StompFrame::parse(raw).unwrap().unwrap();
        assert_eq!(frame.get("server"), Some("broker\\x"));
    }

    #[test]
    fn content_length_allows_nul_in_body() {
        let raw = "MESSAGE\ncontent-length:3\n\na\0b\0";
        let frame = StompFrame::parse(raw).unwrap().unwrap();
        assert_eq!(frame.body, "a\0b");
    }

    #[test]
    fn heartbeat_is_not_a_frame() {
        assert_eq!(StompFrame::parse("\n"), Ok(None));
        assert_eq!(StompFrame::parse("\r\n\r\n"), Ok(None));
    }

    #[test]
    fn rejects_broken_frames() {
        assert_eq!(
            StompFrame::parse("MESSAGE\nx:y\n\nbody"),
            Err(StompError::Unterminated)
        );
        assert_eq!(
            StompFrame::parse("MESSAGE\nnocolon\n\n\0"),
            Err(StompError::MalformedHeader("nocolon".to_string()))
        );
        assert_eq!(
            StompFrame::parse("MESSAGE\nx:bad\\t\n\n\0"),
            Err(StompError::BadEscape("bad\\t".to_string()))
        );
    }

    #[test]
    fn encode_then_parse_keeps_headers_and_body() {
        let frame = StompFrame::new("SEND")
            .header("destination", "/q:1")
            .body("hello");
        let parsed = StompFrame::parse(&frame.encode()).unwrap().unwrap();
        assert_eq!(parsed, frame);
    }
}
