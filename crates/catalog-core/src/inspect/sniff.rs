//! Content-based media type detection over the leading bytes of a file.
//!
//! The rules follow the WHATWG MIME sniffing algorithm closely enough that
//! the reported types match what browsers and most HTTP stacks report.

/// Number of leading bytes the sniffer looks at.
pub const SNIFF_LEN: usize = 4096;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const TEXT_UTF8: &str = "text/plain; charset=utf-8";

/// A signature byte; `None` matches any value.
type Pattern = &'static [Option<u8>];

macro_rules! sig {
    (@byte _) => { None };
    (@byte $b:expr) => { Some($b) };
    ($($b:tt),* $(,)?) => { &[$(sig!(@byte $b)),*] };
}

struct Signature {
    pattern: Pattern,
    offset: usize,
    media_type: &'static str,
}

const fn at(offset: usize, pattern: Pattern, media_type: &'static str) -> Signature {
    Signature {
        pattern,
        offset,
        media_type,
    }
}

static SIGNATURES: &[Signature] = &[
    at(0, sig![0x25, 0x50, 0x44, 0x46, 0x2D], "application/pdf"),
    at(0, sig![0x25, 0x21, 0x50, 0x53, 0x2D, 0x41, 0x64, 0x6F, 0x62, 0x65, 0x2D], "application/postscript"),
    // images
    at(0, sig![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A], "image/png"),
    at(0, sig![0xFF, 0xD8, 0xFF], "image/jpeg"),
    at(0, sig![0x47, 0x49, 0x46, 0x38, 0x37, 0x61], "image/gif"),
    at(0, sig![0x47, 0x49, 0x46, 0x38, 0x39, 0x61], "image/gif"),
    at(0, sig![0x42, 0x4D], "image/bmp"),
    at(0, sig![0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, 0x56, 0x50], "image/webp"),
    at(0, sig![0x00, 0x00, 0x01, 0x00], "image/x-icon"),
    at(0, sig![0x00, 0x00, 0x02, 0x00], "image/x-icon"),
    at(0, sig![0x49, 0x49, 0x2A, 0x00], "image/tiff"),
    at(0, sig![0x4D, 0x4D, 0x00, 0x2A], "image/tiff"),
    // audio and video
    at(0, sig![0x4F, 0x67, 0x67, 0x53, 0x00], "application/ogg"),
    at(0, sig![0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x41, 0x56, 0x45], "audio/wave"),
    at(0, sig![0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x41, 0x56, 0x49, 0x20], "video/avi"),
    at(0, sig![0x46, 0x4F, 0x52, 0x4D, _, _, _, _, 0x41, 0x49, 0x46, 0x46], "audio/aiff"),
    at(0, sig![0x49, 0x44, 0x33], "audio/mpeg"),
    at(0, sig![0x66, 0x4C, 0x61, 0x43], "audio/flac"),
    at(0, sig![0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06], "audio/midi"),
    at(0, sig![0x1A, 0x45, 0xDF, 0xA3], "video/webm"),
    at(4, sig![0x66, 0x74, 0x79, 0x70], "video/mp4"),
    // archives
    at(0, sig![0x50, 0x4B, 0x03, 0x04], "application/zip"),
    at(0, sig![0x1F, 0x8B, 0x08], "application/x-gzip"),
    at(0, sig![0x52, 0x61, 0x72, 0x20, 0x1A, 0x07, 0x00], "application/x-rar-compressed"),
    at(0, sig![0x52, 0x61, 0x72, 0x21, 0x1A, 0x07], "application/x-rar-compressed"),
    at(0, sig![0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C], "application/x-7z-compressed"),
    at(0, sig![0x00, 0x61, 0x73, 0x6D], "application/wasm"),
    // fonts
    at(0, sig![0x77, 0x4F, 0x46, 0x46], "font/woff"),
    at(0, sig![0x77, 0x4F, 0x46, 0x32], "font/woff2"),
    at(0, sig![0x00, 0x01, 0x00, 0x00], "font/ttf"),
    at(0, sig![0x4F, 0x54, 0x54, 0x4F], "font/otf"),
];

/// Markup prefixes recognised after leading whitespace, case-insensitively.
static MARKUP: &[(&[u8], &str)] = &[
    (b"<!DOCTYPE HTML", "text/html; charset=utf-8"),
    (b"<HTML", "text/html; charset=utf-8"),
    (b"<HEAD", "text/html; charset=utf-8"),
    (b"<SCRIPT", "text/html; charset=utf-8"),
    (b"<IFRAME", "text/html; charset=utf-8"),
    (b"<H1", "text/html; charset=utf-8"),
    (b"<DIV", "text/html; charset=utf-8"),
    (b"<FONT", "text/html; charset=utf-8"),
    (b"<TABLE", "text/html; charset=utf-8"),
    (b"<A", "text/html; charset=utf-8"),
    (b"<STYLE", "text/html; charset=utf-8"),
    (b"<TITLE", "text/html; charset=utf-8"),
    (b"<B", "text/html; charset=utf-8"),
    (b"<BODY", "text/html; charset=utf-8"),
    (b"<BR", "text/html; charset=utf-8"),
    (b"<P", "text/html; charset=utf-8"),
    (b"<!--", "text/html; charset=utf-8"),
    (b"<?xml", "text/xml; charset=utf-8"),
];

/// Detects the media type of `header`, which should hold the first
/// [`SNIFF_LEN`] bytes of the content (or all of it if shorter).
pub fn detect_media_type(header: &[u8]) -> &'static str {
    let header = &header[..header.len().min(SNIFF_LEN)];

    if let Some(media_type) = sniff_markup(header) {
        return media_type;
    }

    if let Some(media_type) = sniff_bom(header) {
        return media_type;
    }

    if let Some(signature) = SIGNATURES.iter().find(|s| matches_at(header, s)) {
        return signature.media_type;
    }

    if header.iter().any(|&b| is_binary_byte(b)) {
        OCTET_STREAM
    } else {
        TEXT_UTF8
    }
}

fn matches_at(header: &[u8], signature: &Signature) -> bool {
    let Some(window) = header.get(signature.offset..signature.offset + signature.pattern.len())
    else {
        return false;
    };
    window
        .iter()
        .zip(signature.pattern)
        .all(|(byte, expected)| expected.map_or(true, |e| e == *byte))
}

fn sniff_markup(header: &[u8]) -> Option<&'static str> {
    let start = header.iter().position(|b| !is_whitespace(*b))?;
    let data = &header[start..];

    MARKUP.iter().find_map(|(prefix, media_type)| {
        let candidate = data.get(..prefix.len())?;
        if !candidate.eq_ignore_ascii_case(prefix) {
            return None;
        }
        // Tags must be terminated, "<Apple" is not an anchor.
        if prefix.starts_with(b"<") && !prefix.starts_with(b"<?") && !prefix.starts_with(b"<!--") {
            let next = *data.get(prefix.len())?;
            if next != b' ' && next != b'>' {
                return None;
            }
        }
        Some(*media_type)
    })
}

fn sniff_bom(header: &[u8]) -> Option<&'static str> {
    if header.starts_with(&[0xFE, 0xFF]) {
        Some("text/plain; charset=utf-16be")
    } else if header.starts_with(&[0xFF, 0xFE]) {
        Some("text/plain; charset=utf-16le")
    } else if header.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some(TEXT_UTF8)
    } else {
        None
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
