use crate::summary::Failure;
use std::io::{self, Read, Seek};

/// Hex BLAKE3 digest of the whole stream, read from the beginning.
pub(crate) fn content_hash<R: Read + Seek + ?Sized>(stream: &mut R) -> Result<String, Failure> {
    stream.rewind().map_err(|_| Failure::Seek)?;

    let mut hasher = blake3::Hasher::new();
    io::copy(stream, &mut hasher).map_err(|_| Failure::Read)?;
    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, SeekFrom};

    #[test]
    fn test_hash_is_taken_from_the_start() {
        let mut stream = Cursor::new(b"some file content".to_vec());
        stream.seek(SeekFrom::Start(5)).unwrap();

        let hash = content_hash(&mut stream).unwrap();
        assert_eq!(hash, blake3::hash(b"some file content").to_hex().to_string());
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_single_byte_difference_changes_hash() {
        let a = content_hash(&mut Cursor::new(b"abcdef".to_vec())).unwrap();
        let b = content_hash(&mut Cursor::new(b"abcdeg".to_vec())).unwrap();
        let c = content_hash(&mut Cursor::new(b"abcdef".to_vec())).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_empty_stream_has_a_hash() {
        let hash = content_hash(&mut Cursor::new(Vec::new())).unwrap();
        assert!(!hash.is_empty());
    }
}
