//! Shared framing for the binary voice-database containers.
//!
//! Both the feature table and the classification tree are stored in the
//! same envelope: the magic `MARY`, a kind string identifying the payload,
//! and a format version, all big-endian. Strings are a `u16` byte length
//! followed by UTF-8 bytes.

use crate::result::{CotejarError, CotejarResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// Container magic, shared by every payload kind.
pub(crate) const MAGIC: [u8; 4] = *b"MARY";

/// Current container format version.
pub(crate) const FORMAT_VERSION: u32 = 1;

/// Big-endian reader over one container file.
pub(crate) struct ContainerReader<R: Read> {
    inner: R,
    path: PathBuf,
}

impl ContainerReader<BufReader<File>> {
    /// Open a container file for reading.
    pub fn open(path: &Path) -> CotejarResult<Self> {
        let file = File::open(path)?;
        Ok(Self {
            inner: BufReader::new(file),
            path: path.to_path_buf(),
        })
    }
}

impl<R: Read> ContainerReader<R> {
    #[cfg(test)]
    pub fn from_reader(inner: R, path: &Path) -> Self {
        Self {
            inner,
            path: path.to_path_buf(),
        }
    }

    /// Build a format error naming this container.
    pub fn err(&self, message: impl Into<String>) -> CotejarError {
        CotejarError::format(&self.path, message)
    }

    fn fill(&mut self, buf: &mut [u8]) -> CotejarResult<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                Err(self.err("unexpected end of file"))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check the envelope: magic, payload kind, format version.
    pub fn expect_header(&mut self, kind: &str) -> CotejarResult<()> {
        let mut magic = [0u8; 4];
        self.fill(&mut magic)?;
        if magic != MAGIC {
            return Err(self.err("bad magic"));
        }
        let found = self.read_string()?;
        if found != kind {
            return Err(self.err(format!("expected a {kind} container, found {found:?}")));
        }
        let version = self.read_u32()?;
        if version != FORMAT_VERSION {
            return Err(self.err(format!("unsupported format version {version}")));
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> CotejarResult<u8> {
        let mut b = [0u8; 1];
        self.fill(&mut b)?;
        Ok(b[0])
    }

    pub fn read_u16(&mut self) -> CotejarResult<u16> {
        let mut b = [0u8; 2];
        self.fill(&mut b)?;
        Ok(u16::from_be_bytes(b))
    }

    pub fn read_u32(&mut self) -> CotejarResult<u32> {
        let mut b = [0u8; 4];
        self.fill(&mut b)?;
        Ok(u32::from_be_bytes(b))
    }

    pub fn read_i32(&mut self) -> CotejarResult<i32> {
        let mut b = [0u8; 4];
        self.fill(&mut b)?;
        Ok(i32::from_be_bytes(b))
    }

    pub fn read_string(&mut self) -> CotejarResult<String> {
        let len = usize::from(self.read_u16()?);
        let mut bytes = vec![0u8; len];
        self.fill(&mut bytes)?;
        String::from_utf8(bytes).map_err(|_| self.err("string field is not valid UTF-8"))
    }
}

/// Big-endian writer producing the same framing as [`ContainerReader`].
pub(crate) struct ContainerWriter<W: Write> {
    inner: W,
    path: PathBuf,
}

impl ContainerWriter<BufWriter<File>> {
    /// Create (truncate) a container file for writing.
    pub fn create(path: &Path) -> CotejarResult<Self> {
        let file = File::create(path)?;
        Ok(Self {
            inner: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }
}

impl<W: Write> ContainerWriter<W> {
    /// Write the envelope: magic, payload kind, format version.
    pub fn write_header(&mut self, kind: &str) -> CotejarResult<()> {
        self.inner.write_all(&MAGIC)?;
        self.write_string(kind)?;
        self.write_u32(FORMAT_VERSION)
    }

    pub fn write_u8(&mut self, value: u8) -> CotejarResult<()> {
        self.inner.write_all(&[value])?;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> CotejarResult<()> {
        self.inner.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> CotejarResult<()> {
        self.inner.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> CotejarResult<()> {
        self.inner.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> CotejarResult<()> {
        let Ok(len) = u16::try_from(value.len()) else {
            return Err(CotejarError::format(
                &self.path,
                format!("string field too long ({} bytes)", value.len()),
            ));
        };
        self.write_u16(len)?;
        self.inner.write_all(value.as_bytes())?;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn finish(mut self) -> CotejarResult<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(bytes: Vec<u8>) -> ContainerReader<Cursor<Vec<u8>>> {
        ContainerReader::from_reader(Cursor::new(bytes), Path::new("test.mry"))
    }

    fn header(kind: &str) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&(kind.len() as u16).to_be_bytes());
        bytes.extend_from_slice(kind.as_bytes());
        bytes.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
        bytes
    }

    #[test]
    fn test_header_round_trip() {
        let mut r = reader(header("FEATS"));
        assert!(r.expect_header("FEATS").is_ok());
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = header("FEATS");
        bytes[0] = b'X';
        let mut r = reader(bytes);
        let err = r.expect_header("FEATS").unwrap_err();
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let mut r = reader(header("CART"));
        let err = r.expect_header("FEATS").unwrap_err();
        assert!(err.to_string().contains("expected a FEATS container"));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let mut bytes = header("FEATS");
        let n = bytes.len();
        bytes[n - 4..].copy_from_slice(&99u32.to_be_bytes());
        let mut r = reader(bytes);
        let err = r.expect_header("FEATS").unwrap_err();
        assert!(err.to_string().contains("unsupported format version 99"));
    }

    #[test]
    fn test_truncation_is_a_format_error() {
        let mut r = reader(vec![0x00, 0x01]);
        let err = r.read_u32().unwrap_err();
        assert!(matches!(err, CotejarError::Format { .. }));
        assert!(err.to_string().contains("unexpected end of file"));
    }

    #[test]
    fn test_primitives_big_endian() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x0102_0304u32.to_be_bytes());
        bytes.extend_from_slice(&(-5i32).to_be_bytes());
        bytes.extend_from_slice(&0x0a0bu16.to_be_bytes());
        bytes.push(0x7f);
        let mut r = reader(bytes);
        assert_eq!(r.read_u32().unwrap(), 0x0102_0304);
        assert_eq!(r.read_i32().unwrap(), -5);
        assert_eq!(r.read_u16().unwrap(), 0x0a0b);
        assert_eq!(r.read_u8().unwrap(), 0x7f);
    }

    #[test]
    fn test_string_invalid_utf8_rejected() {
        let bytes = vec![0x00, 0x02, 0xff, 0xfe];
        let mut r = reader(bytes);
        let err = r.read_string().unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn test_writer_reader_round_trip() {
        let mut buf = Vec::new();
        {
            let mut w = ContainerWriter {
                inner: &mut buf,
                path: PathBuf::from("test.mry"),
            };
            w.write_header("CART").unwrap();
            w.write_string("phone").unwrap();
            w.write_i32(-1).unwrap();
            w.write_u8(1).unwrap();
        }
        let mut r = reader(buf);
        r.expect_header("CART").unwrap();
        assert_eq!(r.read_string().unwrap(), "phone");
        assert_eq!(r.read_i32().unwrap(), -1);
        assert_eq!(r.read_u8().unwrap(), 1);
    }
}
