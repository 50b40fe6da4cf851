// Byte-source helpers for the read stage: open, fixed-size reads, row-tail splitting.
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use bstr::ByteSlice;

use crate::core::error::{Error, ErrorKind};

pub fn open_source(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|err| {
        let err = Error::from_io(err, "failed to open input").with_path(path);
        match err.kind() {
            ErrorKind::NotFound => err.with_hint("Check the input path."),
            ErrorKind::Permission => err.with_hint("Check read permissions on the input file."),
            _ => err,
        }
    })
}

/// Read up to `size` bytes, looping over short reads. Fewer than `size`
/// bytes come back only at end-of-stream.
pub fn read_buffer<R: Read>(reader: &mut R, size: usize) -> Result<Vec<u8>, Error> {
    let mut buf = vec![0u8; size];
    let mut filled = 0;
    while filled < size {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(Error::from_io(err, "failed to read input")),
        }
    }
    buf.truncate(filled);
    Ok(buf)
}

/// Split off the bytes after the last newline. With no newline at all the
/// whole buffer is returned and `data` is left empty.
pub fn split_trailing_fragment(data: &mut Vec<u8>) -> Vec<u8> {
    match data.rfind_byte(b'\n') {
        Some(pos) => data.split_off(pos + 1),
        None => std::mem::take(data),
    }
}
