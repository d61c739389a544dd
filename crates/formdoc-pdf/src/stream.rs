//! Stream helpers

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{Dictionary, Object, Stream};

use crate::error::GenerateError;

pub(crate) fn deflate(data: &[u8]) -> Result<Vec<u8>, GenerateError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// A `FlateDecode` stream holding `data`
pub(crate) fn flate_stream(mut dict: Dictionary, data: &[u8]) -> Result<Stream, GenerateError> {
    dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
    let mut stream = Stream::new(dict, deflate(data)?);
    stream.allows_compression = false;
    Ok(stream)
}
