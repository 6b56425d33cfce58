use std::path::Path;

use crate::{charset::Charset, error::Error, read_options::ParseOptions};

pub trait Parser {
    /// Parse from text already decoded.
    fn parse(text: &str, options: &ParseOptions) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path, decoding with `charset` unless the file starts
    /// with a byte order mark.
    fn read_from<P: AsRef<Path>>(path: P, charset: Charset, options: &ParseOptions) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let text = charset.read_file(path)?;
        Self::parse(&text, options)
    }
}
