//! Text encodings the game reads translation files with.
//!
//! Languages name their encoding with Java charset names (`Cp1252`,
//! `ISO-8859-15`, `UTF-8`, `UTF-16`). Reading honours a byte order mark over
//! the configured charset. Writing never fails on characters the charset
//! cannot represent: they become `?` and are counted.

use std::{fs, io::Read, path::Path};

use encoding_rs::{EncoderResult, Encoding, UTF_8, UTF_16BE};
use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// UTF-16, written big-endian with a byte order mark.
    Utf16,
    Encoding(&'static Encoding),
}

/// Result of encoding text for a charset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    /// Characters replaced by `?`.
    pub replaced: usize,
}

impl Default for Charset {
    fn default() -> Self {
        Charset::Encoding(UTF_8)
    }
}

impl Charset {
    /// Resolves a Java or WHATWG charset name.
    pub fn from_name(name: &str) -> Result<Self, Error> {
        let label = name.trim().to_ascii_lowercase();
        if matches!(label.as_str(), "utf-16" | "utf16") {
            return Ok(Charset::Utf16);
        }
        let label = match label.strip_prefix("cp") {
            Some(page) if page.starts_with("125") => format!("windows-{page}"),
            _ => label,
        };
        Encoding::for_label(label.as_bytes())
            .map(Charset::Encoding)
            .ok_or_else(|| Error::UnknownCharset(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf16 => "UTF-16",
            Charset::Encoding(encoding) => encoding.name(),
        }
    }

    fn decoder_encoding(&self) -> &'static Encoding {
        match self {
            Charset::Utf16 => UTF_16BE,
            Charset::Encoding(encoding) => *encoding,
        }
    }

    /// Decodes `bytes`; a byte order mark overrides the charset.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, Error> {
        self.decode_reader(bytes)
    }

    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<String, Error> {
        let file = fs::File::open(path)?;
        self.decode_reader(file)
    }

    fn decode_reader<R: Read>(&self, reader: R) -> Result<String, Error> {
        let mut decoder = DecodeReaderBytesBuilder::new()
            .encoding(Some(self.decoder_encoding()))
            .bom_override(true)
            .build(reader);
        let mut text = String::new();
        decoder.read_to_string(&mut text)?;
        Ok(text)
    }

    pub fn encode(&self, text: &str) -> Encoded {
        match self {
            Charset::Utf16 => {
                let mut bytes = Vec::with_capacity(2 + text.len() * 2);
                bytes.extend_from_slice(&[0xFE, 0xFF]);
                for unit in text.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_be_bytes());
                }
                Encoded { bytes, replaced: 0 }
            }
            Charset::Encoding(encoding) if *encoding == UTF_8 => Encoded {
                bytes: text.as_bytes().to_vec(),
                replaced: 0,
            },
            Charset::Encoding(encoding) => encode_replacing(*encoding, text),
        }
    }

    /// Writes `text` to `path`, returning the number of replaced characters.
    pub fn write_file<P: AsRef<Path>>(&self, path: P, text: &str) -> Result<usize, Error> {
        let encoded = self.encode(text);
        fs::write(path, &encoded.bytes)?;
        Ok(encoded.replaced)
    }
}

fn encode_replacing(encoding: &'static Encoding, text: &str) -> Encoded {
    let mut encoder = encoding.new_encoder();
    let mut bytes = Vec::with_capacity(text.len());
    let mut buffer = [0u8; 1024];
    let mut input = text;
    let mut replaced = 0;
    loop {
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(input, &mut buffer, true);
        bytes.extend_from_slice(&buffer[..written]);
        input = &input[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(_) => {
                bytes.push(b'?');
                replaced += 1;
            }
        }
    }
    Encoded { bytes, replaced }
}
