//! XML documents as text, decoded with the encoding their prolog declares.
//!
//! Only single-byte-compatible encodings are handled: UTF-8 (the default),
//! ISO-8859-1 and US-ASCII. Anything else is an `InvalidData` error naming the
//! label. Documents are written back in the encoding they were read with.

use std::fs;
use std::io;
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Latin1,
    Ascii,
}

impl XmlEncoding {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(XmlEncoding::Utf8),
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "latin-1" | "l1" => {
                Some(XmlEncoding::Latin1)
            }
            "us-ascii" | "ascii" => Some(XmlEncoding::Ascii),
            _ => None,
        }
    }

    fn decode(self, bytes: &[u8]) -> io::Result<String> {
        match self {
            XmlEncoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            XmlEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            XmlEncoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
                Some(at) => Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("non-ASCII byte at offset {at} in US-ASCII document"),
                )),
            },
        }
    }

    fn encode(self, text: &str) -> io::Result<Vec<u8>> {
        let limit = match self {
            XmlEncoding::Utf8 => return Ok(text.as_bytes().to_vec()),
            XmlEncoding::Latin1 => 0xFF,
            XmlEncoding::Ascii => 0x7F,
        };
        text.chars()
            .map(|c| {
                u8::try_from(u32::from(c))
                    .ok()
                    .filter(|&b| u32::from(b) <= limit)
                    .ok_or_else(|| {
                        io::Error::new(
                            io::ErrorKind::InvalidInput,
                            format!("character {c:?} cannot be written as {self:?}"),
                        )
                    })
            })
            .collect()
    }
}

/// `encoding="..."` from the XML declaration, if there is one.
pub fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if !bytes.starts_with(b"<?xml") {
        return None;
    }
    let end = bytes.windows(2).position(|w| w == b"?>")?;
    // The declaration itself is ASCII.
    let decl: String = bytes[..end].iter().map(|&b| char::from(b)).collect();
    let rest = &decl[decl.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|q| *q == '"' || *q == '\'')?;
    let value = &rest[1..];
    Some(value[..value.find(quote)?].to_string())
}

/// A decoded document plus what is needed to write it back the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlText {
    pub text: String,
    pub encoding: XmlEncoding,
    bom: bool,
}

impl XmlText {
    pub fn decode(bytes: &[u8]) -> io::Result<Self> {
        let encoding = match declared_encoding(bytes) {
            None => XmlEncoding::Utf8,
            Some(label) => XmlEncoding::from_label(&label).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unsupported XML encoding '{label}'"),
                )
            })?,
        };
        let bom = encoding == XmlEncoding::Utf8 && bytes.starts_with(UTF8_BOM);
        let body = if bom { &bytes[UTF8_BOM.len()..] } else { bytes };
        Ok(Self {
            text: encoding.decode(body)?,
            encoding,
            bom,
        })
    }

    /// Same encoding and BOM, new text.
    pub fn with_text(&self, text: String) -> Self {
        Self {
            text,
            encoding: self.encoding,
            bom: self.bom,
        }
    }

    pub fn encode(&self) -> io::Result<Vec<u8>> {
        let mut out = if self.bom { UTF8_BOM.to_vec() } else { Vec::new() };
        out.extend(self.encoding.encode(&self.text)?);
        Ok(out)
    }
}

pub fn read_xml(path: &Path) -> io::Result<XmlText> {
    XmlText::decode(&fs::read(path)?)
}

pub fn write_xml(path: &Path, doc: &XmlText) -> io::Result<()> {
    fs::write(path, doc.encode()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prolog_encoding_is_found() {
        assert_eq!(
            declared_encoding(b"<?xml version=\"1.0\" encoding='ISO-8859-1'?><server/>"),
            Some("ISO-8859-1".to_string())
        );
        assert_eq!(declared_encoding(b"<?xml version=\"1.0\"?><server/>"), None);
        assert_eq!(declared_encoding(b"<server/>"), None);
    }

    #[test]
    fn latin1_round_trips_byte_for_byte() {
        let bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<server description=\"caf\xe9\"/>\n";
        let doc = XmlText::decode(bytes).unwrap();
        assert_eq!(doc.encoding, XmlEncoding::Latin1);
        assert!(doc.text.contains("café"));
        assert_eq!(doc.encode().unwrap(), bytes.to_vec());
    }

    #[test]
    fn bom_is_kept() {
        let bytes = b"\xEF\xBB\xBF<server/>";
        let doc = XmlText::decode(bytes).unwrap();
        assert_eq!(doc.text, "<server/>");
        assert_eq!(doc.encode().unwrap(), bytes.to_vec());
    }

    #[test]
    fn unknown_encoding_is_invalid_data() {
        let err = XmlText::decode(b"<?xml version=\"1.0\" encoding=\"EBCDIC-CP-US\"?><server/>")
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("EBCDIC-CP-US"));
    }

    #[test]
    fn latin1_cannot_encode_wide_characters() {
        let doc = XmlText::decode(b"<?xml version=\"1.0\" encoding=\"latin1\"?><server/>").unwrap();
        assert!(doc.with_text("<server>\u{2603}</server>".to_string()).encode().is_err());
    }
}
