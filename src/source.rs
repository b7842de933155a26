//! Input record readers
//!
//! Turns a byte stream into record texts, either the page texts of a
//! MediaWiki XML export or one record per line. Input in another encoding is
//! transcoded to UTF-8 on the fly.

use crate::cli::InputFormat;
use crate::error::{NamesError, Result};
use bstr::ByteSlice;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Bytes sampled from the start of a file for encoding detection
const SAMPLE_SIZE: usize = 64 * 1024;

const INPUT_BUFFER_SIZE: usize = 256 * 1024;

/// Guess the encoding of a sample: BOM first, then statistical detection.
pub fn detect_encoding(sample: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(sample) {
        return encoding;
    }

    // A sample cut in the middle of a multi-byte sequence is still UTF-8
    let sample = match std::str::from_utf8(sample) {
        Ok(_) => return encoding_rs::UTF_8,
        Err(e) if e.error_len().is_none() => return encoding_rs::UTF_8,
        Err(_) => sample,
    };

    let mut detector = EncodingDetector::new();
    detector.feed(sample, true);
    detector.guess(None, true)
}

/// Resolve an encoding label such as `latin1` or `utf-16le`.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| NamesError::InvalidConfig(format!("unknown encoding '{}'", label)))
}

/// Open the input as a buffered UTF-8 reader.
///
/// Files without an explicit encoding are sniffed; stdin is assumed to be
/// UTF-8 unless it starts with a BOM.
pub fn open_input(path: Option<&Path>, encoding_label: Option<&str>) -> Result<Box<dyn BufRead>> {
    let explicit = encoding_label.map(encoding_for_label).transpose()?;

    let (reader, encoding): (Box<dyn Read>, Option<&'static Encoding>) = match path {
        Some(path) => {
            let mut file = File::open(path)?;
            let encoding = match explicit {
                Some(encoding) => encoding,
                None => {
                    let mut sample = Vec::with_capacity(SAMPLE_SIZE);
                    file.by_ref().take(SAMPLE_SIZE as u64).read_to_end(&mut sample)?;
                    file.seek(SeekFrom::Start(0))?;
                    detect_encoding(&sample)
                }
            };
            log::debug!("reading {:?} as {}", path, encoding.name());
            (Box::new(file), Some(encoding))
        }
        None => (Box::new(io::stdin()), explicit),
    };

    let decoder = DecodeReaderBytesBuilder::new()
        .encoding(encoding)
        .bom_override(true)
        .utf8_passthru(true)
        .build(reader);

    Ok(Box::new(BufReader::with_capacity(INPUT_BUFFER_SIZE, decoder)))
}

/// Record iterator for the given input format
pub fn read_records<'a, R: BufRead + 'a>(
    reader: R,
    format: InputFormat,
) -> Box<dyn Iterator<Item = Result<String>> + 'a> {
    match format {
        InputFormat::Xml => Box::new(PageTextReader::new(reader)),
        InputFormat::Lines => Box::new(LineRecordReader::new(reader)),
    }
}

/// Streams one record per `<page>` of a MediaWiki export: the `<text>` of
/// its first `<revision>`. Later revisions of the same page are skipped so a
/// dump with history counts every page once.
///
/// A `<text>` outside any `<page>` is a record of its own. A self-closing
/// `<text/>` yields an empty record; an element cut off by the end of input
/// is dropped.
pub struct PageTextReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    record: String,
    in_page: bool,
    revisions: usize,
    page_done: bool,
    in_text: bool,
    done: bool,
}

impl<R: BufRead> PageTextReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Reader::from_reader(reader),
            buf: Vec::with_capacity(4096),
            record: String::new(),
            in_page: false,
            revisions: 0,
            page_done: false,
            in_text: false,
            done: false,
        }
    }

    /// Whether a `<text>` starting now belongs to the record stream
    fn wants_text(&self) -> bool {
        if self.in_page {
            self.revisions == 1 && !self.page_done
        } else {
            true
        }
    }

    fn fail(&mut self, err: quick_xml::Error) -> NamesError {
        self.done = true;
        match err {
            quick_xml::Error::Io(e) => NamesError::Input(io::Error::new(e.kind(), e.to_string())),
            other => NamesError::Xml(other),
        }
    }
}

impl<R: BufRead> Iterator for PageTextReader<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let wants_text = self.wants_text();
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    let position = self.reader.buffer_position();
                    log::debug!("XML error at byte {}", position);
                    return Some(Err(self.fail(e)));
                }
            };

            match event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"page" => {
                        self.in_page = true;
                        self.revisions = 0;
                        self.page_done = false;
                    }
                    b"revision" if self.in_page => self.revisions += 1,
                    b"text" if wants_text => {
                        self.in_text = true;
                        self.record.clear();
                    }
                    _ => {}
                },
                Event::Empty(e) if e.local_name().as_ref() == b"text" && wants_text => {
                    self.page_done = self.in_page;
                    return Some(Ok(String::new()));
                }
                Event::Text(t) if self.in_text => match t.unescape() {
                    Ok(text) => self.record.push_str(&text),
                    Err(e) => {
                        log::warn!("keeping undecodable entity text as is: {}", e);
                        self.record.push_str(&String::from_utf8_lossy(&t));
                    }
                },
                Event::CData(c) if self.in_text => {
                    self.record.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"text" if self.in_text => {
                        self.in_text = false;
                        self.page_done = self.in_page;
                        return Some(Ok(std::mem::take(&mut self.record)));
                    }
                    b"page" => self.in_page = false,
                    _ => {}
                },
                Event::Eof => {
                    if self.in_text {
                        log::warn!("input ended inside a <text> element; dropping it");
                    }
                    self.done = true;
                    return None;
                }
                _ => {}
            }
        }
    }
}

/// One record per input line, line terminators removed.
pub struct LineRecordReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LineRecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(4096),
        }
    }
}

impl<R: BufRead> Iterator for LineRecordReader<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();

        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let line = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf);
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                Some(Ok(line.to_str_lossy().into_owned()))
            }
            Err(e) => Some(Err(NamesError::Input(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn pages(xml: &str) -> Vec<String> {
        PageTextReader::new(Cursor::new(xml.as_bytes().to_vec()))
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn test_page_text_reader() {
        let xml = r#"<mediawiki>
  <page>
    <title>Otto Schmidt</title>
    <revision>
      <id>1</id>
      <text bytes="52" xml:space="preserve">'''Otto Schmidt''' war ein Maler.
{{Personendaten
|NAME=Schmidt, Otto
}}</text>
    </revision>
  </page>
  <page>
    <title>Leer</title>
    <revision>
      <text bytes="0" />
    </revision>
  </page>
  <page>
    <revision><text>kurz</text></revision>
  </page>
</mediawiki>
"#;

        let records = pages(xml);
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            "'''Otto Schmidt''' war ein Maler.\n{{Personendaten\n|NAME=Schmidt, Otto\n}}"
        );
        assert_eq!(records[1], "");
        assert_eq!(records[2], "kurz");
    }

    #[test]
    fn test_page_text_reader_ignores_other_tags() {
        let records = pages("<textarea>no</textarea><texts>no</texts><text>yes</text>");
        assert_eq!(records, vec!["yes"]);
    }

    #[test]
    fn test_page_text_reader_unescapes() {
        let records = pages("<text>&lt;ref&gt;Doe &amp; Co&lt;/ref&gt; &quot;x&quot;</text>");
        assert_eq!(records, vec!["<ref>Doe & Co</ref> \"x\""]);
    }

    #[test]
    fn test_page_text_reader_drops_unterminated() {
        let records = pages("<text>one</text>\n<text>cut off");
        assert_eq!(records, vec!["one"]);
    }

    #[test]
    fn test_page_text_reader_start_tag_across_lines() {
        let xml = "<page><revision><text bytes=\"9\"\n xml:space=\"preserve\">{{Personendaten|NAME=A, Otto}}</text></revision></page>";
        assert_eq!(pages(xml), vec!["{{Personendaten|NAME=A, Otto}}"]);
    }

    #[test]
    fn test_page_text_reader_cdata() {
        let xml = "<text>Vorwort <![CDATA[{{Personendaten|NAME=A, <Otto>}}]]></text>";
        assert_eq!(pages(xml), vec!["Vorwort {{Personendaten|NAME=A, <Otto>}}"]);
    }

    #[test]
    fn test_page_text_reader_first_revision_only() {
        let xml = r#"<mediawiki>
  <page>
    <title>Otto Schmidt</title>
    <revision><id>2</id><text>{{Personendaten|NAME=Schmidt, Otto}}</text></revision>
    <revision><id>1</id><text>{{Personendaten|NAME=Schmidt, Otto Karl}}</text></revision>
  </page>
  <page>
    <revision><text>zweite Seite</text></revision>
  </page>
</mediawiki>"#;

        assert_eq!(
            pages(xml),
            vec!["{{Personendaten|NAME=Schmidt, Otto}}", "zweite Seite"]
        );
    }

    #[test]
    fn test_page_text_reader_numeric_references() {
        assert_eq!(pages("<text>M&#252;ller &#xFC;</text>"), vec!["Müller ü"]);
    }

    #[test]
    fn test_page_text_reader_malformed() {
        let mut reader = PageTextReader::new(Cursor::new(b"<page><text>a</page>".to_vec()));
        assert!(matches!(reader.next(), Some(Err(NamesError::Xml(_)))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_line_record_reader() {
        let reader = LineRecordReader::new(Cursor::new(b"one\r\ntwo\n\nthree".to_vec()));
        let lines: Vec<_> = reader.map(|r| r.unwrap()).collect();
        assert_eq!(lines, vec!["one", "two", "", "three"]);
    }

    #[test]
    fn test_detect_encoding() {
        assert_eq!(detect_encoding(b"plain ascii"), encoding_rs::UTF_8);
        assert_eq!(detect_encoding("Müller".as_bytes()), encoding_rs::UTF_8);
        assert_eq!(detect_encoding(&[0xFF, 0xFE, b'a', 0]), encoding_rs::UTF_16LE);

        // "Jürgen" cut inside the two-byte ü
        assert_eq!(detect_encoding(&"Jürgen".as_bytes()[..2]), encoding_rs::UTF_8);

        let latin1 = b"M\xfcller, J\xfcrgen; Gr\xf6\xdfe, Stra\xdfe, sch\xf6n, \xc4rger";
        assert_ne!(detect_encoding(latin1), encoding_rs::UTF_8);
    }

    #[test]
    fn test_unknown_encoding_label() {
        assert!(matches!(
            encoding_for_label("klingon"),
            Err(NamesError::InvalidConfig(_))
        ));
        assert_eq!(encoding_for_label("latin1").unwrap(), encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn test_open_input_transcodes() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"M\xfcller, Anna\n").unwrap();
        file.flush().unwrap();

        let reader = open_input(Some(file.path()), Some("latin1")).unwrap();
        let lines: Vec<_> = read_records(reader, InputFormat::Lines)
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(lines, vec!["Müller, Anna"]);
    }

    #[test]
    fn test_open_input_missing_file() {
        let result = open_input(Some(Path::new("/nonexistent/dump.xml")), None);
        assert!(matches!(result, Err(NamesError::Io(_))));
    }
}
