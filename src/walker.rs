//! Record walking over FASTQ and SAM text
//!
//! [`RecordWalker`] splits a byte stream into records and locates the quality
//! span of each one. The record's bytes are kept verbatim, terminators
//! included, so a record that is not transformed is written back unchanged.
//!
//! Lines are read through a [`LineReader`], which grows its buffer on demand but
//! refuses lines longer than a configured maximum instead of truncating them.

use std::io::{self, BufRead};
use std::ops::Range;

use crate::error::{MalformedRecordError, Result};
use crate::io::SeqFormat;

/// Default upper bound on a single line, terminator included
pub const DEFAULT_MAX_LINE_LEN: usize = 1 << 16;

/// 1-based index of the SAM field holding the quality string
pub const SAM_QUAL_FIELD: usize = 11;

/// SAM placeholder for an alignment stored without quality scores
pub const SAM_MISSING_QUAL: &[u8] = b"*";

/// Number of lines in a FASTQ record
pub const FASTQ_LINES: usize = 4;

/// A byte range inside a record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    offset: usize,
    length: usize,
}
impl Span {
    #[must_use]
    pub fn new(offset: usize, length: usize) -> Self {
        Span { offset, length }
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Length of a line without its `\n` or `\r\n` terminator
#[must_use]
pub fn content_len(line: &[u8]) -> usize {
    match line {
        [.., b'\r', b'\n'] => line.len() - 2,
        [.., b'\n'] => line.len() - 1,
        _ => line.len(),
    }
}

/// Locates the `field`-th (1-based) space- or tab-delimited field of a line
///
/// `line` must not include its terminator. The last field runs to the end of
/// the line.
#[must_use]
pub fn locate_field(line: &[u8], field: usize) -> Option<Span> {
    let mut n_fields = 0;
    let mut start = 0;
    let mut was_whitespace = true;
    for (pos, &byte) in line.iter().enumerate() {
        let whitespace = byte == b' ' || byte == b'\t';
        if whitespace && !was_whitespace {
            if n_fields == field {
                return Some(Span::new(start, pos - start));
            }
            was_whitespace = true;
        } else if !whitespace && was_whitespace {
            n_fields += 1;
            start = pos;
            was_whitespace = false;
        }
    }
    (n_fields == field && !was_whitespace).then(|| Span::new(start, line.len() - start))
}

/// A growable line reader with a hard maximum line length
pub struct LineReader<R: BufRead> {
    inner: R,
    max_line_len: usize,
    n_lines: usize,
}
impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_max_line_len(inner, DEFAULT_MAX_LINE_LEN)
    }

    pub fn with_max_line_len(inner: R, max_line_len: usize) -> Self {
        Self {
            inner,
            max_line_len,
            n_lines: 0,
        }
    }

    pub fn set_max_line_len(&mut self, max_line_len: usize) {
        self.max_line_len = max_line_len;
    }

    /// Number of lines read so far
    #[must_use]
    pub fn n_lines(&self) -> usize {
        self.n_lines
    }

    /// Appends the next line, terminator included, to `buf`
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A line was appended (the last line of a stream may lack a terminator)
    /// * `Ok(false)` - The stream is exhausted
    /// * `Err(Error)` - The line exceeds the maximum length, or the read failed
    pub fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<bool> {
        let start = buf.len();
        loop {
            let available = match self.inner.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if available.is_empty() {
                break;
            }
            let (found, used) = match memchr::memchr(b'\n', available) {
                Some(idx) => (true, idx + 1),
                None => (false, available.len()),
            };
            if buf.len() - start + used > self.max_line_len {
                return Err(MalformedRecordError::LineTooLong {
                    line: self.n_lines + 1,
                    limit: self.max_line_len,
                }
                .into());
            }
            buf.extend_from_slice(&available[..used]);
            self.inner.consume(used);
            if found {
                break;
            }
        }
        if buf.len() == start {
            return Ok(false);
        }
        self.n_lines += 1;
        Ok(true)
    }
}

/// What a record is, as far as quality handling is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A four-line FASTQ entry
    Fastq,
    /// A SAM header line (starts with `@`)
    SamHeader,
    /// A SAM alignment line
    SamAlignment,
}

/// One record's verbatim bytes and the location of its quality span
#[derive(Debug, Clone)]
pub struct Record {
    kind: RecordKind,
    number: usize,
    data: Vec<u8>,
    qual: Option<Span>,
}
impl Record {
    fn empty() -> Self {
        Self {
            kind: RecordKind::Fastq,
            number: 0,
            data: Vec::new(),
            qual: None,
        }
    }

    fn reset(&mut self, kind: RecordKind, number: usize) {
        self.kind = kind;
        self.number = number;
        self.data.clear();
        self.qual = None;
    }

    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// 1-based position of the record in its stream
    #[must_use]
    pub fn number(&self) -> usize {
        self.number
    }

    /// The full record text, terminators included
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn span(&self) -> Option<Span> {
        self.qual
    }

    /// The raw Phred+33 quality bytes, if the record has any
    #[must_use]
    pub fn qual(&self) -> Option<&[u8]> {
        self.qual.map(|span| &self.data[span.range()])
    }

    pub fn qual_mut(&mut self) -> Option<&mut [u8]> {
        self.qual.map(|span| &mut self.data[span.range()])
    }

    /// Substitutes `qual` for the located quality span
    ///
    /// The replacement may differ in length; the rest of the record is kept
    /// as is. Returns `false` (and changes nothing) when there is no span.
    pub fn replace_qual(&mut self, qual: &[u8]) -> bool {
        let Some(span) = self.qual else {
            return false;
        };
        self.data.splice(span.range(), qual.iter().copied());
        self.qual = Some(Span::new(span.offset(), qual.len()));
        true
    }
}

/// Yields the records of a FASTQ or SAM stream one at a time
///
/// The walker owns a single reusable [`Record`]; each call to
/// [`RecordWalker::next_record`] overwrites it.
pub struct RecordWalker<R: BufRead> {
    reader: LineReader<R>,
    format: SeqFormat,
    record: Record,
    n_records: usize,
}
impl<R: BufRead> RecordWalker<R> {
    pub fn new(inner: R, format: SeqFormat) -> Self {
        Self::from_line_reader(LineReader::new(inner), format)
    }

    pub fn from_line_reader(reader: LineReader<R>, format: SeqFormat) -> Self {
        Self {
            reader,
            format,
            record: Record::empty(),
            n_records: 0,
        }
    }

    #[must_use]
    pub fn format(&self) -> SeqFormat {
        self.format
    }

    /// Number of records yielded so far
    #[must_use]
    pub fn n_records(&self) -> usize {
        self.n_records
    }

    /// Reads the next record
    ///
    /// Returns `Ok(None)` once the stream is exhausted on a record boundary.
    pub fn next_record(&mut self) -> Result<Option<&mut Record>> {
        let found = match self.format {
            SeqFormat::Fastq => self.fill_fastq()?,
            SeqFormat::Sam => self.fill_sam()?,
        };
        if !found {
            return Ok(None);
        }
        self.n_records += 1;
        Ok(Some(&mut self.record))
    }

    fn fill_fastq(&mut self) -> Result<bool> {
        let number = self.n_records + 1;
        self.record.reset(RecordKind::Fastq, number);
        let mut line_start = 0;
        for lines in 0..FASTQ_LINES {
            line_start = self.record.data.len();
            if !self.reader.read_line(&mut self.record.data)? {
                if lines == 0 {
                    return Ok(false);
                }
                return Err(MalformedRecordError::TruncatedFastq {
                    record: number,
                    lines,
                }
                .into());
            }
        }
        let qual_line = &self.record.data[line_start..];
        self.record.qual = Some(Span::new(line_start, content_len(qual_line)));
        Ok(true)
    }

    fn fill_sam(&mut self) -> Result<bool> {
        let number = self.n_records + 1;
        self.record.reset(RecordKind::SamAlignment, number);
        if !self.reader.read_line(&mut self.record.data)? {
            return Ok(false);
        }
        let data = &self.record.data;
        if data.first() == Some(&b'@') {
            self.record.kind = RecordKind::SamHeader;
            return Ok(true);
        }
        self.record.qual = locate_field(&data[..content_len(data)], SAM_QUAL_FIELD)
            .filter(|span| &data[span.range()] != SAM_MISSING_QUAL);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn walk(input: &[u8], format: SeqFormat) -> Result<Vec<Record>> {
        let mut walker = RecordWalker::new(input, format);
        let mut records = Vec::new();
        while let Some(record) = walker.next_record()? {
            records.push(record.clone());
        }
        Ok(records)
    }

    // ==================== Field Location Tests ====================

    #[test]
    fn test_locate_field() {
        let line = b"a\tb\tc\td\te\tf\tg\th\ti\tj\tIIIIII\textra";
        let span = locate_field(line, 11).unwrap();
        assert_eq!(&line[span.range()], b"IIIIII");
    }

    #[test]
    fn test_locate_last_field() {
        let line = b"a b c d e f g h i j FFFF";
        let span = locate_field(line, 11).unwrap();
        assert_eq!(&line[span.range()], b"FFFF");
    }

    #[test]
    fn test_locate_field_collapses_whitespace() {
        let line = b"  a \t b c d e f g h i j  QQ  ";
        let span = locate_field(line, 11).unwrap();
        assert_eq!(&line[span.range()], b"QQ");
        assert_eq!(&line[locate_field(line, 1).unwrap().range()], b"a");
    }

    #[test]
    fn test_locate_missing_field() {
        assert_eq!(locate_field(b"a\tb\tc", 11), None);
        assert_eq!(locate_field(b"", 11), None);
    }

    #[test]
    fn test_content_len() {
        assert_eq!(content_len(b"IIII\n"), 4);
        assert_eq!(content_len(b"IIII\r\n"), 4);
        assert_eq!(content_len(b"IIII"), 4);
        assert_eq!(content_len(b"\n"), 0);
        assert_eq!(content_len(b""), 0);
    }

    // ==================== LineReader Tests ====================

    #[test]
    fn test_line_reader_final_line_without_newline() -> Result<()> {
        let mut reader = LineReader::new(&b"one\ntwo"[..]);
        let mut buf = Vec::new();
        assert!(reader.read_line(&mut buf)?);
        assert!(reader.read_line(&mut buf)?);
        assert!(!reader.read_line(&mut buf)?);
        assert_eq!(buf, b"one\ntwo");
        assert_eq!(reader.n_lines(), 2);
        Ok(())
    }

    #[test]
    fn test_line_reader_grows_past_internal_buffer() -> Result<()> {
        let mut line = vec![b'I'; 20_000];
        line.push(b'\n');
        let inner = std::io::BufReader::with_capacity(64, line.as_slice());
        let mut reader = LineReader::new(inner);
        let mut buf = Vec::new();
        assert!(reader.read_line(&mut buf)?);
        assert_eq!(buf, line);
        Ok(())
    }

    #[test]
    fn test_line_reader_rejects_long_line() {
        let mut reader = LineReader::with_max_line_len(&b"0123456789\nok\n"[..], 8);
        let mut buf = Vec::new();
        let err = reader.read_line(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            Error::Malformed(MalformedRecordError::LineTooLong { line: 1, limit: 8 })
        ));
    }

    #[test]
    fn test_line_reader_limit_includes_terminator() -> Result<()> {
        let mut reader = LineReader::with_max_line_len(&b"1234567\n"[..], 8);
        let mut buf = Vec::new();
        assert!(reader.read_line(&mut buf)?);
        Ok(())
    }

    // ==================== FASTQ Tests ====================

    #[test]
    fn test_fastq_records() -> Result<()> {
        let input = b"@r1\nACGT\n+\nIIII\n@r2\nAC\n+\n#'\n";
        let records = walk(input, SeqFormat::Fastq)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].qual(), Some(&b"IIII"[..]));
        assert_eq!(records[0].data(), b"@r1\nACGT\n+\nIIII\n");
        assert_eq!(records[1].qual(), Some(&b"#'"[..]));
        assert_eq!(records[1].number(), 2);
        assert_eq!(records[1].kind(), RecordKind::Fastq);
        Ok(())
    }

    #[test]
    fn test_fastq_crlf() -> Result<()> {
        let records = walk(b"@r1\r\nACGT\r\n+\r\nIIII\r\n", SeqFormat::Fastq)?;
        assert_eq!(records[0].qual(), Some(&b"IIII"[..]));
        assert!(records[0].data().ends_with(b"IIII\r\n"));
        Ok(())
    }

    #[test]
    fn test_fastq_missing_final_newline() -> Result<()> {
        let records = walk(b"@r1\nACGT\n+\nIIII", SeqFormat::Fastq)?;
        assert_eq!(records[0].qual(), Some(&b"IIII"[..]));
        Ok(())
    }

    #[test]
    fn test_fastq_truncated() {
        let err = walk(b"@r1\nACGT\n+\nIIII\n@r2\nACGT\n", SeqFormat::Fastq).unwrap_err();
        assert!(matches!(
            err,
            Error::Malformed(MalformedRecordError::TruncatedFastq {
                record: 2,
                lines: 2
            })
        ));
    }

    #[test]
    fn test_fastq_empty_stream() -> Result<()> {
        assert!(walk(b"", SeqFormat::Fastq)?.is_empty());
        Ok(())
    }

    // ==================== SAM Tests ====================

    #[test]
    fn test_sam_records() -> Result<()> {
        let input = b"@HD\tVN:1.6\nq1\t0\tchr1\t1\t60\t4M\t*\t0\t0\tACGT\tIIII\tNM:i:0\nshort\tline\n";
        let records = walk(input, SeqFormat::Sam)?;
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].kind(), RecordKind::SamHeader);
        assert_eq!(records[0].qual(), None);
        assert_eq!(records[1].kind(), RecordKind::SamAlignment);
        assert_eq!(records[1].qual(), Some(&b"IIII"[..]));
        assert_eq!(records[2].qual(), None);
        assert_eq!(records[2].data(), b"short\tline\n");
        Ok(())
    }

    #[test]
    fn test_sam_eleven_fields_exactly() -> Result<()> {
        let input = b"q1\t0\tchr1\t1\t60\t4M\t*\t0\t0\tACGT\tII#I\n";
        let records = walk(input, SeqFormat::Sam)?;
        assert_eq!(records[0].qual(), Some(&b"II#I"[..]));
        Ok(())
    }

    #[test]
    fn test_sam_missing_quality_has_no_span() -> Result<()> {
        let input = b"q1\t0\tchr1\t1\t60\t4M\t*\t0\t0\tACGT\t*\n\
            q2\t0\tchr1\t1\t60\t4M\t*\t0\t0\tACGT\t*\tNM:i:0\n\
            q3\t0\tchr1\t1\t60\t1M\t*\t0\t0\tA\t**\n";
        let records = walk(input, SeqFormat::Sam)?;
        assert_eq!(records[0].qual(), None);
        assert_eq!(records[1].qual(), None);
        assert_eq!(records[2].qual(), Some(&b"**"[..]));
        Ok(())
    }

    // ==================== Record Tests ====================

    #[test]
    fn test_replace_qual_changes_length() -> Result<()> {
        let input = b"q\t0\t*\t0\t0\t*\t*\t0\t0\tAC\tII\tXX:Z:y\n";
        let mut walker = RecordWalker::new(&input[..], SeqFormat::Sam);
        let record = walker.next_record()?.unwrap();
        assert!(record.replace_qual(b"#"));
        assert_eq!(record.data(), b"q\t0\t*\t0\t0\t*\t*\t0\t0\tAC\t#\tXX:Z:y\n");
        assert_eq!(record.qual(), Some(&b"#"[..]));
        Ok(())
    }

    #[test]
    fn test_replace_qual_without_span() -> Result<()> {
        let mut walker = RecordWalker::new(&b"@SQ\tSN:chr1\n"[..], SeqFormat::Sam);
        let record = walker.next_record()?.unwrap();
        assert!(!record.replace_qual(b"IIII"));
        assert_eq!(record.data(), b"@SQ\tSN:chr1\n");
        Ok(())
    }

    #[test]
    fn test_span_range() {
        let span = Span::new(12, 3);
        assert_eq!(span.range(), 12..15);
        assert_eq!(span.offset(), 12);
        assert!(!span.is_empty());
        assert!(Span::new(4, 0).is_empty());
    }
}
