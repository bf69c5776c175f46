//! Line sources feeding the extractor.

use std::io::{self, BufRead};

/// Forward-only producer of text lines.
///
/// Implementations own whatever handle backs the lines; the extractor holds
/// its source exclusively for the whole session.
pub trait LineSource {
    /// Next line without its terminator, or `None` at end of stream.
    fn next_line(&mut self) -> io::Result<Option<String>>;

    /// Release the underlying handle. Must tolerate repeated calls.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        (**self).next_line()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// UTF-8 lines read from any buffered reader.
///
/// `\n` and `\r\n` terminators are stripped. Bytes that are not valid UTF-8
/// surface as an [`io::ErrorKind::InvalidData`] error.
#[derive(Debug)]
pub struct ReaderLineSource<R> {
    reader: Option<R>,
    buf: String,
}

impl<R: BufRead> ReaderLineSource<R> {
    /// Wrap `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            buf: String::new(),
        }
    }

    /// Whether the reader has been released.
    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }
}

impl<R: BufRead> LineSource for ReaderLineSource<R> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        self.buf.clear();
        if reader.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        if self.buf.ends_with('\n') {
            self.buf.pop();
            if self.buf.ends_with('\r') {
                self.buf.pop();
            }
        }
        Ok(Some(self.buf.clone()))
    }

    fn close(&mut self) -> io::Result<()> {
        self.reader = None;
        Ok(())
    }
}

/// Lines supplied by an in-memory iterator.
#[derive(Debug)]
pub struct IterLineSource<I> {
    lines: Option<I>,
}

impl<I> IterLineSource<I> {
    /// Wrap anything that yields lines.
    pub fn new<T>(lines: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            lines: Some(lines.into_iter()),
        }
    }
}

impl<I, S> LineSource for IterLineSource<I>
where
    I: Iterator<Item = S>,
    S: Into<String>,
{
    fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.as_mut().and_then(Iterator::next).map(Into::into))
    }

    fn close(&mut self) -> io::Result<()> {
        self.lines = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn drain(source: &mut impl LineSource) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = source.next_line().expect("read line") {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn reader_strips_terminators() {
        let mut source = ReaderLineSource::new(Cursor::new("a\nb\r\n\nc"));
        assert_eq!(drain(&mut source), vec!["a", "b", "", "c"]);
        assert_eq!(source.next_line().expect("eof"), None);
    }

    #[test]
    fn reader_rejects_invalid_utf8() {
        let bytes: &[u8] = b"ok\n\xff\xfe\n";
        let mut source = ReaderLineSource::new(Cursor::new(bytes));
        assert_eq!(source.next_line().expect("first line").as_deref(), Some("ok"));
        let err = source.next_line().expect_err("invalid utf-8");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn close_is_idempotent() {
        let mut source = ReaderLineSource::new(Cursor::new("a\nb\n"));
        source.close().expect("close");
        source.close().expect("close again");
        assert!(source.is_closed());
        assert_eq!(source.next_line().expect("closed"), None);
    }

    #[test]
    fn iter_source_yields_lines() {
        let mut source = IterLineSource::new(vec!["x", "y"]);
        assert_eq!(drain(&mut source), vec!["x", "y"]);

        let mut source = IterLineSource::new(vec![String::from("z")]);
        source.close().expect("close");
        assert_eq!(source.next_line().expect("closed"), None);
    }
}
