use std::io::{self, ErrorKind, Read};
use std::thread;
use std::time::Duration;

/// Size of the read buffer, the only place bytes from the source are held
const BUFFER_SIZE: usize = 4096;

/// Outcome of a scan over the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// The (first) token was found and consumed
    First,
    /// The second token of a `scan_to_either` was found and consumed
    Second,
    /// The source reported end of data before any token was found
    Exhausted,
    /// The source has no data right now but is not exhausted, a later scan resumes
    Starved,
}

/// Result of refilling the buffer
enum Fill {
    Data,
    Eof,
    Starved,
}

/// Incremental KMP matcher for one literal token
#[derive(Debug, Clone)]
struct Matcher {
    token: Vec<u8>,
    fail: Vec<usize>,
    matched: usize,
}

impl Matcher {
    fn new(token: &str) -> Matcher {
        let token = token.as_bytes().to_vec();
        let mut fail = vec![0; token.len()];
        let mut k = 0;
        for i in 1..token.len() {
            while k > 0 && token[i] != token[k] {
                k = fail[k - 1];
            }
            if token[i] == token[k] {
                k += 1;
            }
            fail[i] = k;
        }

        Matcher { token, fail, matched: 0 }
    }

    /// Feeds one byte, returns true when the full token has just been seen
    fn feed(&mut self, b: u8) -> bool {
        while self.matched > 0 && self.token[self.matched] != b {
            self.matched = self.fail[self.matched - 1];
        }
        if self.token[self.matched] == b {
            self.matched += 1;
        }
        if self.matched == self.token.len() {
            self.matched = 0;
            true
        } else {
            false
        }
    }
}

/// Forward-only cursor over a live byte source.
///
/// Bytes are consumed as they are scanned, nothing is ever rewound. Any `Read` can back
/// the cursor, a reader returning `WouldBlock` or `TimedOut` is treated as momentarily
/// starved rather than exhausted.
pub struct StreamCursor<R> {
    reader: R,
    buf: Box<[u8]>,
    pos: usize,
    len: usize,
    eof: bool,
    consumed: u64,
    pending: Option<(Matcher, Option<Matcher>)>,
    starve_retries: usize,
    starve_pause: Duration,
}

impl<R: Read> StreamCursor<R> {
    /// Returns a cursor reading from the given source
    ///
    /// # Arguments
    ///
    /// * 'reader' - the byte source, e.g. an http body or a file
    pub fn new(reader: R) -> StreamCursor<R> {
        Self {
            reader,
            buf: vec![0u8; BUFFER_SIZE].into_boxed_slice(),
            pos: 0,
            len: 0,
            eof: false,
            consumed: 0,
            pending: None,
            starve_retries: 3,
            starve_pause: Duration::from_millis(50),
        }
    }

    /// Sets how peeks and reads behave when the source is starved
    ///
    /// # Arguments
    ///
    /// * 'retries' - number of extra attempts before giving up
    /// * 'pause' - sleep between attempts
    pub fn with_patience(mut self, retries: usize, pause: Duration) -> StreamCursor<R> {
        self.starve_retries = retries;
        self.starve_pause = pause;
        self
    }

    /// Number of bytes consumed from the source so far
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Advances past the first occurrence of `token`
    ///
    /// # Arguments
    ///
    /// * 'token' - literal to look for
    pub fn scan_to(&mut self, token: &str) -> io::Result<Scan> {
        let matchers = match self.pending.take() {
            Some((a, None)) if a.token == token.as_bytes() => (a, None),
            _ => (Matcher::new(token), None),
        };
        self.scan(matchers)
    }

    /// Advances past the first occurrence of either `first` or `second`, reporting which
    ///
    /// # Arguments
    ///
    /// * 'first' - literal reported as `Scan::First`
    /// * 'second' - literal reported as `Scan::Second`
    pub fn scan_to_either(&mut self, first: &str, second: &str) -> io::Result<Scan> {
        let matchers = match self.pending.take() {
            Some((a, Some(b))) if a.token == first.as_bytes() && b.token == second.as_bytes() => (a, Some(b)),
            _ => (Matcher::new(first), Some(Matcher::new(second))),
        };
        self.scan(matchers)
    }

    fn scan(&mut self, mut matchers: (Matcher, Option<Matcher>)) -> io::Result<Scan> {
        loop {
            match self.fill()? {
                Fill::Eof => return Ok(Scan::Exhausted),
                Fill::Starved => {
                    self.pending = Some(matchers);
                    return Ok(Scan::Starved);
                }
                Fill::Data => {}
            }

            while self.pos < self.len {
                let b = self.buf[self.pos];
                self.advance(1);
                if matchers.0.feed(b) {
                    return Ok(Scan::First);
                }
                if let Some(second) = matchers.1.as_mut() {
                    if second.feed(b) {
                        return Ok(Scan::Second);
                    }
                }
            }
        }
    }

    /// Skips whitespace and returns the next byte without consuming it.
    ///
    /// Starvation is retried according to the cursor patience. None means the source
    /// is exhausted or stayed starved.
    pub fn peek_significant(&mut self) -> io::Result<Option<u8>> {
        self.pending = None;
        loop {
            match self.fill_patiently()? {
                Fill::Data => {}
                _ => return Ok(None),
            }
            let b = self.buf[self.pos];
            if !b.is_ascii_whitespace() {
                return Ok(Some(b));
            }
            self.advance(1);
        }
    }

    /// Consumes the byte last returned by `peek_significant`
    pub fn skip_byte(&mut self) {
        if self.pos < self.len {
            self.advance(1);
        }
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
        self.consumed += n as u64;
    }

    fn fill_patiently(&mut self) -> io::Result<Fill> {
        let mut attempt = 0;
        loop {
            match self.fill()? {
                Fill::Starved if attempt < self.starve_retries => {
                    attempt += 1;
                    thread::sleep(self.starve_pause);
                }
                other => return Ok(other),
            }
        }
    }

    fn fill(&mut self) -> io::Result<Fill> {
        if self.pos < self.len {
            return Ok(Fill::Data);
        }
        if self.eof {
            return Ok(Fill::Eof);
        }

        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(Fill::Eof);
                }
                Ok(n) => {
                    self.pos = 0;
                    self.len = n;
                    return Ok(Fill::Data);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                    return Ok(Fill::Starved);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Hands out the stream bytes to a decoder.
///
/// Reads wait out starvation like `peek_significant` does, a source that stays starved
/// gives a `WouldBlock` error. Any partial token match is dropped.
impl<R: Read> Read for StreamCursor<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.pending = None;
        match self.fill_patiently()? {
            Fill::Data => {
                let n = out.len().min(self.len - self.pos);
                out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
                self.advance(n);
                Ok(n)
            }
            Fill::Eof => Ok(0),
            Fill::Starved => Err(io::Error::new(ErrorKind::WouldBlock, "stream starved")),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Reader handing out scripted chunks, `None` meaning one starved read
    pub(crate) struct ChunkedReader {
        chunks: VecDeque<Option<Vec<u8>>>,
    }

    impl ChunkedReader {
        pub(crate) fn new(chunks: Vec<Option<&str>>) -> ChunkedReader {
            let chunks = chunks
                .into_iter()
                .map(|c| c.map(|s| s.as_bytes().to_vec()))
                .collect();
            ChunkedReader { chunks }
        }
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunks.pop_front() {
                None => Ok(0),
                Some(None) => Err(io::Error::new(ErrorKind::WouldBlock, "starved")),
                Some(Some(mut chunk)) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    if n < chunk.len() {
                        self.chunks.push_front(Some(chunk.split_off(n)));
                    }
                    Ok(n)
                }
            }
        }
    }

    fn cursor(s: &str) -> StreamCursor<io::Cursor<Vec<u8>>> {
        StreamCursor::new(io::Cursor::new(s.as_bytes().to_vec()))
    }

    #[test]
    fn scan_to_consumes_through_token() {
        let mut c = cursor(r#"{"approvedTime":"x","timeSeries":[{"a":1}]}"#);
        assert_eq!(c.scan_to(r#""timeSeries":["#).unwrap(), Scan::First);
        assert_eq!(c.peek_significant().unwrap(), Some(b'{'));
        assert_eq!(c.scan_to_either(",", "]").unwrap(), Scan::Second);
    }

    #[test]
    fn scan_to_reports_exhaustion() {
        let mut c = cursor(r#"{"geometry":{}}"#);
        assert_eq!(c.scan_to(r#""timeSeries":["#).unwrap(), Scan::Exhausted);
        assert_eq!(c.scan_to(",").unwrap(), Scan::Exhausted);
    }

    #[test]
    fn overlapping_prefix_is_matched() {
        let mut c = cursor("aaab");
        assert_eq!(c.scan_to("aab").unwrap(), Scan::First);
        assert_eq!(c.consumed(), 4);
    }

    #[test]
    fn token_split_across_starved_reads_is_found() {
        let reader = ChunkedReader::new(vec![Some(r#"xx"timeSer"#), None, Some(r#"ies":[{}]"#)]);
        let mut c = StreamCursor::new(reader);
        assert_eq!(c.scan_to(r#""timeSeries":["#).unwrap(), Scan::Starved);
        assert_eq!(c.scan_to(r#""timeSeries":["#).unwrap(), Scan::First);
        assert_eq!(c.peek_significant().unwrap(), Some(b'{'));
    }

    #[test]
    fn either_reports_which_token() {
        let mut c = cursor(" , ]");
        assert_eq!(c.scan_to_either(",", "]").unwrap(), Scan::First);
        assert_eq!(c.scan_to_either(",", "]").unwrap(), Scan::Second);
        assert_eq!(c.scan_to_either(",", "]").unwrap(), Scan::Exhausted);
    }

    #[test]
    fn peek_skips_whitespace_only() {
        let mut c = cursor(" \n\t ]x");
        assert_eq!(c.peek_significant().unwrap(), Some(b']'));
        assert_eq!(c.peek_significant().unwrap(), Some(b']'));
        c.skip_byte();
        assert_eq!(c.peek_significant().unwrap(), Some(b'x'));
        c.skip_byte();
        assert_eq!(c.peek_significant().unwrap(), None);
        assert_eq!(c.consumed(), 6);
    }

    #[test]
    fn read_hands_out_remaining_bytes() {
        let mut c = cursor(r#"xx,{"a":1}"#);
        assert_eq!(c.scan_to(",").unwrap(), Scan::First);
        let mut rest = String::new();
        c.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, r#"{"a":1}"#);
        assert_eq!(c.consumed(), 10);
    }

    #[test]
    fn decoder_stops_at_end_of_object() {
        let mut c = cursor(r#"{"a":[1,2]},{"a":[3]}]"#);
        let first: serde_json::Value = serde::Deserialize::deserialize(
            &mut serde_json::Deserializer::from_reader(&mut c)
        ).unwrap();
        assert_eq!(first["a"][1], 2);
        assert_eq!(c.scan_to_either(",", "]").unwrap(), Scan::First);
        assert_eq!(c.peek_significant().unwrap(), Some(b'{'));
    }

    #[test]
    fn read_waits_out_short_starvation() {
        let reader = ChunkedReader::new(vec![Some(r#"{"a":"#), None, None, Some("1}")]);
        let mut c = StreamCursor::new(reader).with_patience(3, Duration::from_millis(1));
        let mut all = String::new();
        c.read_to_string(&mut all).unwrap();
        assert_eq!(all, r#"{"a":1}"#);
    }

    #[test]
    fn read_gives_up_on_long_starvation() {
        let reader = ChunkedReader::new(vec![Some(r#"{"a":"#), None, None, None, Some("1}")]);
        let mut c = StreamCursor::new(reader).with_patience(2, Duration::from_millis(1));
        let mut buf = [0u8; 16];
        assert_eq!(c.read(&mut buf).unwrap(), 5);
        assert_eq!(c.read(&mut buf).unwrap_err().kind(), ErrorKind::WouldBlock);
    }
}
