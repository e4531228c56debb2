pub const DEFAULT_STDOUT_LIMIT: usize = 1024 * 1024;

/// Characters available to `,`, consumed front to back.
#[derive(Debug, Clone, Default)]
pub struct StdinBuffer {
    data: Vec<char>,
    position: usize,
}

impl StdinBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            data: text.chars().collect(),
            position: 0,
        }
    }

    pub fn try_read(&mut self) -> Option<char> {
        let c = self.data.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    /// The full input this buffer was created with.
    pub fn text(&self) -> String {
        self.data.iter().collect()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

/// Output written by `.`, capped at a fixed number of characters.
#[derive(Debug, Clone)]
pub struct StdoutBuffer {
    text: String,
    len: usize,
    limit: usize,
}

impl StdoutBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            text: String::new(),
            len: 0,
            limit,
        }
    }

    /// Appends a cell value as a character; `false` once the buffer is full.
    pub fn try_write(&mut self, value: u16) -> bool {
        if self.len >= self.limit {
            return false;
        }
        let c = char::from_u32(value as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
        self.text.push(c);
        self.len += 1;
        true
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for StdoutBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_STDOUT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdin_reads_in_order_then_exhausts() {
        let mut stdin = StdinBuffer::new("ab");
        assert_eq!(stdin.try_read(), Some('a'));
        assert_eq!(stdin.remaining(), 1);
        assert_eq!(stdin.try_read(), Some('b'));
        assert_eq!(stdin.try_read(), None);
        assert_eq!(stdin.text(), "ab");
    }

    #[test]
    fn test_stdout_limit() {
        let mut stdout = StdoutBuffer::new(2);
        assert!(stdout.try_write(72));
        assert!(stdout.try_write(105));
        assert!(!stdout.try_write(33));
        assert_eq!(stdout.as_str(), "Hi");
    }

    #[test]
    fn test_stdout_surrogate_is_replaced() {
        let mut stdout = StdoutBuffer::new(4);
        assert!(stdout.try_write(0xD800));
        assert_eq!(stdout.as_str(), "\u{FFFD}");
    }
}
