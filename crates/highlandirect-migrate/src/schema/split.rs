//! Statement splitting for SQL scripts.
//!
//! `;` only terminates a statement outside string literals, quoted
//! identifiers and comments, and outside the `BEGIN ... END` body of a
//! `CREATE TRIGGER`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    SingleQuote,
    DoubleQuote,
    Backtick,
    Bracket,
    LineComment,
    BlockComment,
}

/// Tracks the leading keywords of the current statement and trigger body
/// nesting.
#[derive(Default)]
struct Header {
    words: Vec<String>,
    depth: usize,
}

impl Header {
    fn is_trigger(&self) -> bool {
        let w: Vec<&str> = self.words.iter().map(String::as_str).collect();
        matches!(
            w.as_slice(),
            ["CREATE", "TRIGGER", ..] | ["CREATE", "TEMP" | "TEMPORARY", "TRIGGER", ..]
        )
    }

    fn push_word(&mut self, word: &str) {
        let upper = word.to_ascii_uppercase();
        if self.words.len() < 3 {
            self.words.push(upper.clone());
        }
        if self.is_trigger() {
            match upper.as_str() {
                "BEGIN" | "CASE" => self.depth += 1,
                "END" => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split `script` into trimmed statements without their terminators.
/// Chunks holding only whitespace or comments are dropped.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut word = String::new();
    let mut header = Header::default();
    let mut has_code = false;
    let mut state = State::Normal;
    let mut chars = script.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Normal => {
                if is_word_char(c) {
                    word.push(c);
                    current.push(c);
                    has_code = true;
                    continue;
                }
                if !word.is_empty() {
                    header.push_word(&word);
                    word.clear();
                }

                match c {
                    ';' if header.depth == 0 => {
                        if has_code {
                            statements.push(current.trim().to_string());
                        }
                        current.clear();
                        header = Header::default();
                        has_code = false;
                        continue;
                    }
                    '-' if chars.peek() == Some(&'-') => {
                        state = State::LineComment;
                        current.push(c);
                        if let Some(next) = chars.next() {
                            current.push(next);
                        }
                        continue;
                    }
                    '/' if chars.peek() == Some(&'*') => {
                        state = State::BlockComment;
                        current.push(c);
                        if let Some(next) = chars.next() {
                            current.push(next);
                        }
                        continue;
                    }
                    '\'' => state = State::SingleQuote,
                    '"' => state = State::DoubleQuote,
                    '`' => state = State::Backtick,
                    '[' => state = State::Bracket,
                    _ => {}
                }

                if !c.is_whitespace() {
                    has_code = true;
                }
                current.push(c);
            }
            State::SingleQuote | State::DoubleQuote | State::Backtick | State::Bracket => {
                current.push(c);
                let closing = match state {
                    State::SingleQuote => '\'',
                    State::DoubleQuote => '"',
                    State::Backtick => '`',
                    _ => ']',
                };
                // A doubled quote re-enters the literal on the next char
                if c == closing {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                current.push(c);
                if c == '\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                current.push(c);
                if c == '*' && chars.peek() == Some(&'/') {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                    state = State::Normal;
                }
            }
        }
    }

    if has_code {
        let rest = current.trim();
        if !rest.is_empty() {
            statements.push(rest.to_string());
        }
    }

    statements
}
