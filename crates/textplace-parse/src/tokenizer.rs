//! Lenient tokenizer for content streams and CMap programs.
//!
//! Turns raw bytes into a sequence of [`Operator`]s, each carrying the
//! operands that preceded it. Both content streams and embedded CMaps share
//! the same postfix syntax, so the CMap parser reuses this tokenizer.
//!
//! Malformed input never aborts tokenization: stray closing delimiters are
//! dropped, an unterminated string ends at end of input, an unterminated
//! array or dictionary ends at the next operator, and a number that does not
//! parse is discarded. Containers nested too deeply are discarded. The interpreter decides per
//! operator whether its operands are usable.

/// An operand value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Null,
    /// Name without the leading `/`, with `#XX` escapes decoded.
    Name(String),
    /// `( ... )` string, escapes resolved.
    LiteralString(Vec<u8>),
    /// `< ... >` string, hex digits decoded to bytes.
    HexString(Vec<u8>),
    Array(Vec<Operand>),
    Dictionary(Vec<(String, Operand)>),
}

impl Operand {
    /// Numeric value of an integer or real operand.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Integer(i) => Some(*i as f64),
            Operand::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Operand::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Operand::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Bytes of a literal or hex string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Operand::LiteralString(bytes) | Operand::HexString(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Operand]> {
        match self {
            Operand::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// An operator with the operands collected since the previous operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub name: String,
    pub operands: Vec<Operand>,
}

impl Operator {
    /// Numeric operand at `index`.
    pub fn number(&self, index: usize) -> Option<f64> {
        self.operands.get(index).and_then(Operand::as_f64)
    }

    /// All operands as numbers when there are exactly `N` of them.
    pub fn numbers<const N: usize>(&self) -> Option<[f64; N]> {
        if self.operands.len() != N {
            return None;
        }
        let mut values = [0.0; N];
        for (slot, operand) in values.iter_mut().zip(&self.operands) {
            *slot = operand.as_f64()?;
        }
        Some(values)
    }
}

/// Arrays and dictionaries nested deeper than this are dropped whole.
const MAX_NESTING: usize = 32;

/// Tokenize `input` into operators.
pub fn tokenize(input: &[u8]) -> Vec<Operator> {
    let mut lexer = Lexer { input, pos: 0 };
    let mut operators = Vec::new();
    let mut operands = OperandStack::default();

    while let Some(token) = lexer.next_token() {
        match token {
            Token::Keyword(word) if word == "BI" => {
                operands.clear();
                operators.push(lexer.inline_image());
            }
            // A keyword always ends the operand list, closing any array or
            // dictionary left open.
            Token::Keyword(word) => operators.push(Operator {
                name: word,
                operands: operands.take(),
            }),
            other => operands.push_token(other),
        }
    }
    operators
}

enum Container {
    Array(Vec<Operand>),
    Dictionary {
        entries: Vec<(String, Operand)>,
        key: Option<String>,
    },
}

impl Container {
    fn into_operand(self) -> Operand {
        match self {
            Container::Array(items) => Operand::Array(items),
            Container::Dictionary { entries, .. } => Operand::Dictionary(entries),
        }
    }
}

/// Operands collected since the last keyword, with the arrays and
/// dictionaries still open around them.
#[derive(Default)]
struct OperandStack {
    operands: Vec<Operand>,
    open: Vec<Container>,
    /// Containers opened past [`MAX_NESTING`] whose contents are discarded.
    skipped: usize,
}

impl OperandStack {
    fn push_token(&mut self, token: Token) {
        match token {
            Token::Operand(operand) => {
                if self.skipped == 0 {
                    self.push_value(operand);
                }
            }
            Token::ArrayStart | Token::DictStart
                if self.skipped > 0 || self.open.len() >= MAX_NESTING =>
            {
                self.skipped += 1;
            }
            Token::ArrayStart => self.open.push(Container::Array(Vec::new())),
            Token::DictStart => self.open.push(Container::Dictionary {
                entries: Vec::new(),
                key: None,
            }),
            Token::ArrayEnd | Token::DictEnd if self.skipped > 0 => self.skipped -= 1,
            Token::ArrayEnd => {
                if matches!(self.open.last(), Some(Container::Array(_))) {
                    self.close();
                }
            }
            Token::DictEnd => {
                if matches!(self.open.last(), Some(Container::Dictionary { .. })) {
                    self.close();
                }
            }
            Token::Keyword(_) => {}
        }
    }

    fn push_value(&mut self, value: Operand) {
        match self.open.last_mut() {
            Some(Container::Array(items)) => items.push(value),
            Some(Container::Dictionary { entries, key }) => match key.take() {
                Some(k) => entries.push((k, value)),
                None => {
                    if let Operand::Name(name) = value {
                        *key = Some(name);
                    }
                }
            },
            None => self.operands.push(value),
        }
    }

    fn close(&mut self) {
        if let Some(container) = self.open.pop() {
            self.push_value(container.into_operand());
        }
    }

    /// Close every open container and hand back the operands.
    fn take(&mut self) -> Vec<Operand> {
        while !self.open.is_empty() {
            self.close();
        }
        self.skipped = 0;
        std::mem::take(&mut self.operands)
    }

    fn clear(&mut self) {
        self.operands.clear();
        self.open.clear();
        self.skipped = 0;
    }
}

#[derive(Debug)]
enum Token {
    Operand(Operand),
    Keyword(String),
    ArrayStart,
    ArrayEnd,
    DictStart,
    DictEnd,
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'\0')
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while let Some(c) = self.peek() {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            self.skip_whitespace_and_comments();
            let b = self.peek()?;
            let token = match b {
                b'(' => Token::Operand(Operand::LiteralString(self.literal_string())),
                b'<' if self.peek_at(1) == Some(b'<') => {
                    self.pos += 2;
                    Token::DictStart
                }
                b'<' => Token::Operand(Operand::HexString(self.hex_string())),
                b'>' if self.peek_at(1) == Some(b'>') => {
                    self.pos += 2;
                    Token::DictEnd
                }
                b'[' => {
                    self.pos += 1;
                    Token::ArrayStart
                }
                b']' => {
                    self.pos += 1;
                    Token::ArrayEnd
                }
                b'/' => Token::Operand(Operand::Name(self.name())),
                b'0'..=b'9' | b'+' | b'-' | b'.' => match self.number() {
                    Some(number) => Token::Operand(number),
                    None => continue,
                },
                b')' | b'>' | b'{' | b'}' => {
                    // stray delimiter
                    self.pos += 1;
                    continue;
                }
                _ => {
                    let word = self.regular_run();
                    match word.as_str() {
                        "true" => Token::Operand(Operand::Boolean(true)),
                        "false" => Token::Operand(Operand::Boolean(false)),
                        "null" => Token::Operand(Operand::Null),
                        _ => Token::Keyword(word),
                    }
                }
            };
            return Some(token);
        }
    }

    fn regular_run(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        if self.pos == start {
            // a lone delimiter byte we do not otherwise handle
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn name(&mut self) -> String {
        self.pos += 1;
        let mut bytes = Vec::new();
        while let Some(b) = self.peek() {
            if !is_regular(b) {
                break;
            }
            if b == b'#' {
                if let (Some(hi), Some(lo)) = (
                    self.peek_at(1).and_then(hex_value),
                    self.peek_at(2).and_then(hex_value),
                ) {
                    bytes.push(hi << 4 | lo);
                    self.pos += 3;
                    continue;
                }
            }
            bytes.push(b);
            self.pos += 1;
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn number(&mut self) -> Option<Operand> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.'))
        {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.input[start..self.pos]).ok()?;
        if !text.contains('.') {
            if let Ok(value) = text.parse::<i64>() {
                return Some(Operand::Integer(value));
            }
        }
        // Some producers emit "--5" or "5-"; keep the leading sign and digits.
        let cleaned = clean_number(text);
        cleaned.parse::<f64>().ok().map(Operand::Real)
    }

    fn literal_string(&mut self) -> Vec<u8> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut depth = 1usize;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    out.push(b);
                }
                b'\\' => self.escape(&mut out),
                b'\r' => {
                    if self.peek() == Some(b'\n') {
                        self.pos += 1;
                    }
                    out.push(b'\n');
                }
                _ => out.push(b),
            }
        }
        out
    }

    fn escape(&mut self, out: &mut Vec<u8>) {
        let Some(b) = self.peek() else {
            return;
        };
        self.pos += 1;
        match b {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'0'..=b'7' => {
                let mut value = u32::from(b - b'0');
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                out.push((value & 0xFF) as u8);
            }
            b'\r' => {
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            other => out.push(other),
        }
    }

    fn hex_string(&mut self) -> Vec<u8> {
        self.pos += 1;
        let mut digits = Vec::new();
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'>' {
                break;
            }
            if let Some(v) = hex_value(b) {
                digits.push(v);
            }
        }
        if digits.len() % 2 == 1 {
            digits.push(0);
        }
        digits.chunks(2).map(|pair| pair[0] << 4 | pair[1]).collect()
    }

    /// Skip an inline image (`BI <dict> ID <data> EI`), returning a `BI` operator
    /// whose single operand is the image dictionary.
    fn inline_image(&mut self) -> Operator {
        let mut dict = OperandStack::default();
        dict.push_token(Token::DictStart);
        while let Some(token) = self.next_token() {
            match token {
                Token::Keyword(word) if word == "ID" => break,
                Token::Keyword(_) => continue,
                other => dict.push_token(other),
            }
        }
        // one whitespace byte separates ID from the data
        if self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
        while self.pos < self.input.len() {
            let at_ei = self.input[self.pos..].starts_with(b"EI")
                && (self.pos == 0 || is_whitespace(self.input[self.pos - 1]))
                && self.peek_at(2).is_none_or(|b| is_whitespace(b) || is_delimiter(b));
            if at_ei {
                self.pos += 2;
                break;
            }
            self.pos += 1;
        }
        Operator {
            name: "BI".to_string(),
            operands: dict.take(),
        }
    }
}

fn clean_number(text: &str) -> String {
    let negative = text.starts_with('-');
    let body: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut seen_dot = false;
    let body: String = body
        .chars()
        .filter(|c| {
            if *c == '.' {
                if seen_dot {
                    return false;
                }
                seen_dot = true;
            }
            true
        })
        .collect();
    if negative { format!("-{body}") } else { body }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(input: &[u8]) -> Operator {
        let ops = tokenize(input);
        assert_eq!(ops.len(), 1, "expected one operator, got {ops:?}");
        ops.into_iter().next().unwrap()
    }

    #[test]
    fn numbers_integer_and_real() {
        let op = single(b"42 -7 3.5 .5 -.25 +3 Td");
        assert_eq!(
            op.operands,
            vec![
                Operand::Integer(42),
                Operand::Integer(-7),
                Operand::Real(3.5),
                Operand::Real(0.5),
                Operand::Real(-0.25),
                Operand::Integer(3),
            ]
        );
    }

    #[test]
    fn malformed_number_is_cleaned() {
        let op = single(b"--5 0 Td");
        assert_eq!(op.operands, vec![Operand::Real(-5.0), Operand::Integer(0)]);
    }

    #[test]
    fn names_with_hex_escapes() {
        let op = single(b"/F1 /A#20B Tf");
        assert_eq!(op.operands[0], Operand::Name("F1".to_string()));
        assert_eq!(op.operands[1], Operand::Name("A B".to_string()));
    }

    #[test]
    fn literal_string_escapes_and_nesting() {
        let op = single(b"(a\\(b\\)c \\n\\101 (nested)) Tj");
        assert_eq!(
            op.operands,
            vec![Operand::LiteralString(b"a(b)c \nA (nested)".to_vec())]
        );
    }

    #[test]
    fn literal_string_line_continuation() {
        let op = single(b"(ab\\\ncd) Tj");
        assert_eq!(op.operands, vec![Operand::LiteralString(b"abcd".to_vec())]);
    }

    #[test]
    fn hex_string_odd_digits_and_whitespace() {
        let op = single(b"<48 69 7> Tj");
        assert_eq!(op.operands, vec![Operand::HexString(vec![0x48, 0x69, 0x70])]);
    }

    #[test]
    fn tj_array_with_adjustments() {
        let op = single(b"[(A) -120 (B) 0.5 <43>] TJ");
        assert_eq!(op.name, "TJ");
        let items = op.operands[0].as_array().unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[1].as_f64(), Some(-120.0));
        assert_eq!(items[4].as_bytes(), Some(&[0x43][..]));
    }

    #[test]
    fn dictionary_operand() {
        let op = single(b"/Span << /ActualText (x) /MCID 3 >> BDC");
        assert_eq!(
            op.operands[1],
            Operand::Dictionary(vec![
                ("ActualText".to_string(), Operand::LiteralString(b"x".to_vec())),
                ("MCID".to_string(), Operand::Integer(3)),
            ])
        );
    }

    #[test]
    fn keywords_and_literals() {
        let ops = tokenize(b"q true false null d0 Q");
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0].name, "q");
        assert_eq!(
            ops[1].operands,
            vec![Operand::Boolean(true), Operand::Boolean(false), Operand::Null]
        );
        assert_eq!(ops[1].name, "d0");
        assert_eq!(ops[2].name, "Q");
    }

    #[test]
    fn comments_are_skipped() {
        let ops = tokenize(b"BT % begin text\n/F1 12 Tf %size\nET");
        let names: Vec<&str> = ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["BT", "Tf", "ET"]);
    }

    #[test]
    fn typical_text_object() {
        let ops = tokenize(b"BT /F1 12 Tf 100 700 Td (Hi) Tj ET");
        let names: Vec<&str> = ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["BT", "Tf", "Td", "Tj", "ET"]);
        assert_eq!(ops[2].numbers::<2>(), Some([100.0, 700.0]));
    }

    #[test]
    fn quote_operators() {
        let ops = tokenize(b"(a) ' 1 2 (b) \"");
        assert_eq!(ops[0].name, "'");
        assert_eq!(ops[1].name, "\"");
        assert_eq!(ops[1].operands.len(), 3);
    }

    #[test]
    fn inline_image_is_skipped() {
        let ops = tokenize(b"q BI /W 2 /H 1 /BPC 8 ID \x00EI\xff EI Q BT ET");
        let names: Vec<&str> = ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["q", "BI", "Q", "BT", "ET"]);
        assert_eq!(
            ops[1].operands[0],
            Operand::Dictionary(vec![
                ("W".to_string(), Operand::Integer(2)),
                ("H".to_string(), Operand::Integer(1)),
                ("BPC".to_string(), Operand::Integer(8)),
            ])
        );
    }

    #[test]
    fn unterminated_constructs_end_at_input_end() {
        let ops = tokenize(b"(never closed Tj");
        assert!(ops.is_empty());
        let ops = tokenize(b"[(a) 1 ");
        assert!(ops.is_empty());
    }

    #[test]
    fn unterminated_array_ends_at_next_operator() {
        let ops = tokenize(b"BT /F1 12 Tf [(a) TJ (b) Tj ET BT (c) Tj ET");
        let names: Vec<&str> = ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["BT", "Tf", "TJ", "Tj", "ET", "BT", "Tj", "ET"]);
        assert_eq!(
            ops[2].operands,
            vec![Operand::Array(vec![Operand::LiteralString(b"a".to_vec())])]
        );
        assert_eq!(ops[6].operands, vec![Operand::LiteralString(b"c".to_vec())]);
    }

    #[test]
    fn unterminated_dictionary_ends_at_next_operator() {
        let ops = tokenize(b"/Span << /MCID 3 BDC (x) Tj");
        assert_eq!(ops[0].name, "BDC");
        assert_eq!(
            ops[0].operands[1],
            Operand::Dictionary(vec![("MCID".to_string(), Operand::Integer(3))])
        );
        assert_eq!(ops[1].operands, vec![Operand::LiteralString(b"x".to_vec())]);
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let mut input = b"BT /F1 12 Tf (ok) Tj ET ".to_vec();
        input.extend(std::iter::repeat_n(b'[', 2_000_000));
        input.extend_from_slice(b" TJ (after) Tj");
        let ops = tokenize(&input);
        let names: Vec<&str> = ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["BT", "Tf", "Tj", "ET", "TJ", "Tj"]);
        assert_eq!(ops[5].operands, vec![Operand::LiteralString(b"after".to_vec())]);
    }

    #[test]
    fn nesting_past_the_limit_is_dropped() {
        let depth = MAX_NESTING + 3;
        let mut input = "[".repeat(depth);
        input.push_str("1");
        input.push_str(&"]".repeat(depth));
        input.push_str(" 2 X");
        let op = single(input.as_bytes());

        let mut level = &op.operands[0];
        let mut arrays = 0;
        while let Operand::Array(items) = level {
            arrays += 1;
            match items.first() {
                Some(inner) => level = inner,
                None => break,
            }
        }
        assert_eq!(arrays, MAX_NESTING);
        assert_eq!(op.operands[1], Operand::Integer(2));
    }

    #[test]
    fn stray_delimiters_are_dropped() {
        let ops = tokenize(b") ] >> 1 0 0 1 0 0 cm");
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].numbers::<6>(), Some([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]));
    }

    #[test]
    fn numbers_helper_checks_arity_and_types() {
        let op = single(b"1 /X Td");
        assert_eq!(op.numbers::<2>(), None);
        assert_eq!(op.number(0), Some(1.0));
        let op = single(b"1 Td");
        assert_eq!(op.numbers::<2>(), None);
    }

    #[test]
    fn empty_input() {
        assert!(tokenize(b"").is_empty());
        assert!(tokenize(b"  \n\t ").is_empty());
    }
}
