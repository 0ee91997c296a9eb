/// Tidy whitespace left behind by edits.
///
/// Trailing whitespace is trimmed, runs of blank lines collapse to one, blank lines directly
/// inside an opening or before a closing bracket are dropped, and the document ends with
/// exactly one line ending. Lines are otherwise kept as they are.
pub(crate) fn normalize_whitespace(text: &str, eol: &str) -> String {
    let lines: Vec<&str> = text.split('\n').map(|line| line.trim_end()).collect();

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        if !line.is_empty() {
            kept.push(line);
            continue;
        }
        let previous = kept.last().copied();
        let next = lines[index + 1..].iter().find(|l| !l.is_empty()).copied();
        let after_blank_or_start = previous.is_none_or(|p| p.is_empty());
        let after_open = previous.is_some_and(|p| p.ends_with('{') || p.ends_with('['));
        let before_close = next.is_none_or(|n| {
            let n = n.trim_start();
            n.starts_with('}') || n.starts_with(']')
        });
        if !(after_blank_or_start || after_open || before_close) {
            kept.push(line);
        }
    }

    let mut output = kept.join(eol);
    output.push_str(eol);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_terminates() {
        assert_eq!(normalize_whitespace("{}  ", "\n"), "{}\n");
        assert_eq!(normalize_whitespace("{}\n\n\n", "\n"), "{}\n");
    }

    #[test]
    fn test_drops_blank_lines_inside_brackets() {
        let text = "{\n  \"foo\": \"bar\"\n\n  \n}";
        assert_eq!(normalize_whitespace(text, "\n"), "{\n  \"foo\": \"bar\"\n}\n");
        let text = "{\n\n  \"a\": [\n\n    1\n  ]\n}\n";
        assert_eq!(
            normalize_whitespace(text, "\n"),
            "{\n  \"a\": [\n    1\n  ]\n}\n"
        );
    }

    #[test]
    fn test_keeps_single_separating_blank_line() {
        let text = "{\n  \"a\": 1,\n\n\n  // section two\n  \"b\": 2\n}\n";
        assert_eq!(
            normalize_whitespace(text, "\n"),
            "{\n  \"a\": 1,\n\n  // section two\n  \"b\": 2\n}\n"
        );
    }

    #[test]
    fn test_crlf() {
        let text = "{\r\n  \"a\": 1   \r\n\r\n}\r\n";
        assert_eq!(normalize_whitespace(text, "\r\n"), "{\r\n  \"a\": 1\r\n}\r\n");
    }
}
