/// Split a deck body (after front matter extraction) into raw slide strings.
///
/// Two mechanisms create slide breaks:
/// 1. `---` with blank lines on both sides
/// 2. Three or more consecutive blank lines (4+ newlines)
///
/// Separators inside fenced code blocks are left alone. Unlike plain markdown
/// decks, headings never start a slide: a slide holds several display panels,
/// each of which usually opens with its own heading.
pub fn split(body: &str) -> Vec<String> {
    let body = body.replace("\r\n", "\n");
    let lines: Vec<&str> = body.split('\n').collect();

    let mut slides: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut blank_run = 0;
    let mut fence: Option<(char, usize)> = None;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if let Some((fence_char, fence_len)) = fence {
            let closing = trimmed.chars().take_while(|&c| c == fence_char).count();
            if closing >= fence_len && trimmed.chars().skip(closing).all(char::is_whitespace) {
                fence = None;
            }
            current.push(line);
            blank_run = 0;
            i += 1;
            continue;
        }

        if let Some(opening) = fence_opening(trimmed) {
            fence = Some(opening);
            current.push(line);
            blank_run = 0;
            i += 1;
            continue;
        }

        // `---` with blank lines around it
        if is_dash_separator(trimmed) {
            let prev_blank = current.last().is_none_or(|l| l.trim().is_empty());
            let next_blank = lines.get(i + 1).is_none_or(|l| l.trim().is_empty());
            if prev_blank && next_blank {
                flush(&mut current, &mut slides);
                blank_run = 0;
                i += 1;
                continue;
            }
        }

        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run == 3 {
                flush(&mut current, &mut slides);
            }
        } else {
            blank_run = 0;
        }

        current.push(line);
        i += 1;
    }
    flush(&mut current, &mut slides);

    slides
}

fn flush(current: &mut Vec<&str>, slides: &mut Vec<String>) {
    let text = current.join("\n").trim().to_string();
    if !text.is_empty() {
        slides.push(text);
    }
    current.clear();
}

fn fence_opening(trimmed: &str) -> Option<(char, usize)> {
    if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
        let fence_char = trimmed.chars().next()?;
        let fence_len = trimmed.chars().take_while(|&c| c == fence_char).count();
        Some((fence_char, fence_len))
    } else {
        None
    }
}

fn is_dash_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line_split() {
        let body = "Slide one\n\n\n\nSlide two";
        let slides = split(body);
        assert_eq!(slides, vec!["Slide one", "Slide two"]);
    }

    #[test]
    fn test_two_blank_lines_do_not_split() {
        let body = "Slide one\n\n\nstill one";
        let slides = split(body);
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn test_dash_separator() {
        let body = "Slide one\n\n---\n\nSlide two";
        let slides = split(body);
        assert_eq!(slides, vec!["Slide one", "Slide two"]);
    }

    #[test]
    fn test_dash_without_blank_lines_is_content() {
        let body = "Title\n---\nmore";
        let slides = split(body);
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn test_combined_separators() {
        let body = "Slide one\n\n\n\n---\n\n\n\nSlide two";
        let slides = split(body);
        // Overlapping separators produce a single break
        assert_eq!(slides.len(), 2);
    }

    #[test]
    fn test_headings_do_not_split() {
        let body = "@display: main\n# Main\n\n@display: notes\n# Notes";
        let slides = split(body);
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn test_separator_in_code_block_no_split() {
        let body = "```yaml\nkey: 1\n\n---\n\nother: 2\n```";
        let slides = split(body);
        assert_eq!(slides.len(), 1, "Separator in code block should not split");
    }
}
