/// Flattens an HTML body to plain text for quoting.
///
/// Line breaks and the ends of paragraphs, divs, list items and headings
/// become newlines; every other tag is dropped. Runs of blank lines collapse
/// to a single blank line and the result is trimmed.
pub fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        let Some(len) = rest[open..].find('>') else {
            break;
        };
        text.push_str(&rest[..open]);
        text.push_str(tag_break(&rest[open + 1..open + len]));
        rest = &rest[open + len + 1..];
    }
    text.push_str(rest);

    let decoded = html_escape::decode_html_entities(&text);
    collapse_blank_lines(&decoded)
}

fn tag_break(tag: &str) -> &'static str {
    let tag = tag.trim();
    let (closing, tag) = match tag.strip_prefix('/') {
        Some(name) => (true, name.trim_start()),
        None => (false, tag),
    };
    let name = tag
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    match (closing, name.as_str()) {
        (false, "br") => "\n",
        (true, "p") => "\n\n",
        (true, "div" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6") => "\n",
        _ => "",
    }
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank = false;

    for line in text.lines() {
        if line.trim().is_empty() {
            blank = true;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank {
                out.push('\n');
            }
        }
        blank = false;
        out.push_str(line);
    }

    out.trim().to_string()
}
