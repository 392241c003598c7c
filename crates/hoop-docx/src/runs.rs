//! Run normalisation
//!
//! Word splits text into runs wherever formatting, spell-check or edit
//! history changes, so `{{clubName}}` can arrive as `{{`, `club`, `Name}}`
//! in three runs. Before rendering, every paragraph is rewritten so each
//! command sits alone in its own run:
//!
//! 1. [`merge_commands`] moves the text of a command spanning several
//!    `w:t` elements into the `w:t` where it starts.
//! 2. [`isolate_commands`] splits runs around commands, copying the run
//!    properties to every piece.

use crate::command::{command_spans, segments, Segment};
use crate::options::DocxRenderOptions;
use crate::xml::{Element, Node};

/// Normalise every paragraph under `nodes`
pub(crate) fn normalize(nodes: &mut [Node], options: &DocxRenderOptions) {
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            if el.is("w:p") {
                merge_commands(el, options);
                el.children = isolate_commands(std::mem::take(&mut el.children), options);
            }
            // nested paragraphs (text boxes) are handled on their own
            normalize(&mut el.children, options);
        }
    }
}

/// The command body when `node` is a run holding exactly one command
pub(crate) fn command_body<'a>(node: &'a Node, options: &DocxRenderOptions) -> Option<&'a str> {
    let run = node.as_element().filter(|el| el.is("w:r"))?;
    let mut texts = run.children.iter().filter_map(|child| match child {
        Node::Element(el) if el.is("w:rPr") => None,
        Node::Element(el) if el.is("w:t") => Some(Some(el)),
        _ => Some(None),
    });
    let t = texts.next()??;
    if texts.next().is_some() {
        return None;
    }
    let [Node::Text(text)] = t.children.as_slice() else {
        return None;
    };
    let body = text
        .strip_prefix(options.open_delimiter.as_str())?
        .strip_suffix(options.close_delimiter.as_str())?;
    if body.contains(options.open_delimiter.as_str()) {
        return None;
    }
    Some(body)
}

fn collect_texts(el: &Element, out: &mut Vec<String>) {
    for child in &el.children {
        if let Node::Element(child) = child {
            if child.is("w:t") {
                out.push(child.own_text());
            } else if !child.is("w:p") {
                collect_texts(child, out);
            }
        }
    }
}

fn merge_commands(paragraph: &mut Element, options: &DocxRenderOptions) {
    let mut texts = Vec::new();
    collect_texts(paragraph, &mut texts);
    if texts.len() < 2 {
        return;
    }

    let joined = texts.concat();
    let spans = command_spans(&joined, &options.open_delimiter, &options.close_delimiter);
    if spans.is_empty() {
        return;
    }

    // owner[b] = index of the w:t holding byte b
    let mut owner = Vec::with_capacity(joined.len());
    for (i, text) in texts.iter().enumerate() {
        owner.extend(std::iter::repeat(i).take(text.len()));
    }
    let mut moved = false;
    for &(start, end) in &spans {
        let first = owner[start];
        if owner[end - 1] != first {
            owner[start..end].fill(first);
            moved = true;
        }
    }
    if !moved {
        return;
    }

    let mut rebuilt = vec![String::new(); texts.len()];
    let mut from = 0;
    while from < joined.len() {
        let who = owner[from];
        let to = owner[from..]
            .iter()
            .position(|&o| o != who)
            .map_or(joined.len(), |n| from + n);
        rebuilt[who].push_str(&joined[from..to]);
        from = to;
    }

    let mut changed: Vec<Option<String>> = texts
        .into_iter()
        .zip(rebuilt)
        .map(|(old, new)| (old != new).then_some(new))
        .collect();
    let mut index = 0;
    assign_texts(paragraph, &mut changed, &mut index);
}

fn assign_texts(el: &mut Element, texts: &mut [Option<String>], index: &mut usize) {
    for child in el.children.iter_mut() {
        if let Node::Element(child) = child {
            if child.is("w:t") {
                if let Some(text) = texts.get_mut(*index).and_then(Option::take) {
                    child.children = if text.is_empty() {
                        Vec::new()
                    } else {
                        vec![Node::Text(text)]
                    };
                    child.set_attr("xml:space", "preserve");
                }
                *index += 1;
            } else if !child.is("w:p") {
                assign_texts(child, texts, index);
            }
        }
    }
}

fn isolate_commands(children: Vec<Node>, options: &DocxRenderOptions) -> Vec<Node> {
    let mut out = Vec::with_capacity(children.len());
    for node in children {
        match node {
            Node::Element(el) if el.is("w:r") => out.extend(split_run(el, options)),
            Node::Element(mut el) if !el.is("w:p") => {
                // hyperlinks, smart tags, tracked insertions
                el.children = isolate_commands(std::mem::take(&mut el.children), options);
                out.push(Node::Element(el));
            }
            other => out.push(other),
        }
    }
    out
}

fn split_run(run: Element, options: &DocxRenderOptions) -> Vec<Node> {
    let open = options.open_delimiter.as_str();
    let close = options.close_delimiter.as_str();
    let has_command = run.children.iter().any(|child| match child {
        Node::Element(t) if t.is("w:t") => !command_spans(&t.own_text(), open, close).is_empty(),
        _ => false,
    });
    if !has_command || command_body(&Node::Element(run.clone()), options).is_some() {
        return vec![Node::Element(run)];
    }

    let props = run.child("w:rPr").cloned();
    let mut pieces: Vec<Vec<Node>> = Vec::new();
    let mut current: Vec<Node> = Vec::new();

    for child in &run.children {
        match child {
            Node::Element(el) if el.is("w:rPr") => {}
            Node::Element(el) if el.is("w:t") => {
                let text = el.own_text();
                for segment in segments(&text, open, close) {
                    match segment {
                        Segment::Literal(literal) => {
                            current.push(Node::Element(Element::text_run_part(literal)));
                        }
                        Segment::Command(command) => {
                            if !current.is_empty() {
                                pieces.push(std::mem::take(&mut current));
                            }
                            pieces.push(vec![Node::Element(Element::text_run_part(command))]);
                        }
                    }
                }
            }
            other => current.push(other.clone()),
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
        .into_iter()
        .map(|piece| {
            let mut piece_run = Element {
                name: run.name.clone(),
                attrs: run.attrs.clone(),
                children: Vec::with_capacity(piece.len() + 1),
            };
            if let Some(props) = &props {
                piece_run.children.push(Node::Element(props.clone()));
            }
            piece_run.children.extend(piece);
            Node::Element(piece_run)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{parse, to_xml};
    use pretty_assertions::assert_eq;

    fn normalized(xml: &str) -> String {
        let mut nodes = parse(xml.as_bytes(), "test").unwrap();
        normalize(&mut nodes, &DocxRenderOptions::default());
        to_xml(&nodes)
    }

    #[test]
    fn test_merge_command_split_across_runs() {
        let xml = concat!(
            "<w:p>",
            "<w:r><w:rPr><w:b/></w:rPr><w:t>Club {{</w:t></w:r>",
            "<w:r><w:t>club</w:t></w:r>",
            "<w:r><w:t>Name}} rocks</w:t></w:r>",
            "</w:p>"
        );
        assert_eq!(
            normalized(xml),
            concat!(
                "<w:p>",
                "<w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">Club </w:t></w:r>",
                "<w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">{{clubName}}</w:t></w:r>",
                "<w:r><w:t xml:space=\"preserve\"/></w:r>",
                "<w:r><w:t xml:space=\"preserve\"> rocks</w:t></w:r>",
                "</w:p>"
            )
        );
    }

    #[test]
    fn test_lone_command_run_untouched() {
        let xml = "<w:p><w:r><w:t>{{clubName}}</w:t></w:r><w:r><w:t>x</w:t></w:r></w:p>";
        assert_eq!(normalized(xml), xml);
    }

    #[test]
    fn test_command_body() {
        let options = DocxRenderOptions::default();
        let nodes = parse(
            b"<w:r><w:rPr><w:i/></w:rPr><w:t>{{ INS clubName }}</w:t></w:r>",
            "test",
        )
        .unwrap();
        assert_eq!(command_body(&nodes[0], &options), Some(" INS clubName "));

        let nodes = parse(b"<w:r><w:t>a {{b}}</w:t></w:r>", "test").unwrap();
        assert_eq!(command_body(&nodes[0], &options), None);
    }
}
