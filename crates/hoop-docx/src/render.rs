//! Command evaluation over a normalised part
//!
//! A loop repeats the nodes between its markers at their deepest common
//! ancestor: markers in sibling paragraphs repeat those paragraphs,
//! markers in the same paragraph repeat runs, markers in different rows
//! repeat rows. Markers in different cells of one row repeat that row.

use serde_json::Value;

use crate::command::Command;
use crate::error::{DocxError, DocxResult};
use crate::options::DocxRenderOptions;
use crate::runs::command_body;
use crate::xml::{Element, Node};

/// Elements that make a paragraph or row worth keeping without text
const CONTENT_ELEMENTS: &[&str] = &["w:drawing", "w:pict", "w:object", "w:sym", "w:sectPr"];

#[derive(Debug, Clone)]
struct LoopHead {
    var: String,
    source: String,
}

/// Loop variables visible at a point of the document, innermost last
#[derive(Debug, Clone, Default)]
struct Scope<'a> {
    bindings: Vec<(String, &'a Value)>,
}

impl<'a> Scope<'a> {
    fn lookup(&self, name: &str) -> Option<&'a Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| *value)
    }

    fn bind(&self, name: &str, value: &'a Value) -> Scope<'a> {
        let mut inner = self.clone();
        inner.bindings.push((name.to_string(), value));
        inner
    }
}

pub(crate) struct Renderer<'a> {
    data: &'a Value,
    options: &'a DocxRenderOptions,
}

impl<'a> Renderer<'a> {
    pub fn new(data: &'a Value, options: &'a DocxRenderOptions) -> Self {
        Self { data, options }
    }

    pub fn render(&self, nodes: &[Node]) -> DocxResult<Vec<Node>> {
        self.render_nodes(nodes, &Scope::default())
    }

    fn render_nodes(&self, nodes: &[Node], scope: &Scope<'a>) -> DocxResult<Vec<Node>> {
        let mut out = Vec::with_capacity(nodes.len());
        let mut index = 0;
        while index < nodes.len() {
            let open = self.open_loops(&nodes[index])?;
            if let Some(head) = open.first().cloned() {
                let end = self.loop_end(nodes, index, open)?;
                out.extend(self.expand_loop(&nodes[index..=end], &head, scope)?);
                index = end + 1;
                continue;
            }
            if let Some(head) = self.row_loop(&nodes[index])? {
                out.extend(self.expand_loop(&nodes[index..=index], &head, scope)?);
                index += 1;
                continue;
            }
            out.push(self.render_node(&nodes[index], scope)?);
            index += 1;
        }
        Ok(out)
    }

    fn render_node(&self, node: &Node, scope: &Scope<'a>) -> DocxResult<Node> {
        if let (Some(body), Node::Element(run)) = (command_body(node, self.options), node) {
            return match Command::parse(body)? {
                Command::Insert(expr) => {
                    let value = self.resolve(&expr, scope)?;
                    Ok(Node::Element(self.insert(run, value)))
                }
                Command::For { var, .. } => Err(DocxError::UnterminatedLoop(var)),
                Command::EndFor(var) => Err(DocxError::UnmatchedEndFor(var)),
            };
        }
        match node {
            Node::Element(el) => Ok(Node::Element(Element {
                name: el.name.clone(),
                attrs: el.attrs.clone(),
                children: self.render_nodes(&el.children, scope)?,
            })),
            other => Ok(other.clone()),
        }
    }

    fn commands(&self, node: &Node, out: &mut Vec<Command>) -> DocxResult<()> {
        if let Some(body) = command_body(node, self.options) {
            out.push(Command::parse(body)?);
        } else if let Node::Element(el) = node {
            for child in &el.children {
                self.commands(child, out)?;
            }
        }
        Ok(())
    }

    /// Feed the loop markers of `node` through `stack`
    fn track_loops(&self, node: &Node, stack: &mut Vec<LoopHead>) -> DocxResult<()> {
        let mut commands = Vec::new();
        self.commands(node, &mut commands)?;
        for command in commands {
            match command {
                Command::For { var, source } => stack.push(LoopHead { var, source }),
                Command::EndFor(var) => match stack.last() {
                    Some(head) if head.var == var => {
                        stack.pop();
                    }
                    _ => return Err(DocxError::UnmatchedEndFor(var)),
                },
                Command::Insert(_) => {}
            }
        }
        Ok(())
    }

    /// Loops opened inside `node` and not closed there, outermost first
    fn open_loops(&self, node: &Node) -> DocxResult<Vec<LoopHead>> {
        let mut stack = Vec::new();
        self.track_loops(node, &mut stack)?;
        Ok(stack)
    }

    /// Index of the sibling that closes the outermost loop in `stack`
    fn loop_end(&self, nodes: &[Node], start: usize, stack: Vec<LoopHead>) -> DocxResult<usize> {
        let outer = stack[0].var.clone();
        let mut stack = stack;
        for (offset, node) in nodes[start + 1..].iter().enumerate() {
            let mut commands = Vec::new();
            self.commands(node, &mut commands)?;
            for command in commands {
                match command {
                    Command::For { var, source } => stack.push(LoopHead { var, source }),
                    Command::EndFor(var) => {
                        match stack.last() {
                            Some(head) if head.var == var => {
                                stack.pop();
                            }
                            _ => return Err(DocxError::UnmatchedEndFor(var)),
                        }
                        if stack.is_empty() {
                            return Ok(start + 1 + offset);
                        }
                    }
                    Command::Insert(_) => {}
                }
            }
        }
        Err(DocxError::UnterminatedLoop(outer))
    }

    /// A loop whose markers sit in different cells of table row `node`
    fn row_loop(&self, node: &Node) -> DocxResult<Option<LoopHead>> {
        let Some(row) = node.as_element().filter(|el| el.is("w:tr")) else {
            return Ok(None);
        };
        for cell in &row.children {
            if let Some(head) = self.open_loops(cell)?.into_iter().next() {
                return Ok(Some(head));
            }
        }
        Ok(None)
    }

    fn expand_loop(&self, unit: &[Node], head: &LoopHead, scope: &Scope<'a>) -> DocxResult<Vec<Node>> {
        let items = match self.resolve(&head.source, scope)? {
            Value::Array(items) => items,
            _ => return Err(DocxError::NotAList(head.source.clone())),
        };
        let body = self.strip_markers(unit, &head.var)?;
        log::trace!("FOR {} IN {}: {} items", head.var, head.source, items.len());

        let mut out = Vec::with_capacity(body.len() * items.len());
        for item in items {
            out.extend(self.render_nodes(&body, &scope.bind(&head.var, item))?);
        }
        Ok(out)
    }

    /// Copy `unit` without the FOR/END-FOR pair of `var` that bounds it
    fn strip_markers(&self, unit: &[Node], var: &str) -> DocxResult<Vec<Node>> {
        let mut commands = Vec::new();
        for node in unit {
            self.commands(node, &mut commands)?;
        }
        let open = commands
            .iter()
            .position(|c| matches!(c, Command::For { var: v, .. } if v == var));
        let close = commands
            .iter()
            .rposition(|c| matches!(c, Command::EndFor(v) if v == var));
        let targets = [open, close];

        let mut ordinal = 0;
        Ok(unit
            .iter()
            .filter_map(|node| self.strip_node(node, &targets, &mut ordinal).0)
            .collect())
    }

    /// Returns the kept node (if any) and whether a marker was removed inside it
    fn strip_node(
        &self,
        node: &Node,
        targets: &[Option<usize>; 2],
        ordinal: &mut usize,
    ) -> (Option<Node>, bool) {
        if command_body(node, self.options).is_some() {
            let current = *ordinal;
            *ordinal += 1;
            if targets.contains(&Some(current)) {
                return (None, true);
            }
            return (Some(node.clone()), false);
        }
        let Node::Element(el) = node else {
            return (Some(node.clone()), false);
        };

        let mut removed = false;
        let mut children = Vec::with_capacity(el.children.len());
        for child in &el.children {
            let (kept, hit) = self.strip_node(child, targets, ordinal);
            removed |= hit;
            children.extend(kept);
        }
        let mut stripped = Element {
            name: el.name.clone(),
            attrs: el.attrs.clone(),
            children,
        };

        if removed {
            if (stripped.is("w:p") || stripped.is("w:tr")) && is_blank(&stripped) {
                return (None, true);
            }
            // a cell must end with a paragraph
            if stripped.is("w:tc") && stripped.child("w:p").is_none() {
                stripped.children.push(Node::Element(Element::new("w:p")));
            }
        }
        (Some(Node::Element(stripped)), removed)
    }

    fn resolve(&self, expr: &str, scope: &Scope<'a>) -> DocxResult<&'a Value> {
        let unknown = || DocxError::UnknownField(expr.to_string());
        let path = expr.strip_prefix('$').unwrap_or(expr);
        let mut parts = path.split('.');
        let first = parts.next().unwrap_or_default();

        let mut current = scope
            .lookup(first)
            .or_else(|| self.data.get(first))
            .ok_or_else(unknown)?;
        for part in parts {
            current = match part.parse::<usize>() {
                Ok(index) => current.get(index),
                Err(_) => current.get(part),
            }
            .ok_or_else(unknown)?;
        }
        Ok(current)
    }

    fn insert(&self, run: &Element, value: &Value) -> Element {
        let text = display(value);
        let mut out = Element {
            name: run.name.clone(),
            attrs: run.attrs.clone(),
            children: Vec::new(),
        };
        if let Some(props) = run.child("w:rPr") {
            out.children.push(Node::Element(props.clone()));
        }

        if self.options.line_breaks && text.contains('\n') {
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    out.children.push(Node::Element(Element::new("w:br")));
                }
                out.children.push(Node::Element(Element::text_run_part(
                    line.trim_end_matches('\r'),
                )));
            }
        } else {
            out.children
                .push(Node::Element(Element::text_run_part(&text)));
        }
        out
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// No visible text and nothing drawn
fn is_blank(el: &Element) -> bool {
    el.children.iter().all(|child| match child {
        Node::Text(text) => text.trim().is_empty(),
        Node::Raw(_) => true,
        Node::Element(inner) => !CONTENT_ELEMENTS.contains(&inner.name.as_str()) && is_blank(inner),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runs::normalize;
    use crate::xml::{parse, to_xml};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(xml: &str, data: &Value) -> DocxResult<String> {
        let options = DocxRenderOptions::default();
        let mut nodes = parse(xml.as_bytes(), "test")?;
        normalize(&mut nodes, &options);
        let rendered = Renderer::new(data, &options).render(&nodes)?;
        Ok(to_xml(&rendered))
    }

    fn p(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }

    fn out_p(text: &str) -> String {
        format!("<w:p><w:r><w:t xml:space=\"preserve\">{text}</w:t></w:r></w:p>")
    }

    #[test]
    fn test_insert_keeps_run_properties() {
        let xml = "<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>{{clubName}}</w:t></w:r></w:p>";
        let out = render(xml, &json!({"clubName": "Hoop & Co"})).unwrap();
        assert_eq!(
            out,
            "<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">Hoop &amp; Co</w:t></w:r></w:p>"
        );
    }

    #[test]
    fn test_paragraph_loop_drops_marker_paragraphs() {
        let xml = format!(
            "<w:body>{}{}{}</w:body>",
            p("{{FOR p IN players}}"),
            p("{{$p.name}}"),
            p("{{END-FOR p}}")
        );
        let data = json!({"players": [{"name": "Ana"}, {"name": "Bo"}]});
        assert_eq!(
            render(&xml, &data).unwrap(),
            format!("<w:body>{}{}</w:body>", out_p("Ana"), out_p("Bo"))
        );
    }

    #[test]
    fn test_empty_list_removes_block() {
        let xml = format!(
            "<w:body>{}{}{}{}</w:body>",
            p("{{FOR p IN players}}"),
            p("{{$p.name}}"),
            p("{{END-FOR p}}"),
            p("after")
        );
        assert_eq!(
            render(&xml, &json!({"players": []})).unwrap(),
            format!("<w:body>{}</w:body>", p("after"))
        );
    }

    #[test]
    fn test_row_loop_across_cells() {
        let xml = concat!(
            "<w:tbl><w:tr>",
            "<w:tc><w:p><w:r><w:t>{{FOR p IN players}}{{$p.name}}</w:t></w:r></w:p></w:tc>",
            "<w:tc><w:p><w:r><w:t>{{$p.category}}{{END-FOR p}}</w:t></w:r></w:p></w:tc>",
            "</w:tr></w:tbl>"
        );
        let data = json!({"players": [
            {"name": "Ana", "category": "U11"},
            {"name": "Bo", "category": "U13"}
        ]});
        let out = render(xml, &data).unwrap();
        assert_eq!(out.matches("<w:tr>").count(), 2);
        assert!(out.contains(">Ana<") && out.contains(">U13<"));
        assert!(!out.contains("FOR"));
    }

    #[test]
    fn test_nested_loops_and_inline_loop() {
        let xml = format!(
            "<w:body>{}<w:p><w:r><w:t>{{{{FOR t IN $c.teams}}}}{{{{$t}}}} {{{{END-FOR t}}}}</w:t></w:r></w:p>{}</w:body>",
            p("{{FOR c IN categories}}"),
            p("{{END-FOR c}}")
        );
        let data = json!({"categories": [{"teams": ["A", "B"]}, {"teams": ["C"]}]});
        let out = render(&xml, &data).unwrap();
        assert_eq!(out.matches("<w:p>").count(), 2);
        let text: String = out
            .split("preserve\">")
            .skip(1)
            .map(|s| s.split('<').next().unwrap_or_default())
            .collect();
        assert_eq!(text, "A B C ");
    }

    #[test]
    fn test_line_breaks() {
        let out = render(&p("{{address}}"), &json!({"address": "1 Main St\n75000 Paris"})).unwrap();
        assert_eq!(
            out,
            "<w:p><w:r><w:t xml:space=\"preserve\">1 Main St</w:t><w:br/><w:t xml:space=\"preserve\">75000 Paris</w:t></w:r></w:p>"
        );
    }

    #[test]
    fn test_errors() {
        let data = json!({"players": "nope"});
        assert!(matches!(
            render(&p("{{missing}}"), &data),
            Err(DocxError::UnknownField(f)) if f == "missing"
        ));
        assert!(matches!(
            render(&format!("<w:body>{}</w:body>", p("{{FOR p IN players}}")), &data),
            Err(DocxError::UnterminatedLoop(v)) if v == "p"
        ));
        assert!(matches!(
            render(&p("{{END-FOR p}}"), &data),
            Err(DocxError::UnmatchedEndFor(_))
        ));
        assert!(matches!(
            render(
                &format!("<w:body>{}{}</w:body>", p("{{FOR p IN players}}"), p("{{END-FOR p}}")),
                &data
            ),
            Err(DocxError::NotAList(_))
        ));
        assert!(matches!(
            render(&p("{{IMAGE logo}}"), &data),
            Err(DocxError::UnsupportedCommand(k)) if k == "IMAGE"
        ));
    }

    #[test]
    fn test_section_break_paragraph_survives_marker_removal() {
        let xml = format!(
            "<w:body>{}<w:p><w:pPr><w:sectPr/></w:pPr><w:r><w:t>{{{{END-FOR p}}}}</w:t></w:r></w:p></w:body>",
            p("{{FOR p IN players}}")
        );
        let out = render(&xml, &json!({"players": [1]})).unwrap();
        assert_eq!(out, "<w:body><w:p><w:pPr><w:sectPr/></w:pPr></w:p></w:body>");
    }
}
