use crate::dom::Document;
use crate::tokenizer::is_void_element;
use crate::types::{Id, NodeData};

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

pub(crate) fn write_node(doc: &Document, id: Id, out: &mut String) {
    match doc.data(id) {
        Some(NodeData::Document { .. }) => {
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
        }
        Some(NodeData::Element(el)) => {
            out.push('<');
            out.push_str(&el.name);
            for (k, v) in &el.attributes {
                out.push(' ');
                out.push_str(k);
                if let Some(v) = v {
                    out.push_str("=\"");
                    escape_attr(v, out);
                    out.push('"');
                }
            }
            out.push('>');
            if is_void_element(&el.name) {
                return;
            }
            let raw = matches!(el.name.as_str(), "script" | "style");
            for &child in doc.children(id) {
                match doc.data(child) {
                    Some(NodeData::Text(text)) if raw => out.push_str(text),
                    _ => write_node(doc, child, out),
                }
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
        Some(NodeData::Text(text)) => escape_text(text, out),
        Some(NodeData::Comment(text)) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use crate::Document;

    #[test]
    fn serializes_escaped_text_and_attributes() {
        let doc = Document::parse(r#"<div title="a &quot;b&quot;" hidden>1 &lt; 2<br><!--c--></div>"#);
        let div = doc.query_selector("div").unwrap().unwrap();
        assert_eq!(
            doc.outer_html(div),
            r#"<div title="a &quot;b&quot;" hidden>1 &lt; 2<br><!--c--></div>"#
        );
    }
}
