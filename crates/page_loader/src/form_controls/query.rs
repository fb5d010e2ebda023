use html::{Document, Id, input_type, select_type};
use net::FormEntry;

pub fn encode_pair(name: &str, value: &str) -> String {
    format!("{name}={}", urlencoding::encode(value))
}

/// `name=value` with both halves percent-encoded, for the submitter appended after the fields.
pub fn encode_entry(entry: &FormEntry) -> String {
    format!(
        "{}={}",
        urlencoding::encode(&entry.name),
        urlencoding::encode(&entry.value)
    )
}

/// Query string for a GET submission of `form`.
///
/// Fields are visited last-declared first, so same-named fields appear in reverse
/// declaration order. Submit/reset/button controls are included with their value, matching
/// the legacy serializers servers were written against. Returns an empty string when `form`
/// is absent or is not a `<form>`.
pub fn serialize_for_get(doc: &Document, form: Option<Id>) -> String {
    let Some(form) = form else {
        return String::new();
    };
    if !doc
        .tag_name(form)
        .is_some_and(|name| name.eq_ignore_ascii_case("form"))
    {
        return String::new();
    }

    let mut query: Vec<String> = Vec::new();
    for field in doc.form_elements(form).into_iter().rev() {
        let Some(el) = doc.element(field) else {
            continue;
        };
        let name = el.attr("name").unwrap_or("");
        if name.is_empty() {
            continue;
        }

        match el.name.as_str() {
            "input" => match input_type(el) {
                "checkbox" | "radio" => {
                    if doc.checked(field) {
                        query.push(encode_pair(name, &doc.value(field)));
                    }
                }
                "file" | "image" => {}
                _ => query.push(encode_pair(name, &doc.value(field))),
            },
            "textarea" => query.push(encode_pair(name, &doc.value(field))),
            "select" => match select_type(el) {
                "select-multiple" => {
                    for option in doc.options(field).into_iter().rev() {
                        if doc.selected(option) {
                            query.push(encode_pair(name, &doc.value(option)));
                        }
                    }
                }
                _ => query.push(encode_pair(name, &doc.value(field))),
            },
            "button" => query.push(encode_pair(name, &doc.value(field))),
            _ => {}
        }
    }

    query.join("&")
}

/// Append `query` to `url`, using `&` when the URL already carries a query string.
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{query}")
}
