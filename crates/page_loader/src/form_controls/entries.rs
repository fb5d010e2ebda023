use html::{Document, Id, input_type};
use net::FormEntry;

/// Entries of a multipart submission of `form`, in declaration order.
///
/// Only successful controls contribute: named and enabled, checkboxes and radios when
/// checked, every selected option of a select. Buttons are left out (the triggering one is
/// appended by the caller), as are file inputs since the document carries no file payloads.
pub fn form_data_entries(doc: &Document, form: Id) -> Vec<FormEntry> {
    let mut entries = Vec::new();
    for field in doc.form_elements(form) {
        let Some(el) = doc.element(field) else {
            continue;
        };
        let name = el.attr("name").unwrap_or("");
        if name.is_empty() || doc.is_disabled(field) {
            continue;
        }

        match el.name.as_str() {
            "input" => match input_type(el) {
                "checkbox" | "radio" => {
                    if doc.checked(field) {
                        entries.push(FormEntry::new(name, doc.value(field)));
                    }
                }
                "file" | "image" | "submit" | "reset" | "button" => {}
                _ => entries.push(FormEntry::new(name, doc.value(field))),
            },
            "textarea" => entries.push(FormEntry::new(name, doc.value(field))),
            "select" => {
                for option in doc.selected_options(field) {
                    entries.push(FormEntry::new(name, doc.value(option)));
                }
            }
            _ => {}
        }
    }
    entries
}

/// The triggering control's `name=value`, when it carries a name.
pub fn submitter_entry(doc: &Document, submitter: Id) -> Option<FormEntry> {
    let name = doc.attr(submitter, "name")?;
    Some(FormEntry::new(name, doc.value(submitter)))
}
