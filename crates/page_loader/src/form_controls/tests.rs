use super::*;
use html::{Document, Id};
use net::FormEntry;

fn form(doc: &Document) -> Id {
    doc.query_selector("form").unwrap().unwrap()
}

#[test]
fn get_query_lists_fields_last_declared_first() {
    let doc = Document::parse(
        r#"<form action="/search" method="get"><input name="q" value="hello"><input name="page" value="2"></form>"#,
    );
    let query = serialize_for_get(&doc, Some(form(&doc)));
    assert_eq!(query, "page=2&q=hello");
    assert_eq!(append_query("/search", &query), "/search?page=2&q=hello");
}

#[test]
fn get_query_skips_files_and_unchecked_boxes() {
    let doc = Document::parse(
        r#"<form>
             <input type="checkbox" name="a" value="1" checked>
             <input type="checkbox" name="b" value="2">
             <input type="radio" name="r" value="x">
             <input type="radio" name="r" value="y" checked>
             <input type="file" name="upload">
             <input name="" value="anonymous">
           </form>"#,
    );
    let query = serialize_for_get(&doc, Some(form(&doc)));
    assert_eq!(query, "r=y&a=1");
    assert_eq!(query.matches("a=1").count(), 1);
    assert!(!query.contains("upload"));
}

#[test]
fn get_query_includes_buttons_textareas_and_selects() {
    let doc = Document::parse(
        r#"<form>
             <textarea name="note">a b&amp;c</textarea>
             <select name="one"><option>first</option><option value="2" selected>second</option></select>
             <select name="many" multiple>
               <option value="x" selected>x</option><option value="y">y</option><option value="z" selected>z</option>
             </select>
             <button name="go" value="now">Go</button>
             <input type="submit" name="s" value="Save">
           </form>"#,
    );
    let query = serialize_for_get(&doc, Some(form(&doc)));
    assert_eq!(query, "s=Save&go=now&many=z&many=x&one=2&note=a%20b%26c");
}

#[test]
fn get_query_reflects_live_control_state() {
    let mut doc = Document::parse(r#"<form><input id="q" name="q" value="old"><input id="c" type="checkbox" name="c"></form>"#);
    let q = doc.element_by_id("q").unwrap();
    let c = doc.element_by_id("c").unwrap();
    doc.set_value(q, "new").unwrap();
    doc.set_checked(c, true).unwrap();
    assert_eq!(serialize_for_get(&doc, Some(form(&doc))), "c=on&q=new");
}

#[test]
fn get_query_reflects_runtime_option_selection() {
    let mut doc = Document::parse(
        r#"<form><select name="tags" multiple><option id="a" selected>a</option><option id="b">b</option></select></form>"#,
    );
    let a = doc.element_by_id("a").unwrap();
    let b = doc.element_by_id("b").unwrap();
    doc.set_selected(b, true).unwrap();
    doc.set_selected(a, false).unwrap();
    assert_eq!(serialize_for_get(&doc, Some(form(&doc))), "tags=b");
}

#[test]
fn get_query_is_empty_without_a_form() {
    let doc = Document::parse(r#"<div id="d"><input name="q" value="1"></div>"#);
    assert_eq!(serialize_for_get(&doc, None), "");
    assert_eq!(serialize_for_get(&doc, doc.element_by_id("d")), "");
}

#[test]
fn append_query_extends_an_existing_query_string() {
    assert_eq!(append_query("/list?sort=asc", "page=2"), "/list?sort=asc&page=2");
    assert_eq!(append_query("/list", ""), "/list");
}

#[test]
fn multipart_entries_keep_declaration_order_and_skip_unsuccessful_controls() {
    let doc = Document::parse(
        r#"<form id="f">
             <input name="title" value="Hi">
             <input name="off" value="x" disabled>
             <fieldset disabled><input name="inside" value="y"></fieldset>
             <input type="checkbox" name="flag" value="1" checked>
             <input type="checkbox" name="other" value="1">
             <input type="file" name="upload">
             <button name="save" value="1">Save</button>
             <select name="tags" multiple><option selected>a</option><option>b</option><option selected>c</option></select>
           </form>
           <textarea name="body" form="f">text</textarea>"#,
    );
    let entries = form_data_entries(&doc, form(&doc));
    assert_eq!(
        entries,
        vec![
            FormEntry::new("title", "Hi"),
            FormEntry::new("flag", "1"),
            FormEntry::new("tags", "a"),
            FormEntry::new("tags", "c"),
            FormEntry::new("body", "text"),
        ]
    );
}

#[test]
fn submitter_entry_requires_a_name() {
    let doc = Document::parse(r#"<button id="named" name="act" value="del"></button><button id="bare"></button>"#);
    assert_eq!(
        submitter_entry(&doc, doc.element_by_id("named").unwrap()),
        Some(FormEntry::new("act", "del"))
    );
    assert_eq!(submitter_entry(&doc, doc.element_by_id("bare").unwrap()), None);
}

#[test]
fn encode_pair_percent_encodes_the_value() {
    assert_eq!(encode_pair("q", "a b/c"), "q=a%20b%2Fc");
}

#[test]
fn encode_entry_percent_encodes_both_halves() {
    assert_eq!(encode_entry(&FormEntry::new("a&b=c", "x y")), "a%26b%3Dc=x%20y");
}
