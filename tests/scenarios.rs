use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use telenode::{
    Child, ConvertOptions, HeadingLevel, InputFormat, ListItem, Node, convert,
    convert_with_options,
};

fn to_value(nodes: Vec<Node>) -> Value {
    serde_json::to_value(nodes).unwrap()
}

#[test]
fn paragraph_with_bold() {
    assert_eq!(
        to_value(convert("<p>Hello <b>World</b></p>")),
        json!([{"tag": "p", "children": ["Hello ", {"tag": "b", "children": ["World"]}]}])
    );
}

#[test]
fn standalone_image_has_no_paragraph() {
    assert_eq!(
        to_value(convert("<img src=\"http://x/a.png\" alt=\"pic\">")),
        json!([{"tag": "img", "attrs": {"src": "http://x/a.png", "alt": "pic"}}])
    );
}

#[test]
fn embedded_image_is_never_emitted() {
    let nodes = convert("<img src=\"data:image/png;base64,AAAA\">");
    assert!(!nodes.iter().any(|node| matches!(node, Node::Image { .. })));
    assert_eq!(to_value(nodes), json!([{"tag": "p", "children": ["content unparsable"]}]));

    let nodes = convert("<p>kept</p><img src=\"DATA:image/gif;base64,R0\">");
    assert_eq!(to_value(nodes), json!([{"tag": "p", "children": ["kept"]}]));
}

#[test]
fn markdown_heading_and_paragraph() {
    assert_eq!(
        to_value(convert("# Title\n\nSome *text* and a [link](http://x).")),
        json!([
            {"tag": "h3", "children": ["Title"]},
            {"tag": "p", "children": [
                "Some ",
                {"tag": "i", "children": ["text"]},
                " and a ",
                {"tag": "a", "attrs": {"href": "http://x"}, "children": ["link"]},
                "."
            ]}
        ])
    );
}

#[test]
fn empty_input_is_a_placeholder() {
    assert_eq!(
        convert(""),
        vec![Node::Paragraph(vec![Child::Text("content empty".into())])]
    );
}

#[test]
fn unordered_list_items() {
    assert_eq!(
        convert("<ul><li>A</li><li>B</li></ul>"),
        vec![Node::List {
            ordered: false,
            items: vec![
                ListItem(vec![Child::Text("A".into())]),
                ListItem(vec![Child::Text("B".into())]),
            ],
        }]
    );
}

#[rstest]
#[case("<h1>t</h1>", HeadingLevel::Major)]
#[case("<h2>t</h2>", HeadingLevel::Major)]
#[case("<h3>t</h3>", HeadingLevel::Minor)]
#[case("<h5>t</h5>", HeadingLevel::Minor)]
#[case("<h6>t</h6>", HeadingLevel::Minor)]
#[case("# t", HeadingLevel::Major)]
#[case("## t", HeadingLevel::Major)]
#[case("### t", HeadingLevel::Minor)]
fn heading_levels_collapse(#[case] input: &str, #[case] expected: HeadingLevel) {
    match convert(input).as_slice() {
        [Node::Heading { level, children }] => {
            assert_eq!(*level, expected);
            assert_eq!(children, &vec![Child::Text("t".into())]);
        }
        other => panic!("expected one heading, got {other:?}"),
    }
}

#[rstest]
#[case("<ol><li>one</li><li>two</li><li>three</li></ol>", true, 3)]
#[case("<ul><li>x</li></ul>", false, 1)]
#[case("- a\n- b\n- c\n- d", false, 4)]
#[case("1. a\n2. b", true, 2)]
fn lists_contain_only_items(#[case] input: &str, #[case] ordered: bool, #[case] count: usize) {
    let value = to_value(convert(input));
    let list = &value[0];
    assert_eq!(list["tag"], if ordered { "ol" } else { "ul" });
    let items = list["children"].as_array().unwrap();
    assert_eq!(items.len(), count);
    assert!(items.iter().all(|item| item["tag"] == "li"));
}

#[rstest]
#[case("just some words")]
#[case("two  spaces, punctuation! and 123")]
#[case("ünïcödé text")]
fn plain_text_is_one_paragraph(#[case] input: &str) {
    assert_eq!(
        convert(input),
        vec![Node::Paragraph(vec![Child::Text(input.into())])]
    );
}

#[test]
fn markdown_blocks_keep_source_order() {
    let markdown = "intro line\n- first\n- second\nbetween\n> quote\n```\ncode\n```\n## End";
    assert_eq!(
        to_value(convert(markdown)),
        json!([
            {"tag": "p", "children": ["intro line"]},
            {"tag": "ul", "children": [
                {"tag": "li", "children": ["first"]},
                {"tag": "li", "children": ["second"]}
            ]},
            {"tag": "p", "children": ["between"]},
            {"tag": "blockquote", "children": [{"tag": "p", "children": ["quote"]}]},
            {"tag": "pre", "children": ["code"]},
            {"tag": "h3", "children": ["End"]}
        ])
    );
}

#[test]
fn article_with_mixed_blocks() {
    let html = r#"
        <h2>Release notes</h2>
        <p>Version <strong>2.0</strong> is out. See <a href="https://example.com/notes">the notes</a>.</p>
        <img src="https://example.com/banner.png" alt="Banner">
        <ul><li>Faster</li><li><em>Smaller</em></li></ul>
        <pre><code>cargo install thing</code></pre>
    "#;
    assert_eq!(
        to_value(convert(html)),
        json!([
            {"tag": "h3", "children": ["Release notes"]},
            {"tag": "p", "children": [
                "Version ",
                {"tag": "b", "children": ["2.0"]},
                " is out. See ",
                {"tag": "a", "attrs": {"href": "https://example.com/notes"}, "children": ["the notes"]},
                "."
            ]},
            {"tag": "img", "attrs": {"src": "https://example.com/banner.png", "alt": "Banner"}},
            {"tag": "ul", "children": [
                {"tag": "li", "children": ["Faster"]},
                {"tag": "li", "children": [{"tag": "i", "children": ["Smaller"]}]}
            ]},
            {"tag": "pre", "children": ["cargo install thing"]}
        ])
    );
}

#[test]
fn options_change_placeholders_and_format() {
    let options = ConvertOptions {
        format: InputFormat::Html,
        empty_placeholder: "nothing".into(),
        ..ConvertOptions::default()
    };
    assert_eq!(
        to_value(convert_with_options("", &options)),
        json!([{"tag": "p", "children": ["nothing"]}])
    );
    assert_eq!(
        to_value(convert_with_options("*not italic*", &options)),
        json!([{"tag": "p", "children": ["*not italic*"]}])
    );
}
