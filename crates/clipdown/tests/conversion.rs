//! End-to-end conversion scenarios

use clipdown::{
    CodeBlockStyle, HeadingStyle, LinkStyle, Node, TurndownError, TurndownOptions,
    TurndownService,
};
use rstest::rstest;

fn convert(node: &Node) -> String {
    TurndownService::new().turndown(node).unwrap()
}

fn table(rows: &[&[&str]]) -> Node {
    rows.iter().enumerate().fold(Node::element("table"), |table, (i, row)| {
        let cell_tag = if i == 0 { "th" } else { "td" };
        let tr = row
            .iter()
            .fold(Node::element("tr"), |tr, cell| tr.with_child(Node::element(cell_tag).with_text(cell)));
        table.with_child(tr)
    })
}

#[rstest]
#[case::paragraph(Node::element("p").with_text("plain"), "plain")]
#[case::emphasis(Node::element("i").with_text("it"), "_it_")]
#[case::strong(Node::element("strong").with_text("bold"), "**bold**")]
#[case::line_break(
    Node::element("p").with_text("a").with_child(Node::element("br")).with_text("b"),
    "a  \nb"
)]
#[case::horizontal_rule(Node::element("hr"), "* * *")]
#[case::empty_div(Node::element("div"), "")]
#[case::comment_only(Node::element("div").with_child(Node::comment("hidden")), "")]
#[case::unknown_inline(Node::element("span").with_text("kept"), "kept")]
fn converts_simple_elements(#[case] node: Node, #[case] expected: &str) {
    assert_eq!(convert(&node), expected);
}

#[rstest]
#[case(HeadingStyle::Setext, "h1", "Title\n=====")]
#[case(HeadingStyle::Setext, "h2", "Title\n-----")]
#[case(HeadingStyle::Setext, "h5", "##### Title")]
#[case(HeadingStyle::Atx, "h1", "# Title")]
#[case(HeadingStyle::Atx, "h6", "###### Title")]
fn heading_styles(#[case] style: HeadingStyle, #[case] tag: &str, #[case] expected: &str) {
    let service = TurndownService::with_options(TurndownOptions {
        heading_style: style,
        ..Default::default()
    })
    .unwrap();
    let node = Node::element(tag).with_text("Title");
    assert_eq!(service.turndown(&node).unwrap(), expected);
}

#[test]
fn strong_inside_paragraph() {
    let node = Node::element("p")
        .with_text("Hello ")
        .with_child(Node::element("strong").with_text("world"))
        .with_text("!");
    assert_eq!(convert(&node), "Hello **world**!");
}

#[test]
fn ordered_list_honours_start() {
    let list = ["one", "two", "three"]
        .iter()
        .fold(Node::element_with_attrs("ol", vec![("start", "5")]), |ol, item| {
            ol.with_child(Node::element("li").with_text(item))
        });
    assert_eq!(convert(&list), "5.  one\n6.  two\n7.  three");
}

#[rstest]
#[case('*', "*   a\n*   b")]
#[case('-', "-   a\n-   b")]
#[case('+', "+   a\n+   b")]
fn bullet_markers(#[case] marker: char, #[case] expected: &str) {
    let service = TurndownService::with_options(TurndownOptions {
        bullet_list_marker: marker,
        ..Default::default()
    })
    .unwrap();
    let list = Node::element("ul")
        .with_child(Node::element("li").with_text("a"))
        .with_child(Node::element("li").with_text("b"));
    assert_eq!(service.turndown(&list).unwrap(), expected);
}

#[test]
fn loose_list_items_are_separated() {
    let list = Node::element("ul")
        .with_child(Node::element("li").with_child(Node::element("p").with_text("first")))
        .with_child(Node::element("li").with_child(Node::element("p").with_text("second")));
    assert_eq!(convert(&list), "*   first\n\n*   second");
}

#[test]
fn multi_paragraph_list_item_is_indented() {
    let list = Node::element("ul").with_child(
        Node::element("li")
            .with_child(Node::element("p").with_text("first"))
            .with_child(Node::element("p").with_text("second")),
    );
    assert_eq!(convert(&list), "*   first\n\n    second");
}

#[test]
fn blockquote_prefixes_every_line() {
    let quote = Node::element("blockquote")
        .with_child(Node::element("p").with_text("first"))
        .with_child(Node::element("p").with_text("second"));
    assert_eq!(convert(&quote), "> first\n> \n> second");
}

#[test]
fn two_by_two_table() {
    let node = table(&[&["A", "B"], &["1", "2"]]);
    assert_eq!(convert(&node), "| A | B |\n| --- | --- |\n| 1 | 2 |");
}

#[test]
fn table_cells_escape_pipes_and_flatten_lines() {
    let node = Node::element("table").with_child(
        Node::element("tr")
            .with_child(Node::element("td").with_text("a|b"))
            .with_child(
                Node::element("td")
                    .with_text("one")
                    .with_child(Node::element("br"))
                    .with_text("two"),
            ),
    );
    assert_eq!(convert(&node), "| a\\|b | one two |\n| --- | --- |");
}

#[test]
fn table_with_sections_and_empty_cell() {
    let node = Node::element("table")
        .with_child(
            Node::element("thead").with_child(
                Node::element("tr")
                    .with_child(Node::element("th").with_text("Name"))
                    .with_child(Node::element("th")),
            ),
        )
        .with_child(
            Node::element("tbody").with_child(
                Node::element("tr")
                    .with_child(Node::element("td").with_text("x"))
                    .with_child(Node::element("td").with_text("y")),
            ),
        );
    assert_eq!(convert(&node), "| Name |  |\n| --- | --- |\n| x | y |");
}

#[test]
fn text_between_blocks_keeps_one_blank_line() {
    let node = Node::element("div")
        .with_child(Node::element("h2").with_text("Heading"))
        .with_child(Node::element("p").with_text("Body"))
        .with_child(Node::element("hr"))
        .with_child(Node::element("p").with_text("After"));
    assert_eq!(convert(&node), "Heading\n-------\n\nBody\n\n* * *\n\nAfter");
}

#[test]
fn code_inside_pre_is_raw() {
    let pre = Node::element("pre").with_child(Node::element("code").with_text("a_b *c*\n  indented"));
    assert_eq!(convert(&pre), "    a_b *c*\n      indented");

    let fenced = TurndownService::with_options(TurndownOptions {
        code_block_style: CodeBlockStyle::Fenced,
        fence: "~~~".to_string(),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(fenced.turndown(&pre).unwrap(), "~~~\na_b *c*\n  indented\n~~~");
}

#[test]
fn pre_without_code_keeps_whitespace() {
    let pre = Node::element("pre").with_text("a  b");
    assert_eq!(convert(&pre), "a  b");
}

#[test]
fn keep_preserves_html() {
    let mut service = TurndownService::new();
    service.keep(["sup", "sub"]).unwrap();
    let node = Node::element("p")
        .with_text("x")
        .with_child(Node::element("sup").with_text("2"));
    assert_eq!(service.turndown(&node).unwrap(), "x<sup>2</sup>");
}

#[test]
fn reference_links_do_not_leak_between_calls() {
    let service = TurndownService::with_options(TurndownOptions {
        link_style: LinkStyle::Referenced,
        ..Default::default()
    })
    .unwrap();
    let first = Node::element_with_attrs("a", vec![("href", "https://one.example")]).with_text("one");
    let second = Node::element_with_attrs("a", vec![("href", "https://two.example")]).with_text("two");

    assert_eq!(service.turndown(&first).unwrap(), "[one][1]\n\n[1]: https://one.example");
    assert_eq!(service.turndown(&second).unwrap(), "[two][1]\n\n[1]: https://two.example");
}

#[test]
fn rejects_text_root() {
    let err = TurndownService::new().turndown(&Node::text("x")).unwrap_err();
    assert!(matches!(err, TurndownError::InvalidInput(_)));
}

#[test]
fn service_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TurndownService>();

    let service = TurndownService::new();
    let node = Node::element("p").with_text("shared");
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| service.turndown(&node).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "shared");
        }
    });
}

#[test]
fn deeply_nested_tree_does_not_overflow() {
    let mut node = Node::element("p").with_text("deep");
    for i in 0..40_000 {
        let tag = if i % 2 == 0 { "div" } else { "span" };
        node = Node::element(tag).with_child(node);
    }
    assert_eq!(convert(&node), "deep");
}

#[cfg(feature = "html")]
#[rstest]
#[case("<p>Hello <em>there</em></p>", "Hello _there_")]
#[case("<ul>\n  <li>One</li>\n  <li>Two</li>\n</ul>", "*   One\n*   Two")]
#[case("<p>a<!-- gone -->b</p>", "ab")]
#[case("<p><a href=\"/x\" title=\"T\">link</a></p>", "[link](/x \"T\")")]
#[case("<p><img src=\"a.png\" alt=\"pic\"> caption</p>", "![pic](a.png) caption")]
#[case("<pre><code class=\"language-js\">x()</code></pre>", "    x()")]
#[case("<p>#</p>", "\\#")]
#[case("<p>1.</p>", "1\\.")]
#[case("<p>1)</p>", "1\\)")]
#[case("<p> + </p>", "\\+")]
#[case("<ul><li><ul><li>x</li></ul>tail</li></ul>", "*   *   x\n\n    tail")]
#[case("<table><tr><td>one <br> two</td></tr></table>", "| one two |\n| --- |")]
fn converts_html(#[case] html: &str, #[case] expected: &str) {
    let service = TurndownService::new();
    assert_eq!(service.turndown_html(html).unwrap(), expected);
}
