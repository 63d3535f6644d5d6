use comrak::{Arena, Options};

use crate::config::RenderConfig;
use crate::section::{SectionNode, SectionTree};

pub(crate) fn comrak_opts() -> Options<'static> {
    let mut opts = Options::default();
    opts.extension.table = true;
    opts.extension.strikethrough = true;
    opts.extension.autolink = true;
    opts.extension.tasklist = true;
    opts.extension.footnotes = true;
    opts.render.unsafe_ = true;
    opts
}

/// Render a markdown fragment to HTML using comrak.
pub fn render_markdown_to_html(body: &str) -> String {
    let arena = Arena::new();
    let opts = comrak_opts();
    let root = comrak::parse_document(&arena, body, &opts);
    let mut html = Vec::new();
    if let Err(e) = comrak::format_html(root, &opts, &mut html) {
        log::warn!("failed to render markdown: {e}");
    }
    String::from_utf8_lossy(&html).to_string()
}

/// Render a heading title's inline markdown (`**bold**`, `code`) without the
/// paragraph wrapper. Titles that parse as a block, such as `1. Intro`, are
/// escaped verbatim instead.
pub fn render_title_inline(title: &str) -> String {
    let html = render_markdown_to_html(title);
    match html
        .trim_end()
        .strip_prefix("<p>")
        .and_then(|s| s.strip_suffix("</p>"))
    {
        Some(inner) if !inner.contains("<p>") => inner.to_string(),
        _ => htmlescape::encode_minimal(title),
    }
}

/// Render a section tree to HTML. Every heading carries its section id.
pub fn render_tree(tree: &SectionTree, opts: &RenderConfig) -> String {
    let mut out = String::new();
    if !tree.preamble.is_empty() {
        out.push_str(&render_markdown_to_html(&tree.preamble));
    }
    for node in &tree.sections {
        render_node(node, opts, &mut out);
    }
    out
}

fn render_node(node: &SectionNode, opts: &RenderConfig, out: &mut String) {
    let s = &node.section;
    let heading = format!(
        "<h{lvl} id=\"{id}\">{title}</h{lvl}>",
        lvl = s.level,
        id = htmlescape::encode_minimal(&s.id),
        title = render_title_inline(&s.title),
    );

    if node.is_leaf() {
        out.push_str("<section class=\"md-section\">\n");
        out.push_str(&heading);
        out.push('\n');
        out.push_str(&render_markdown_to_html(&s.content));
        out.push_str("</section>\n");
        return;
    }

    if opts.expandable {
        let open = if opts.open { " open" } else { "" };
        out.push_str(&format!("<details class=\"md-section\"{open}>\n<summary>"));
        out.push_str(&heading);
        out.push_str("</summary>\n");
    } else {
        out.push_str("<section class=\"md-section\">\n");
        out.push_str(&heading);
        out.push('\n');
    }

    if !node.intro.is_empty() {
        out.push_str(&render_markdown_to_html(&node.intro));
    }
    for child in &node.children {
        render_node(child, opts, out);
    }

    out.push_str(if opts.expandable { "</details>\n" } else { "</section>\n" });
}
