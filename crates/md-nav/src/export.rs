use std::path::Path;

use crate::config::NavConfig;
use crate::discovery::{discover_files, page_slug};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::slug::SlugRegistry;
use crate::toc::render_toc_html;

/// Minimal CSS for exported pages.
const CSS: &str = r#"
* { box-sizing: border-box; }
body { font-family: system-ui, -apple-system, sans-serif; margin: 0; color: #1a1a1a; line-height: 1.6; display: flex; height: 100vh; }
aside { width: 18rem; overflow-y: auto; padding: 1rem; border-right: 1px solid #e5e7eb; font-size: 0.9rem; }
main { flex: 1; overflow-y: auto; padding: 0 2rem 50vh; }
.progress { position: fixed; top: 0; left: 0; height: 3px; width: 0; background: #2563eb; }
ul.toc { list-style: none; padding-left: 0.9rem; margin: 0; }
ul.toc li.active > a { font-weight: 600; color: #1d4ed8; }
ul.toc li.active-path > a { color: #1e3a8a; }
a { color: #2563eb; text-decoration: none; }
details.md-section > summary { cursor: pointer; list-style: none; }
details.md-section > summary > h1, details.md-section > summary > h2,
details.md-section > summary > h3, details.md-section > summary > h4 { display: inline-block; margin: 0.8rem 0 0.4rem; }
pre { background: #f5f5f5; padding: 0.75rem; overflow-x: auto; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ddd; padding: 0.4rem; }
.tags span { display: inline-block; padding: 0.1rem 0.5rem; margin-right: 0.3rem; border-radius: 3px; background: #eef2ff; font-size: 0.8rem; }
"#;

/// Export a single document to a full HTML page: sidebar table of contents,
/// scroll container holding the rendered sections, reading-progress bar.
pub fn export_html(doc: &Document, config: &NavConfig) -> String {
    let article = doc.render(config);
    let title = doc.title().unwrap_or_else(|| "Untitled".to_string());
    let encoded_title = htmlescape::encode_minimal(&title);

    let first_id = article.headings.first().map(|h| h.id.as_str());
    let toc_html = render_toc_html(&article.toc, first_id);

    let description = doc
        .frontmatter
        .as_ref()
        .and_then(|fm| fm.get_display("description"))
        .map(|d| format!("<p class=\"description\">{}</p>\n", htmlescape::encode_minimal(&d)))
        .unwrap_or_default();

    let tags = doc
        .frontmatter
        .as_ref()
        .map(|fm| fm.tags())
        .filter(|t| !t.is_empty())
        .map(|t| {
            let spans: Vec<String> = t
                .iter()
                .map(|tag| format!("<span>{}</span>", htmlescape::encode_minimal(tag)))
                .collect();
            format!("<p class=\"tags\">{}</p>\n", spans.join(""))
        })
        .unwrap_or_default();

    let container_id = htmlescape::encode_minimal(&config.render.container_id);
    let body_html = article.html;

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{encoded_title}</title>
<style>{CSS}</style>
</head>
<body>
<div class="progress" role="progressbar" aria-valuemin="0" aria-valuemax="100" aria-valuenow="0"></div>
<aside>
<nav><a href="index.html">Index</a></nav>
<nav class="toc-nav" aria-label="Table of contents">
{toc_html}</nav>
</aside>
<main id="{container_id}">
{description}{tags}{body_html}</main>
</body>
</html>
"#
    )
}

/// Export an index page linking every exported article.
pub fn export_index(pages: &[(String, String)]) -> String {
    let mut body = format!("<p>{} articles</p>\n<ul>\n", pages.len());
    for (slug, title) in pages {
        body.push_str(&format!(
            "<li><a href=\"{}.html\">{}</a></li>\n",
            htmlescape::encode_minimal(slug),
            htmlescape::encode_minimal(title),
        ));
    }
    body.push_str("</ul>\n");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Articles</title>
<style>{CSS}</style>
</head>
<body>
<main>
<h1>Articles</h1>
{body}</main>
</body>
</html>
"#
    )
}

/// Export every markdown file under `dir` to `output_dir`, plus `index.html`.
/// Returns the number of pages written. Unreadable files are skipped.
pub fn export_site(
    dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &NavConfig,
) -> Result<usize> {
    let dir = dir.as_ref();
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir).map_err(|_| Error::WriteFailed(output_dir.to_path_buf()))?;

    let mut pages: Vec<(String, String)> = Vec::new();
    let mut slugs = SlugRegistry::new();
    slugs.unique("index");
    for path in discover_files(dir, None)? {
        let doc = match Document::from_file(&path) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("skipping {}: {e}", path.display());
                continue;
            }
        };

        let slug = slugs.unique(&page_slug(&path));

        let out_path = output_dir.join(format!("{slug}.html"));
        std::fs::write(&out_path, export_html(&doc, config))
            .map_err(|_| Error::WriteFailed(out_path.clone()))?;
        log::debug!("exported {} -> {}", path.display(), out_path.display());

        let title = doc.title().unwrap_or_else(|| slug.clone());
        pages.push((slug, title));
    }

    let index_path = output_dir.join("index.html");
    std::fs::write(&index_path, export_index(&pages)).map_err(|_| Error::WriteFailed(index_path))?;

    Ok(pages.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_html() {
        let doc = Document::from_str(
            "---\ntitle: Chat App\ndescription: Realtime <chat>\ntags: [rust, ws]\n---\n\n# Overview\n\nIntro.\n\n## Design\n\nDetails.\n",
        )
        .unwrap();
        let html = export_html(&doc, &NavConfig::default());
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<title>Chat App</title>"));
        assert!(html.contains("Realtime &lt;chat&gt;"));
        assert!(html.contains("<span>rust</span><span>ws</span>"));
        assert!(html.contains("<main id=\"content-scroll-container\">"));
        assert!(html.contains("<li class=\"active\"><a href=\"#overview\""));
        assert!(html.contains("href=\"#overview-design\""));
        assert!(html.contains("<h2 id=\"overview-design\">Design</h2>"));
    }

    #[test]
    fn test_export_index() {
        let pages = vec![
            ("chat".to_string(), "Chat App".to_string()),
            ("quiz".to_string(), "Skill Quiz".to_string()),
        ];
        let html = export_index(&pages);
        assert!(html.contains("2 articles"));
        assert!(html.contains("<a href=\"chat.html\">Chat App</a>"));
    }

    #[test]
    fn test_export_site() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        std::fs::create_dir_all(input.join("nested")).unwrap();
        std::fs::write(input.join("chat.md"), "# Chat\n\nBody.\n").unwrap();
        std::fs::write(input.join("index.md"), "# Home\n").unwrap();
        std::fs::write(input.join("nested/chat.md"), "# Chat again\n").unwrap();

        let count = export_site(&input, &output, &NavConfig::default()).unwrap();
        assert_eq!(count, 3);
        assert!(output.join("index.html").exists());
        assert!(output.join("chat.html").exists());
        assert!(output.join("chat-1.html").exists());
        assert!(output.join("index-1.html").exists());
        let index = std::fs::read_to_string(output.join("index.html")).unwrap();
        assert!(index.contains("3 articles"));
    }
}
