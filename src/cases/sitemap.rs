use chrono::{DateTime, SecondsFormat, Utc};

use super::catalog::MAJOR_CASES;

pub const CACHE_CONTROL: &str = "public, max-age=3600, s-maxage=3600";

struct Page {
    path: String,
    changefreq: &'static str,
    priority: f32,
}

fn pages() -> Vec<Page> {
    let statics = [
        ("/", "daily", 1.0),
        ("/home", "weekly", 0.9),
        ("/features", "weekly", 0.9),
        ("/chat", "daily", 0.8),
    ];
    statics
        .into_iter()
        .map(|(path, changefreq, priority)| Page {
            path: path.to_string(),
            changefreq,
            priority,
        })
        .chain(MAJOR_CASES.iter().map(|c| Page {
            path: format!("/cases/{}", c.slug),
            changefreq: "monthly",
            priority: 0.8,
        }))
        .collect()
}

/// Renders the sitemap for `base_url`, every page stamped with `now`.
pub fn render_sitemap(base_url: &str, now: DateTime<Utc>) -> String {
    let base_url = base_url.trim_end_matches('/');
    let lastmod = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let urls = pages()
        .iter()
        .map(|page| {
            format!(
                "  <url>\n    <loc>{base_url}{}</loc>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n    <lastmod>{lastmod}</lastmod>\n  </url>",
                page.path, page.changefreq, page.priority
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{urls}\n</urlset>"
    )
}
