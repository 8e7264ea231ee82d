use anyhow::Context;
use scraper::{Html, Selector};
use std::path::PathBuf;
use url::Url;

/// Where the page to scan comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    Url(Url),
    File(PathBuf),
}

impl PageSource {
    pub fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => Self::Url(u),
            _ => Self::File(PathBuf::from(raw)),
        }
    }

    pub async fn fetch(&self, client: &reqwest::Client) -> anyhow::Result<String> {
        match self {
            Self::Url(u) => {
                let resp = client
                    .get(u.clone())
                    .send()
                    .await
                    .with_context(|| format!("fetch page {u}"))?
                    .error_for_status()
                    .with_context(|| format!("fetch page {u}"))?;
                Ok(resp.text().await?)
            }
            Self::File(p) => tokio::fs::read_to_string(p)
                .await
                .with_context(|| format!("read page {}", p.display())),
        }
    }
}

impl std::fmt::Display for PageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(u) => write!(f, "{u}"),
            Self::File(p) => write!(f, "{}", p.display()),
        }
    }
}

/// An `<a>` element whose target uses the magnet scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnetAnchor {
    /// Position among the magnet anchors of the page, document order.
    pub index: usize,
    pub href: String,
    pub text: String,
}

pub fn is_magnet_href(href: &str) -> bool {
    href.trim_start()
        .get(..7)
        .map(|s| s.eq_ignore_ascii_case("magnet:"))
        .unwrap_or(false)
}

/// All magnet anchors of `html`, in document order.
pub fn scan_document(html: &str) -> Vec<MagnetAnchor> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse("a[href]").expect("static selector");

    doc.select(&sel)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            is_magnet_href(href).then(|| (href, a.text().collect::<String>()))
        })
        .enumerate()
        .map(|(index, (href, text))| MagnetAnchor {
            index,
            href: href.trim().to_string(),
            text: text.split_whitespace().collect::<Vec<_>>().join(" "),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html><body>
  <a href="/about">About</a>
  <p>Releases:
    <a href="magnet:?xt=urn:btih:AAAA&amp;dn=one">  First
       release </a>
    <a href=" MAGNET:?xt=urn:btih:bbbb">second</a>
    <a href="https://example.org/?u=magnet:?xt=urn:btih:cccc">mirror</a>
    <a name="anchor-without-href">x</a>
  </p>
</body></html>"#;

    #[test]
    fn finds_magnet_anchors_in_order() {
        let found = scan_document(PAGE);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].index, 0);
        assert_eq!(found[0].href, "magnet:?xt=urn:btih:AAAA&dn=one");
        assert_eq!(found[0].text, "First release");
        assert_eq!(found[1].index, 1);
        assert_eq!(found[1].href, "MAGNET:?xt=urn:btih:bbbb");
    }

    #[test]
    fn page_without_magnets_is_empty() {
        assert!(scan_document("<html><body><a href='x'>x</a></body></html>").is_empty());
        assert!(scan_document("").is_empty());
    }

    #[test]
    fn scheme_check() {
        assert!(is_magnet_href("magnet:?xt=urn:btih:1"));
        assert!(is_magnet_href("  Magnet:?x"));
        assert!(!is_magnet_href("magnet"));
        assert!(!is_magnet_href("http://magnet:"));
    }

    #[test]
    fn source_kind_from_argument() {
        assert!(matches!(PageSource::parse("https://example.org/list"), PageSource::Url(_)));
        assert_eq!(
            PageSource::parse("saved/page.html"),
            PageSource::File(PathBuf::from("saved/page.html"))
        );
        assert!(matches!(PageSource::parse("C:/pages/x.html"), PageSource::File(_)));
    }
}
