pub mod affordance;
pub mod scan;

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;

use crate::core::catalog::{fetch_catalog, CatalogFetchError};
use crate::core::filter::FileFilter;
use crate::core::model::IndicatorState;
use crate::core::pipeline::{Pipeline, SubmitError, Submitted};
use crate::debrid::api::DebridApi;
use crate::i18n::Messages;
use crate::notify::Notifier;
use affordance::Affordance;
use scan::{scan_document, MagnetAnchor, PageSource};

#[derive(thiserror::Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Catalog(#[from] CatalogFetchError),

    #[error("link #{pick} does not exist, the page has {count} magnet link(s)")]
    PickOutOfRange { pick: usize, count: usize },
}

#[derive(Debug, Clone)]
pub struct Page {
    pub source: String,
    pub anchors: Vec<MagnetAnchor>,
}

impl Page {
    pub fn from_html(source: impl Into<String>, html: &str) -> Self {
        Self { source: source.into(), anchors: scan_document(html) }
    }

    pub async fn load(source: &PageSource, client: &reqwest::Client) -> anyhow::Result<Self> {
        let html = source.fetch(client).await?;
        Ok(Self::from_html(source.to_string(), &html))
    }

    /// One affordance per anchor, each placed right after its anchor.
    pub fn attach(&self) -> Vec<Affordance> {
        self.anchors.iter().cloned().map(Affordance::new).collect()
    }
}

/// Which affordances get activated once they are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    All,
    /// 1-based positions; repeats mean repeated clicks.
    Picked(Vec<usize>),
}

impl Activation {
    fn positions(&self, count: usize) -> Result<Vec<usize>, PageError> {
        match self {
            Activation::All => Ok((0..count).collect()),
            Activation::Picked(picks) => picks
                .iter()
                .map(|&pick| {
                    if pick == 0 || pick > count {
                        Err(PageError::PickOutOfRange { pick, count })
                    } else {
                        Ok(pick - 1)
                    }
                })
                .collect(),
        }
    }
}

/// Collaborators the page hands to every submission.
#[derive(Clone)]
pub struct Integration {
    pub api: Arc<dyn DebridApi>,
    pub notifier: Arc<dyn Notifier>,
    pub filter: FileFilter,
    pub messages: &'static Messages,
}

#[derive(Debug)]
pub struct ClickReport {
    pub position: usize,
    pub href: String,
    pub state: IndicatorState,
    pub outcome: Result<Submitted, SubmitError>,
}

#[derive(Debug)]
pub enum RunReport {
    /// The page had no magnet links; nothing was fetched.
    Idle,
    Ran { catalog_size: usize, clicks: Vec<ClickReport> },
}

/// Scan result -> catalog -> affordances -> activations.
///
/// The catalog is fetched before any affordance exists, so every duplicate
/// check sees it. A failed fetch aborts the whole run.
pub async fn run(page: &Page, ctx: Integration, activation: &Activation) -> Result<RunReport, PageError> {
    if page.anchors.is_empty() {
        tracing::info!(source = %page.source, "no magnet links found on the page");
        return Ok(RunReport::Idle);
    }
    let positions = activation.positions(page.anchors.len())?;
    tracing::info!(source = %page.source, links = page.anchors.len(), "magnet links found");

    let catalog = Arc::new(fetch_catalog(ctx.api.as_ref()).await?);
    let catalog_size = catalog.len();
    if catalog.is_empty() {
        tracing::debug!("account has no torrents yet");
    }

    let pipeline = Pipeline::new(ctx.api, catalog, ctx.filter, ctx.notifier, ctx.messages);
    let affordances = page.attach();

    let mut clicks = FuturesUnordered::new();
    for (seq, pos) in positions.into_iter().enumerate() {
        let affordance = &affordances[pos];
        let pipeline = &pipeline;
        clicks.push(async move { (seq, pos, affordance.click(pipeline).await) });
    }

    let mut done = Vec::new();
    while let Some(r) = clicks.next().await {
        done.push(r);
    }
    done.sort_by_key(|(seq, _, _)| *seq);

    let clicks = done
        .into_iter()
        .map(|(_, pos, outcome)| ClickReport {
            position: pos,
            href: affordances[pos].anchor().href.clone(),
            state: affordances[pos].state(),
            outcome,
        })
        .collect();

    Ok(RunReport::Ran { catalog_size, clicks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fake::FakeApi;
    use crate::core::model::{RemoteTorrentRecord, Severity};
    use crate::debrid::realdebrid::{DebridContext, RealDebridClient};
    use crate::i18n::EN;
    use crate::notify::RecordingNotifier;
    use httpmock::prelude::*;

    const ONE_LINK: &str = r#"<html><body>
        <a href="magnet:?xt=urn:btih:AAAA&dn=x">get</a>
    </body></html>"#;

    fn integration(api: Arc<dyn DebridApi>) -> (Integration, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = Integration {
            api,
            notifier: notifier.clone(),
            filter: FileFilter::default(),
            messages: &EN,
        };
        (ctx, notifier)
    }

    fn rec(id: &str, hash: &str) -> RemoteTorrentRecord {
        RemoteTorrentRecord { id: id.into(), hash: hash.into(), filename: None, status: None }
    }

    #[tokio::test]
    async fn one_link_end_to_end() {
        let api = Arc::new(
            FakeApi::new()
                .with_catalog(vec![rec("1", "bbbb")])
                .with_added_id("42")
                .with_files(&[("f1", "a/x.mkv"), ("f2", "a/y.txt")]),
        );
        let (ctx, notes) = integration(api.clone());
        let page = Page::from_html("test", ONE_LINK);

        let report = run(&page, ctx, &Activation::All).await.unwrap();

        let RunReport::Ran { catalog_size, clicks } = report else {
            panic!("expected a run");
        };
        assert_eq!(catalog_size, 1);
        assert_eq!(clicks.len(), 1);
        assert_eq!(clicks[0].state, IndicatorState::Active);
        assert_eq!(clicks[0].outcome.as_ref().unwrap().selected, vec!["f1".to_string()]);
        assert_eq!(api.calls().last().map(String::as_str), Some("select_files:42:f1"));
        assert_eq!(notes.seen(), vec![(EN.added_and_selected.to_string(), Severity::Positive)]);
    }

    #[tokio::test]
    async fn no_links_means_no_fetch() {
        let api = Arc::new(FakeApi::new());
        let (ctx, notes) = integration(api.clone());
        let page = Page::from_html("test", "<p>nothing here</p>");

        let report = run(&page, ctx, &Activation::All).await.unwrap();
        assert!(matches!(report, RunReport::Idle));
        assert!(api.calls().is_empty());
        assert!(notes.seen().is_empty());
    }

    #[tokio::test]
    async fn catalog_failure_aborts_silently() {
        let api = Arc::new(FakeApi::new().failing_catalog());
        let (ctx, notes) = integration(api.clone());
        let page = Page::from_html("test", ONE_LINK);

        let err = run(&page, ctx, &Activation::All).await.unwrap_err();
        assert!(matches!(err, PageError::Catalog(_)));
        assert_eq!(api.calls(), vec!["list_torrents".to_string()]);
        assert!(notes.seen().is_empty());
    }

    #[tokio::test]
    async fn duplicate_link_only_costs_the_catalog_fetch() {
        let api = Arc::new(FakeApi::new().with_catalog(vec![rec("1", "aaaa")]));
        let (ctx, _) = integration(api.clone());
        let page = Page::from_html("test", ONE_LINK);

        let RunReport::Ran { clicks, .. } = run(&page, ctx, &Activation::All).await.unwrap() else {
            panic!("expected a run");
        };
        assert!(matches!(clicks[0].outcome, Err(SubmitError::Duplicate(_))));
        assert_eq!(clicks[0].state, IndicatorState::Neutral);
        assert_eq!(api.calls(), vec!["list_torrents".to_string()]);
    }

    #[tokio::test]
    async fn picks_are_checked_before_fetching() {
        let api = Arc::new(FakeApi::new());
        let (ctx, _) = integration(api.clone());
        let page = Page::from_html("test", ONE_LINK);

        let err = run(&page, ctx, &Activation::Picked(vec![2])).await.unwrap_err();
        assert!(matches!(err, PageError::PickOutOfRange { pick: 2, count: 1 }));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn links_are_independent() {
        let html = r#"
            <a href="magnet:?dn=broken">broken</a>
            <a href="magnet:?xt=urn:btih:cccc">ok</a>"#;
        let api = Arc::new(FakeApi::new().with_files(&[("9", "book.cbz")]));
        let (ctx, notes) = integration(api.clone());
        let page = Page::from_html("test", html);

        let RunReport::Ran { clicks, .. } =
            run(&page, ctx, &Activation::Picked(vec![2, 1])).await.unwrap()
        else {
            panic!("expected a run");
        };
        assert_eq!(clicks[0].position, 1);
        assert!(clicks[0].outcome.is_ok());
        assert_eq!(clicks[1].position, 0);
        assert!(matches!(clicks[1].outcome, Err(SubmitError::InvalidMagnet)));
        assert_eq!(clicks[1].state, IndicatorState::Idle);
        assert_eq!(notes.seen().len(), 2);
    }

    #[tokio::test]
    async fn page_and_api_over_http() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/releases");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(ONE_LINK);
        });
        server.mock(|when, then| {
            when.method(GET).path("/torrents");
            then.status(200).body(r#"[{"id":"1","hash":"bbbb"}]"#);
        });
        let add = server.mock(|when, then| {
            when.method(POST).path("/torrents/addMagnet");
            then.status(201).body(r#"{"id":"42","uri":"x"}"#);
        });
        server.mock(|when, then| {
            when.method(GET).path("/torrents/info/42");
            then.status(200)
                .body(r#"{"id":"42","files":[{"id":1,"path":"/a/x.mkv"},{"id":2,"path":"/a/y.txt"}]}"#);
        });
        let select = server.mock(|when, then| {
            when.method(POST).path("/torrents/selectFiles/42").body("files=1");
            then.status(204);
        });

        let source = PageSource::parse(&server.url("/releases"));
        let page = Page::load(&source, &reqwest::Client::new()).await.unwrap();
        assert_eq!(page.anchors.len(), 1);

        let client = RealDebridClient::new(&DebridContext {
            base_url: server.base_url(),
            api_token: "t".into(),
            user_agent: "test".into(),
            timeout_secs: 5,
            catalog_limit: None,
        })
        .unwrap();
        let (ctx, _) = integration(Arc::new(client));

        let RunReport::Ran { clicks, .. } = run(&page, ctx, &Activation::All).await.unwrap() else {
            panic!("expected a run");
        };
        assert_eq!(clicks[0].state, IndicatorState::Active);
        add.assert();
        select.assert();
    }
}
