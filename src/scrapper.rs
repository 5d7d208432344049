use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use html2text::from_read;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::Config;
use crate::data_models::NewsItem;
use crate::errors::FetchError;
use crate::fetcher::PageFetcher;

// Detik has shipped two result-card layouts; each selector covers both.
static ARTICLE: Lazy<Selector> = Lazy::new(|| selector("article"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector(".media__title, h2.title, h3.title"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static IMAGE: Lazy<Selector> = Lazy::new(|| selector("img"));
static DATE: Lazy<Selector> = Lazy::new(|| selector(".media__date span, span.date"));
static CATEGORY: Lazy<Selector> = Lazy::new(|| selector(".media__subtitle, span.category"));
static SUMMARY: Lazy<Selector> = Lazy::new(|| selector(".media__desc, p"));
static ARTICLE_BODY: Lazy<Selector> =
    Lazy::new(|| selector(".detail__body-text, .itp_bodycontent, .detail_text"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e}"))
}

/// Scrapes Detik's search result pages.
///
/// Cheap to clone and safe to share: the only state is the pooled HTTP client.
#[derive(Debug, Clone)]
pub struct DetikScrapper {
    client: Client,
    search_url: Url,
    detail_concurrency: usize,
}

impl DetikScrapper {
    pub fn new(config: &Config) -> anyhow::Result<DetikScrapper> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.http_timeout)
            .build()?;
        let search_url = Url::parse(&config.search_url)?;
        Ok(DetikScrapper {
            client,
            search_url,
            detail_concurrency: config.detail_concurrency.max(1),
        })
    }

    pub fn search_url(&self, query: &str, page: u32) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("page", &page.to_string());
        url
    }

    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        res.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })
    }

    /// Fills `content` of every item, keeping the original order. An article
    /// that cannot be fetched keeps `content: None`.
    async fn attach_details(&self, items: Vec<NewsItem>) -> Vec<NewsItem> {
        stream::iter(items)
            .map(|mut item| async move {
                let content = match self.fetch_html(&item.url).await {
                    Ok(html) => parse_article(&item.url, &html),
                    Err(e) => Err(e),
                };
                match content {
                    Ok(content) => item.content = content,
                    Err(e) => log::warn!("could not load article {}: {:#}", item.url, e),
                }
                item
            })
            .buffered(self.detail_concurrency)
            .collect()
            .await
    }
}

#[async_trait]
impl PageFetcher for DetikScrapper {
    type Item = NewsItem;

    async fn fetch_page(
        &self,
        query: &str,
        page: u32,
        detail: bool,
    ) -> Result<Vec<NewsItem>, FetchError> {
        let url = self.search_url(query, page);
        log::info!("scraping page {page}: {url}");
        let html = self.fetch_html(url.as_str()).await?;
        let items = parse_search_page(&url, &html);
        if detail && !items.is_empty() {
            return Ok(self.attach_details(items).await);
        }
        Ok(items)
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .map(text_of)
        .find(|t| !t.is_empty())
}

/// Extracts result cards from a search page. Cards without a title or a link
/// are skipped.
pub fn parse_search_page(base: &Url, html: &str) -> Vec<NewsItem> {
    let document = Html::parse_document(html);
    let mut items = Vec::new();

    for card in document.select(&ARTICLE) {
        let Some(href) = card
            .select(&LINK)
            .find_map(|a| a.value().attr("href"))
        else {
            continue;
        };
        let Ok(url) = base.join(href) else {
            continue;
        };
        let Some(title) = first_text(card, &TITLE).or_else(|| {
            card.select(&LINK).map(text_of).find(|t| !t.is_empty())
        }) else {
            continue;
        };

        let mut item = NewsItem::new(title, url.to_string());
        item.image = card
            .select(&IMAGE)
            .find_map(|img| img.value().attr("src").or_else(|| img.value().attr("data-src")))
            .map(str::to_string);
        // the full timestamp lives in the title attribute, the text is relative
        item.published = card
            .select(&DATE)
            .find_map(|d| d.value().attr("title").map(str::to_string))
            .or_else(|| first_text(card, &DATE));
        item.category = first_text(card, &CATEGORY);
        item.summary = first_text(card, &SUMMARY);
        items.push(item);
    }

    items
}

/// Plain-text body of an article page, `None` if no known body container is
/// present.
pub fn parse_article(url: &str, html: &str) -> Result<Option<String>, FetchError> {
    let document = Html::parse_document(html);
    let Some(body) = document.select(&ARTICLE_BODY).next() else {
        return Ok(None);
    };
    let text = from_read(body.html().as_bytes(), 120).map_err(|e| FetchError::Parse {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}
