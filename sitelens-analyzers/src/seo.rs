// On-page SEO audit of a single HTML document

use crate::error::Result;
use crate::page::{Page, selector, target_url};
use crate::payload::into_payload;
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use serde::Serialize;
use sitelens_core::analyzer::{Analyzer, AnalyzerError, AnalyzerKind, AnalyzerOptions, Payload};
use sitelens_core::dimension::{ImageStats, PageStructure};
use sitelens_core::request::TargetDescriptor;
use tracing::info;

const TITLE_LENGTH: (usize, usize) = (10, 60);
const DESCRIPTION_LENGTH: (usize, usize) = (50, 160);

#[derive(Debug, Clone, Serialize)]
pub struct SeoAudit {
    pub seo_score: u8,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1_count: usize,
    pub lang: Option<String>,
    pub has_viewport: bool,
    pub canonical: Option<String>,
    pub structure: PageStructure,
    pub images: ImageStats,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

impl SeoAudit {
    fn penalize(&mut self, points: u8, weakness: String, recommendation: &str) {
        self.seo_score = self.seo_score.saturating_sub(points);
        self.weaknesses.push(weakness);
        self.recommendations.push(recommendation.to_string());
    }
}

fn first_text(document: &Html, css: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty()))
}

fn first_attr(document: &Html, css: &str, attr: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

fn count(document: &Html, css: &str) -> Result<usize> {
    Ok(document.select(&selector(css)?).count())
}

/// Audit an HTML document. Score starts at 100 and loses points per issue.
pub fn audit_html(html: &str) -> Result<SeoAudit> {
    let document = Html::parse_document(html);

    let images_total = count(&document, "img")?;
    let images_with_alt = {
        let sel = selector("img[alt]")?;
        document
            .select(&sel)
            .filter(|img| img.value().attr("alt").is_some_and(|alt| !alt.trim().is_empty()))
            .count()
    };

    let mut audit = SeoAudit {
        seo_score: 100,
        title: first_text(&document, "title")?,
        meta_description: first_attr(&document, r#"meta[name="description"]"#, "content")?,
        h1_count: count(&document, "h1")?,
        lang: first_attr(&document, "html", "lang")?,
        has_viewport: count(&document, r#"meta[name="viewport"]"#)? > 0,
        canonical: first_attr(&document, r#"link[rel="canonical"]"#, "href")?,
        structure: PageStructure {
            navigation: count(&document, "nav")? > 0,
            header: count(&document, "header")? > 0,
            footer: count(&document, "footer")? > 0,
        },
        images: ImageStats {
            total: images_total as u32,
            with_alt: images_with_alt as u32,
        },
        strengths: Vec::new(),
        weaknesses: Vec::new(),
        recommendations: Vec::new(),
    };

    match audit.title.as_ref().map(|t| t.chars().count()) {
        None => audit.penalize(
            15,
            "Missing page title".to_string(),
            "Add a unique, descriptive <title> to every page",
        ),
        Some(len) if len < TITLE_LENGTH.0 || len > TITLE_LENGTH.1 => audit.penalize(
            5,
            format!("Page title is {} characters long", len),
            "Keep page titles between 10 and 60 characters",
        ),
        Some(_) => audit.strengths.push("Descriptive page title".to_string()),
    }

    match audit.meta_description.as_ref().map(|d| d.chars().count()) {
        None => audit.penalize(
            15,
            "Missing meta description".to_string(),
            "Add a meta description summarizing the page",
        ),
        Some(len) if len < DESCRIPTION_LENGTH.0 || len > DESCRIPTION_LENGTH.1 => audit.penalize(
            5,
            format!("Meta description is {} characters long", len),
            "Keep meta descriptions between 50 and 160 characters",
        ),
        Some(_) => audit.strengths.push("Well-sized meta description".to_string()),
    }

    match audit.h1_count {
        0 => audit.penalize(
            10,
            "No <h1> heading".to_string(),
            "Add a single <h1> heading describing the page",
        ),
        1 => audit.strengths.push("Single <h1> heading".to_string()),
        n => audit.penalize(
            5,
            format!("{} <h1> headings on one page", n),
            "Use exactly one <h1> per page",
        ),
    }

    if audit.lang.is_none() {
        audit.penalize(
            5,
            "Document language not declared".to_string(),
            "Declare the page language with <html lang=\"...\">",
        );
    }

    if audit.has_viewport {
        audit.strengths.push("Mobile viewport configured".to_string());
    } else {
        audit.penalize(
            10,
            "No mobile viewport meta tag".to_string(),
            "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
        );
    }

    if audit.canonical.is_none() {
        audit.penalize(
            5,
            "No canonical URL".to_string(),
            "Add a canonical link to avoid duplicate content",
        );
    }

    let missing_alt = audit.images.total - audit.images.with_alt;
    if missing_alt > 0 {
        let points = (missing_alt * 2).min(10) as u8;
        audit.penalize(
            points,
            format!("{} of {} images lack alt text", missing_alt, audit.images.total),
            "Add alt text to images",
        );
    } else if audit.images.all_described() {
        audit.strengths.push("All images have alt text".to_string());
    }

    if !audit.structure.is_complete() {
        audit.penalize(
            5,
            "Page lacks semantic navigation, header or footer".to_string(),
            "Use <nav>, <header> and <footer> landmarks",
        );
    }

    Ok(audit)
}

pub struct SeoAnalyzer {
    client: Client,
}

impl SeoAnalyzer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn analyze(&self, target: &TargetDescriptor) -> Result<Payload> {
        let url = target_url(target)?;
        let page = Page::fetch(&self.client, url).await?.require_html()?;
        let audit = audit_html(&page.body)?;

        info!(
            "SEO audit of {}: score {} ({} issues)",
            page.url,
            audit.seo_score,
            audit.weaknesses.len()
        );

        into_payload(&audit)
    }
}

#[async_trait]
impl Analyzer for SeoAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Seo
    }

    async fn invoke(
        &self,
        target: &TargetDescriptor,
        _options: &AnalyzerOptions,
    ) -> std::result::Result<Payload, AnalyzerError> {
        Ok(self.analyze(target).await?)
    }
}
