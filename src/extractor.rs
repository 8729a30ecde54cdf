use anyhow::Result;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Scans iframes, scripts and anchors in document order and returns the first
/// `src` / script body / `href` that mentions `marker`.
///
/// `&amp;` is unescaped in the returned value; script bodies are raw text so
/// the HTML parser leaves entities in them untouched.
pub fn find_watch_url(html: &str, marker: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("iframe, script, a").ok()?;

    document
        .select(&selector)
        .filter_map(|element| candidate_value(&element))
        .find(|value| value.contains(marker))
        .map(|value| value.replace("&amp;", "&"))
}

fn candidate_value(element: &ElementRef) -> Option<String> {
    match element.value().name() {
        "iframe" => element.value().attr("src").map(str::to_string),
        "script" => {
            let text = element.text().collect::<String>();
            if text.is_empty() { None } else { Some(text) }
        }
        "a" => element.value().attr("href").map(str::to_string),
        _ => None,
    }
}

/// What the show page exposes about its TMDb entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowPage {
    pub api_key: Option<String>,
    pub tmdb_id: Option<String>,
    pub season_numbers: Vec<u32>,
}

#[derive(Debug)]
pub struct ShowPageParser {
    api_key_pattern: Regex,
    id_pattern: Regex,
    season_option: Selector,
}

impl ShowPageParser {
    pub fn new() -> Result<Self> {
        let api_key_pattern = Regex::new(r#"const apiKey = ["']([^"']+)["']"#)?;
        let id_pattern = Regex::new(r#"const id = ["']?(\d+)["']?"#)?;
        let season_option = Selector::parse("#season-select option")
            .map_err(|e| anyhow::anyhow!("Invalid season selector: {}", e))?;

        Ok(Self {
            api_key_pattern,
            id_pattern,
            season_option,
        })
    }

    pub fn parse(&self, html: &str) -> ShowPage {
        let api_key = self
            .api_key_pattern
            .captures(html)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string());

        let tmdb_id = self
            .id_pattern
            .captures(html)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string());

        let document = Html::parse_document(html);
        // First occurrence wins when a season is listed twice.
        let mut season_numbers: Vec<u32> = Vec::new();
        for number in document
            .select(&self.season_option)
            .filter_map(|option| option.value().attr("value"))
            .filter_map(|value| value.trim().parse::<u32>().ok())
        {
            if !season_numbers.contains(&number) {
                season_numbers.push(number);
            }
        }

        ShowPage {
            api_key,
            tmdb_id,
            season_numbers,
        }
    }
}
