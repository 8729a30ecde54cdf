use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ScrapeError;

/// Root of the JSON document. Keys other than `cartoons` survive a rewrite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub cartoons: Vec<Cartoon>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cartoon {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    pub season_number: u32,
    #[serde(default)]
    pub episodes: Vec<Episode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Season {
    pub fn new(season_number: u32, episodes: Vec<Episode>) -> Self {
        Self {
            season_number,
            episodes,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub number: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub link: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub show_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub season_id: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub episode_id: Option<u32>,
    #[serde(default)]
    pub play_url: Option<String>,
    #[serde(default)]
    pub watch_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Episode {
    /// The (show, season, episode) triple that identifies this episode on the
    /// site. Fails with `MissingField` when any part is absent.
    pub fn key(&self) -> Result<EpisodeKey, ScrapeError> {
        let show_id = self
            .show_id
            .clone()
            .ok_or(ScrapeError::MissingField("show_id"))?;
        let season = self.season_id.ok_or(ScrapeError::MissingField("season_id"))?;
        let episode = self
            .episode_id
            .ok_or(ScrapeError::MissingField("episode_id"))?;
        Ok(EpisodeKey {
            show_id,
            season,
            episode,
        })
    }

    /// Title cut to `max` characters for log lines.
    pub fn short_title(&self, max: usize) -> String {
        self.title.chars().take(max).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EpisodeKey {
    pub show_id: String,
    pub season: u32,
    pub episode: u32,
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S{}E{} (ID: {})",
            self.season, self.episode, self.show_id
        )
    }
}

/// Position of an episode inside a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodePos {
    pub cartoon: usize,
    pub season: usize,
    pub episode: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Num(serde_json::Number),
}

// Scraped text fields are sometimes written out as null.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// Older dumps carry ids as either JSON strings or numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::Str(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(StringOrNumber::Num(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::Str(s)) => s.trim().parse().ok(),
        Some(StringOrNumber::Num(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_episode_accepts_numeric_and_string_ids() {
        let episode: Episode = serde_json::from_value(json!({
            "title": "Gem Glow",
            "show_id": 60306,
            "season_id": "1",
            "episode_id": 2,
        }))
        .unwrap();

        assert_eq!(episode.show_id.as_deref(), Some("60306"));
        assert_eq!(episode.season_id, Some(1));
        assert_eq!(episode.episode_id, Some(2));
        assert_eq!(episode.play_url, None);
        assert_eq!(episode.watch_url, None);
    }

    #[test]
    fn test_key_reports_missing_field() {
        let episode: Episode = serde_json::from_value(json!({
            "title": "Orphan",
            "show_id": "60306",
            "episode_id": 2,
        }))
        .unwrap();

        match episode.key() {
            Err(ScrapeError::MissingField(field)) => assert_eq!(field, "season_id"),
            other => panic!("expected missing season_id, got {:?}", other),
        }
    }

    #[test]
    fn test_key_display() {
        let key = EpisodeKey {
            show_id: "60306".to_string(),
            season: 2,
            episode: 11,
        };
        assert_eq!(key.to_string(), "S2E11 (ID: 60306)");
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let input = json!({
            "cartoons": [{
                "title": "Steven Universe",
                "url": "https://stevenuniverse.best/show/steven-universe",
                "poster": "poster.jpg",
                "seasons": [{
                    "season_number": 1,
                    "url": "https://stevenuniverse.best/show/steven-universe/season-1",
                    "episodes": [{
                        "title": "Gem Glow",
                        "show_id": "60306",
                        "season_id": 1,
                        "episode_id": 1,
                        "air_date": "2013-11-04"
                    }]
                }]
            }],
            "generated_at": "2024-01-01"
        });

        let catalog: Catalog = serde_json::from_value(input).unwrap();
        let output = serde_json::to_value(&catalog).unwrap();

        assert_eq!(output["generated_at"], "2024-01-01");
        assert_eq!(output["cartoons"][0]["poster"], "poster.jpg");
        assert_eq!(
            output["cartoons"][0]["seasons"][0]["url"],
            "https://stevenuniverse.best/show/steven-universe/season-1"
        );
        let episode = &output["cartoons"][0]["seasons"][0]["episodes"][0];
        assert_eq!(episode["air_date"], "2013-11-04");
        assert_eq!(episode["watch_url"], Value::Null);
        assert_eq!(episode["play_url"], Value::Null);
    }

    #[test]
    fn test_loose_records_still_load() {
        let catalog: Catalog = serde_json::from_value(json!({
            "cartoons": [
                {"title": "No Url Show", "seasons": []},
                {
                    "url": "https://stevenuniverse.best/show/untitled",
                    "seasons": [{
                        "season_number": 1,
                        "episodes": [{
                            "title": null,
                            "description": null,
                            "image": null,
                            "show_id": "60306",
                            "season_id": 1,
                            "episode_id": 3
                        }]
                    }]
                }
            ]
        }))
        .unwrap();

        assert_eq!(catalog.cartoons[0].title, "No Url Show");
        assert_eq!(catalog.cartoons[0].url, "");
        assert_eq!(catalog.cartoons[1].title, "");

        let episode = &catalog.cartoons[1].seasons[0].episodes[0];
        assert_eq!(episode.title, "");
        assert_eq!(episode.description, "");
        assert_eq!(episode.image, "");
        assert!(episode.key().is_ok());
    }

    #[test]
    fn test_short_title_respects_char_boundaries() {
        let episode = Episode {
            title: "Élan vital and more".to_string(),
            ..Default::default()
        };
        assert_eq!(episode.short_title(4), "Élan");
    }
}
