use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder the lookup API uses for absent values
const NOT_AVAILABLE: &str = "N/A";

/// Kind of catalogue entry, also used as the search content-type filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
    Episode,
}

impl MediaType {
    /// Filter choices in display order; `None` means "All"
    pub const FILTERS: [Option<MediaType>; 4] = [
        None,
        Some(MediaType::Movie),
        Some(MediaType::Series),
        Some(MediaType::Episode),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
            MediaType::Episode => "episode",
        }
    }

    /// Capitalized label for filter controls
    pub fn label(&self) -> &'static str {
        match self {
            MediaType::Movie => "Movie",
            MediaType::Series => "Series",
            MediaType::Episode => "Episode",
        }
    }

    /// Plural category name used in "More ..." headings
    pub fn category(&self) -> &'static str {
        match self {
            MediaType::Movie => "Movies",
            MediaType::Series => "Series",
            MediaType::Episode => "Episodes",
        }
    }

    pub fn filter_label(filter: Option<MediaType>) -> &'static str {
        filter.map_or("All", |t| t.label())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "movie" => Ok(MediaType::Movie),
            "series" => Ok(MediaType::Series),
            "episode" => Ok(MediaType::Episode),
            other => Err(format!("Unknown media type: {other}")),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Length of the plot text requested from the lookup API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionSize {
    #[default]
    Short,
    Full,
}

impl DescriptionSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptionSize::Short => "short",
            DescriptionSize::Full => "full",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Full record returned by a lookup by identifier or title
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaRecord {
    pub title: Option<String>,
    pub year: Option<String>,
    pub rated: Option<String>,
    pub released: Option<String>,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub writer: Option<String>,
    pub actors: Option<String>,
    pub plot: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub awards: Option<String>,
    pub poster: Option<String>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    pub metascore: Option<String>,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes")]
    pub imdb_votes: Option<String>,
    // In-band failures carry no identifier
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Type", default, deserialize_with = "lenient_media_type")]
    pub media_type: Option<MediaType>,
    #[serde(rename = "DVD")]
    pub dvd: Option<String>,
    pub box_office: Option<String>,
    pub production: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "totalSeasons")]
    pub total_seasons: Option<String>,
    #[serde(default = "default_response")]
    pub response: String,
    pub error: Option<String>,
}

impl MediaRecord {
    /// False when the API reported an in-band failure such as "Movie not found!"
    pub fn is_success(&self) -> bool {
        self.response == "True"
    }

    pub fn genres(&self) -> Vec<&str> {
        self.genre
            .as_deref()
            .map(|g| g.split(", ").collect())
            .unwrap_or_default()
    }

    pub fn poster_url(&self) -> Option<&str> {
        available(self.poster.as_deref())
    }

    /// Route of the detail view for this record
    pub fn detail_path(&self) -> String {
        detail_path(&self.imdb_id)
    }
}

/// One entry of a search result page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSummary {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Type", default, deserialize_with = "lenient_media_type")]
    pub media_type: Option<MediaType>,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
}

impl MediaSummary {
    pub fn poster_url(&self) -> Option<&str> {
        available(self.poster.as_deref())
    }

    /// Route of the detail view for this entry
    pub fn detail_path(&self) -> String {
        detail_path(&self.imdb_id)
    }
}

/// Card shown in home rows, search grids and related titles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaCard {
    pub id: String,
    pub title: Option<String>,
    pub year: Option<String>,
    pub media_type: Option<MediaType>,
    /// None when the lookup API has no poster
    pub poster: Option<String>,
    pub path: String,
}

impl From<&MediaSummary> for MediaCard {
    fn from(summary: &MediaSummary) -> Self {
        Self {
            id: summary.imdb_id.clone(),
            title: summary.title.clone(),
            year: summary.year.clone(),
            media_type: summary.media_type,
            poster: summary.poster_url().map(str::to_string),
            path: summary.detail_path(),
        }
    }
}

impl From<&MediaRecord> for MediaCard {
    fn from(record: &MediaRecord) -> Self {
        Self {
            id: record.imdb_id.clone(),
            title: record.title.clone(),
            year: record.year.clone(),
            media_type: record.media_type,
            poster: record.poster_url().map(str::to_string),
            path: record.detail_path(),
        }
    }
}

/// Content of a detail page; "N/A" placeholders are dropped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaDetails {
    pub id: String,
    pub title: Option<String>,
    pub year: Option<String>,
    pub media_type: Option<MediaType>,
    pub poster: Option<String>,
    pub genres: Vec<String>,
    pub plot: Option<String>,
    pub runtime: Option<String>,
    pub rated: Option<String>,
    pub released: Option<String>,
    pub director: Option<String>,
    pub writer: Option<String>,
    pub actors: Option<String>,
    pub imdb_rating: Option<String>,
    pub ratings: Vec<Rating>,
    pub total_seasons: Option<String>,
}

impl From<&MediaRecord> for MediaDetails {
    fn from(record: &MediaRecord) -> Self {
        let text = |value: &Option<String>| available(value.as_deref()).map(str::to_string);
        Self {
            id: record.imdb_id.clone(),
            title: record.title.clone(),
            year: text(&record.year),
            media_type: record.media_type,
            poster: record.poster_url().map(str::to_string),
            genres: record
                .genres()
                .into_iter()
                .filter(|genre| available(Some(*genre)).is_some())
                .map(str::to_string)
                .collect(),
            plot: text(&record.plot),
            runtime: text(&record.runtime),
            rated: text(&record.rated),
            released: text(&record.released),
            director: text(&record.director),
            writer: text(&record.writer),
            actors: text(&record.actors),
            imdb_rating: text(&record.imdb_rating),
            ratings: record.ratings.clone(),
            total_seasons: text(&record.total_seasons),
        }
    }
}

/// Raw search answer from the lookup API
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "Search", default)]
    pub items: Vec<MediaSummary>,
    #[serde(rename = "totalResults")]
    pub total_results: Option<String>,
    #[serde(rename = "Response", default = "default_response")]
    pub response: String,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn is_success(&self) -> bool {
        self.response == "True"
    }

    /// Parsed result count; missing or non-numeric values count as zero
    pub fn total_result_count(&self) -> u64 {
        self.total_results
            .as_deref()
            .and_then(|t| t.trim().parse::<u64>().ok())
            .unwrap_or(0)
    }
}

fn default_response() -> String {
    "False".to_string()
}

// The API also knows types such as "game"; those decode as untyped entries
fn lenient_media_type<'de, D>(deserializer: D) -> Result<Option<MediaType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.parse().ok()))
}

fn detail_path(id: &str) -> String {
    format!("/media/{id}")
}

fn available(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != NOT_AVAILABLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_media_record() {
        let json = r#"{
            "Title": "The Dark Knight",
            "Year": "2008",
            "Genre": "Action, Crime, Drama",
            "Poster": "https://example.com/poster.jpg",
            "Ratings": [{"Source": "Internet Movie Database", "Value": "9.0/10"}],
            "imdbRating": "9.0",
            "imdbID": "tt0468569",
            "Type": "movie",
            "DVD": "09 Dec 2008",
            "BoxOffice": "$534,858,444",
            "Response": "True"
        }"#;

        let record: MediaRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_success());
        assert_eq!(record.title.as_deref(), Some("The Dark Knight"));
        assert_eq!(record.imdb_id, "tt0468569");
        assert_eq!(record.media_type, Some(MediaType::Movie));
        assert_eq!(record.genres(), vec!["Action", "Crime", "Drama"]);
        assert_eq!(record.ratings[0].value, "9.0/10");
        assert_eq!(record.box_office.as_deref(), Some("$534,858,444"));
        assert_eq!(record.dvd.as_deref(), Some("09 Dec 2008"));
    }

    #[test]
    fn test_decode_in_band_failure() {
        let json = r#"{"Response": "False", "Error": "Movie not found!"}"#;
        let record: MediaRecord = serde_json::from_str(json).unwrap();
        assert!(!record.is_success());
        assert_eq!(record.error.as_deref(), Some("Movie not found!"));
        assert!(record.imdb_id.is_empty());
    }

    #[test]
    fn test_poster_placeholder_is_absent() {
        let summary = MediaSummary {
            imdb_id: "tt1".to_string(),
            title: None,
            year: None,
            media_type: None,
            poster: Some("N/A".to_string()),
        };
        assert_eq!(summary.poster_url(), None);
        assert_eq!(summary.detail_path(), "/media/tt1");
    }

    #[test]
    fn test_card_hides_poster_placeholder() {
        let summary = MediaSummary {
            imdb_id: "tt0468569".to_string(),
            title: Some("The Dark Knight".to_string()),
            year: Some("2008".to_string()),
            media_type: Some(MediaType::Movie),
            poster: Some("N/A".to_string()),
        };

        let card = MediaCard::from(&summary);
        assert_eq!(card.poster, None);
        assert_eq!(card.path, "/media/tt0468569");

        let json = serde_json::to_string(&card).unwrap();
        assert!(!json.contains("N/A"), "{json}");
    }

    #[test]
    fn test_details_split_genres_and_drop_placeholders() {
        let record = MediaRecord {
            imdb_id: "tt0468569".to_string(),
            title: Some("The Dark Knight".to_string()),
            genre: Some("Action, Crime, Drama".to_string()),
            poster: Some("N/A".to_string()),
            director: Some("Christopher Nolan".to_string()),
            writer: Some("N/A".to_string()),
            response: "True".to_string(),
            ..Default::default()
        };

        let details = MediaDetails::from(&record);
        assert_eq!(details.genres, vec!["Action", "Crime", "Drama"]);
        assert_eq!(details.poster, None);
        assert_eq!(details.writer, None);
        assert_eq!(details.director.as_deref(), Some("Christopher Nolan"));

        let no_genre = MediaDetails::from(&MediaRecord {
            genre: Some("N/A".to_string()),
            ..record
        });
        assert!(no_genre.genres.is_empty());
    }

    #[test]
    fn test_total_result_count_parsing() {
        let mut response = SearchResponse {
            total_results: Some("25".to_string()),
            response: "True".to_string(),
            ..Default::default()
        };
        assert_eq!(response.total_result_count(), 25);

        response.total_results = Some("lots".to_string());
        assert_eq!(response.total_result_count(), 0);

        response.total_results = None;
        assert_eq!(response.total_result_count(), 0);
    }

    #[test]
    fn test_missing_search_list_is_empty() {
        let json = r#"{"Response": "False", "Error": "No results found!"}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(!response.is_success());
        assert!(response.items.is_empty());
    }

    #[test]
    fn test_unknown_type_decodes_as_untyped() {
        let json = r#"{"imdbID": "tt9", "Title": "Batman: Arkham", "Type": "game"}"#;
        let summary: MediaSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.media_type, None);
        assert_eq!(summary.title.as_deref(), Some("Batman: Arkham"));
    }

    #[test]
    fn test_filter_labels() {
        let labels: Vec<_> = MediaType::FILTERS
            .iter()
            .map(|f| MediaType::filter_label(*f))
            .collect();
        assert_eq!(labels, vec!["All", "Movie", "Series", "Episode"]);
    }
}
