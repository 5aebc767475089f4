//! Places lookup over a generative answerer.
//!
//! The answerer is asked for pipe-delimited rows; its reply is free text,
//! so parsing is best effort and line-oriented. Rows that do not carry two
//! readable coordinates are dropped without failing the request.

use std::sync::Arc;

use async_trait::async_trait;
use kiosk_core::{KioskError, Position};
use kiosk_core::answerer::{AnswerRequest, Answerer, Grounding};
use kiosk_core::place::{Category, LookupError, Place, PlacesLookup};
use rand::Rng;

const RATING_RANGE: std::ops::Range<f32> = 4.2..4.9;
const DECORATION: [char; 3] = ['*', '#', '-'];

/// How place ratings are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingPolicy {
    /// Placeholder rating in `[4.2, 4.9)` for display.
    Synthetic,
    /// Leave `rating` unset.
    Omit,
}

pub struct PlacesLookupClient {
    answerer: Arc<dyn Answerer>,
    places_per_lookup: u32,
    ratings: RatingPolicy,
}

impl PlacesLookupClient {
    pub fn new(answerer: Arc<dyn Answerer>) -> Self {
        Self {
            answerer,
            places_per_lookup: 4,
            ratings: RatingPolicy::Synthetic,
        }
    }

    pub fn with_places_per_lookup(mut self, count: u32) -> Self {
        self.places_per_lookup = count;
        self
    }

    pub fn with_ratings(mut self, ratings: RatingPolicy) -> Self {
        self.ratings = ratings;
        self
    }

    fn build_request(&self, category: Category, position: Position) -> AnswerRequest {
        let prompt = format!(
            "Find {} real {} near {}, {}. Format: Name | Address | Lat | Lng",
            self.places_per_lookup,
            category.query_noun(),
            position.lat,
            position.lng
        );
        AnswerRequest::new(prompt).grounded(Grounding::MapsAt(position))
    }

    fn rate(&self, places: &mut [Place]) {
        if self.ratings == RatingPolicy::Omit {
            return;
        }
        let mut rng = rand::thread_rng();
        for place in places {
            place.rating = Some(rng.gen_range(RATING_RANGE));
        }
    }
}

#[async_trait]
impl PlacesLookup for PlacesLookupClient {
    async fn lookup(&self, category: Category, position: Position) -> Result<Vec<Place>, LookupError> {
        let request = self.build_request(category, position);

        let text = match self.answerer.generate(request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(category = %category, "[Places] lookup failed: {}", e);
                return Err(LookupError::Failed(KioskError::lookup(category.slug(), e.to_string())));
            }
        };

        let mut places = parse_places(category, &text);
        if places.is_empty() {
            tracing::warn!(category = %category, "[Places] no parseable rows in response");
            return Err(LookupError::Empty);
        }

        self.rate(&mut places);
        tracing::debug!(category = %category, count = places.len(), "[Places] lookup complete");
        Ok(places)
    }
}

/// Parses `Name | Address | Lat | Lng` rows out of free text.
///
/// Only lines containing `|` are considered; the index in that filtered
/// sequence becomes the batch-local id suffix.
pub fn parse_places(category: Category, text: &str) -> Vec<Place> {
    text.lines()
        .filter(|line| line.contains('|'))
        .enumerate()
        .filter_map(|(index, line)| parse_row(category, index, line))
        .collect()
}

fn parse_row(category: Category, index: usize, line: &str) -> Option<Place> {
    // markdown table rows carry outer pipes
    let row = line.trim().trim_start_matches('|').trim_end_matches('|');
    let fields: Vec<&str> = row.split('|').collect();
    if fields.len() < 4 {
        return None;
    }

    let lat = parse_coordinate(fields[2])?;
    let lng = parse_coordinate(fields[3])?;

    Some(Place {
        id: format!("{}-{}", category.slug(), index),
        name: clean_text(fields[0]),
        address: clean_text(fields[1]),
        coords: Position::new(lat, lng),
        category,
        rating: None,
    })
}

fn clean_text(field: &str) -> String {
    field.trim().replace(DECORATION, "").trim().to_string()
}

/// Reads the leading decimal number of a field, tolerating emphasis marks
/// and trailing units (`**28.61**`, `28.61° N`). A minus attached to the
/// digits is kept; one followed by whitespace is a list bullet.
fn parse_coordinate(field: &str) -> Option<f64> {
    let cleaned = field.trim().replace(['*', '#'], "");
    let mut cleaned = cleaned.trim();
    if let Some(rest) = cleaned.strip_prefix('-').filter(|rest| rest.starts_with(char::is_whitespace)) {
        cleaned = rest.trim_start();
    }

    let end = cleaned
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(cleaned.len());

    cleaned[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    struct ScriptedAnswerer {
        reply: kiosk_core::Result<String>,
        seen: Mutex<Vec<AnswerRequest>>,
    }

    impl ScriptedAnswerer {
        fn new(reply: kiosk_core::Result<String>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Answerer for ScriptedAnswerer {
        async fn generate(&self, request: AnswerRequest) -> kiosk_core::Result<String> {
            self.seen.lock().await.push(request);
            self.reply.clone()
        }
    }

    #[test]
    fn test_parse_single_row() {
        let places = parse_places(Category::Medical, "City Hospital | 12 MG Road | 28.61 | 77.20");

        assert_eq!(places.len(), 1);
        let place = &places[0];
        assert_eq!(place.id, "medical-0");
        assert_eq!(place.name, "City Hospital");
        assert_eq!(place.address, "12 MG Road");
        assert_eq!(place.coords, Position::new(28.61, 77.20));
        assert_eq!(place.category, Category::Medical);
    }

    #[test]
    fn test_parse_skips_garbage_lines() {
        let text = "Here are some options:\n\
                    Bad Line\n\
                    Kotwali | Chandni Chowk | north | east\n\
                    Parliament Street PS | Sansad Marg | 28.6219 | 77.2100\n\
                    Only | Two";

        let places = parse_places(Category::Police, text);

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Parliament Street PS");
        // index counts pipe lines, so the rejected Kotwali row consumed 0
        assert_eq!(places[0].id, "police-1");
    }

    #[test]
    fn test_parse_strips_markdown_decoration() {
        let text = "- **Haldiram's** | # Chandni Chowk | **28.6506** | 77.2303";
        let places = parse_places(Category::Restaurant, text);

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Haldiram's");
        assert_eq!(places[0].address, "Chandni Chowk");
        assert_eq!(places[0].coords.lat, 28.6506);
    }

    #[test]
    fn test_parse_markdown_table_row() {
        let text = "| Name | Address | Lat | Lng |\n\
                    |---|---|---|---|\n\
                    | AIIMS | Ansari Nagar | 28.5672 | 77.2100 |";
        let places = parse_places(Category::Medical, text);

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "AIIMS");
        assert_eq!(places[0].id, "medical-2");
    }

    #[test]
    fn test_parse_bulleted_coordinates() {
        let places = parse_places(Category::Police, "- Kamla Market PS | Ajmeri Gate | - 28.6418 | - 77.2262");
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Kamla Market PS");
        assert_eq!(places[0].coords, Position::new(28.6418, 77.2262));
    }

    #[test]
    fn test_parse_keeps_negative_coordinates() {
        let places = parse_places(Category::Medical, "St Vincent's | Darlinghurst | -33.8808 | 151.2205");
        assert_eq!(places[0].coords, Position::new(-33.8808, 151.2205));
    }

    #[test]
    fn test_parse_coordinate_with_units() {
        assert_eq!(parse_coordinate(" 28.6139° N"), Some(28.6139));
        assert_eq!(parse_coordinate("NaN"), None);
        assert_eq!(parse_coordinate("- 28.6"), Some(28.6));
        assert_eq!(parse_coordinate("-28.6"), Some(-28.6));
        assert_eq!(parse_coordinate("- "), None);
        assert_eq!(parse_coordinate(""), None);
    }

    #[tokio::test]
    async fn test_lookup_builds_grounded_request() {
        let answerer = ScriptedAnswerer::new(Ok("A | B | 1.0 | 2.0".to_string()));
        let client = PlacesLookupClient::new(answerer.clone());
        let position = Position::new(28.6415, 77.2197);

        client.lookup(Category::Police, position).await.unwrap();

        let seen = answerer.seen.lock().await;
        assert_eq!(
            seen[0].contents,
            "Find 4 real police stations near 28.6415, 77.2197. Format: Name | Address | Lat | Lng"
        );
        assert_eq!(seen[0].grounding, Grounding::MapsAt(position));
    }

    #[tokio::test]
    async fn test_lookup_assigns_synthetic_ratings() {
        let answerer = ScriptedAnswerer::new(Ok("A | B | 1.0 | 2.0\nC | D | 3.0 | 4.0".to_string()));
        let client = PlacesLookupClient::new(answerer);

        let places = client.lookup(Category::Restaurant, Position::new(0.0, 0.0)).await.unwrap();

        for place in places {
            let rating = place.rating.unwrap();
            assert!((4.2..4.9).contains(&rating));
        }
    }

    #[tokio::test]
    async fn test_lookup_can_omit_ratings() {
        let answerer = ScriptedAnswerer::new(Ok("A | B | 1.0 | 2.0".to_string()));
        let client = PlacesLookupClient::new(answerer).with_ratings(RatingPolicy::Omit);

        let places = client.lookup(Category::Medical, Position::new(0.0, 0.0)).await.unwrap();
        assert!(places[0].rating.is_none());
    }

    #[tokio::test]
    async fn test_lookup_empty_response_is_empty_error() {
        let answerer = ScriptedAnswerer::new(Ok("Sorry, I could not find anything.".to_string()));
        let client = PlacesLookupClient::new(answerer);

        let result = client.lookup(Category::Medical, Position::new(0.0, 0.0)).await;
        assert!(matches!(result, Err(LookupError::Empty)));
    }

    #[tokio::test]
    async fn test_lookup_transport_failure_is_contained() {
        let answerer = ScriptedAnswerer::new(Err(KioskError::answerer("connection reset")));
        let client = PlacesLookupClient::new(answerer);

        let result = client.lookup(Category::Police, Position::new(0.0, 0.0)).await;
        match result {
            Err(LookupError::Failed(KioskError::Lookup { context, message })) => {
                assert_eq!(context, "police");
                assert!(message.contains("connection reset"));
            }
            other => panic!("expected lookup failure, got {other:?}"),
        }
    }
}
