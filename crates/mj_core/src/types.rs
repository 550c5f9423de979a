use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Image slots an article record can carry (`imageUrl` .. `imageUrl6`).
pub const MAX_IMAGES: usize = 6;

/// Length of an excerpt derived from the article body.
pub const EXCERPT_CHARS: usize = 150;

/// Parse the date strings found in the store: RFC 3339, a naive
/// `YYYY-MM-DDTHH:MM[:SS]` (read as UTC) or a bare `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RubricType {
    Recipes,
    Interesting,
    Jokes,
}

/// Static presentation metadata of a rubric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RubricTypeInfo {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub description: &'static str,
}

impl RubricType {
    pub const ALL: [RubricType; 3] = [RubricType::Recipes, RubricType::Interesting, RubricType::Jokes];

    pub fn id(&self) -> &'static str {
        match self {
            RubricType::Recipes => "recipes",
            RubricType::Interesting => "interesting",
            RubricType::Jokes => "jokes",
        }
    }

    pub fn info(&self) -> RubricTypeInfo {
        match self {
            RubricType::Recipes => RubricTypeInfo {
                name: "🍽️ Рецепти",
                icon: "🍽️",
                color: "#FF6B6B",
                description: "Вкусни рецепти и кулинарни съвети",
            },
            RubricType::Interesting => RubricTypeInfo {
                name: "🔍 Интересно",
                icon: "🔍",
                color: "#4ECDC4",
                description: "Любопитни факти и истории",
            },
            RubricType::Jokes => RubricTypeInfo {
                name: "😂 Шеги",
                icon: "😂",
                color: "#FFD166",
                description: "Смешни вицове и анекдоти",
            },
        }
    }
}

impl fmt::Display for RubricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for RubricType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "recipes" => Ok(RubricType::Recipes),
            "interesting" => Ok(RubricType::Interesting),
            "jokes" => Ok(RubricType::Jokes),
            _ => Err(crate::Error::validation("Невалиден тип рубрика")),
        }
    }
}

/// Article taxonomy. Values the site does not know are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    News,
    Interview,
    Opinion,
    Culture,
    Rubric(RubricType),
    Other(String),
}

impl Category {
    pub fn id(&self) -> &str {
        match self {
            Category::News => "news",
            Category::Interview => "interview",
            Category::Opinion => "opinion",
            Category::Culture => "culture",
            Category::Rubric(rubric) => rubric.id(),
            Category::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Category::News => "Новини",
            Category::Interview => "Интервю",
            Category::Opinion => "Мнение",
            Category::Culture => "Култура",
            Category::Rubric(rubric) => rubric.info().name,
            Category::Other(raw) => raw,
        }
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "news" => Category::News,
            "interview" => Category::Interview,
            "opinion" => Category::Opinion,
            "culture" => Category::Culture,
            other => match other.parse::<RubricType>() {
                Ok(rubric) => Category::Rubric(rubric),
                Err(_) => Category::Other(raw),
            },
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.id().to_string()
    }
}

/// An article as it is laid out in the `articles` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, rename = "imageUrl2", skip_serializing_if = "Option::is_none")]
    pub image_url2: Option<String>,
    #[serde(default, rename = "imageUrl3", skip_serializing_if = "Option::is_none")]
    pub image_url3: Option<String>,
    #[serde(default, rename = "imageUrl4", skip_serializing_if = "Option::is_none")]
    pub image_url4: Option<String>,
    #[serde(default, rename = "imageUrl5", skip_serializing_if = "Option::is_none")]
    pub image_url5: Option<String>,
    #[serde(default, rename = "imageUrl6", skip_serializing_if = "Option::is_none")]
    pub image_url6: Option<String>,
}

impl ArticleRecord {
    fn image_slots(&self) -> [&Option<String>; MAX_IMAGES] {
        [
            &self.image_url,
            &self.image_url2,
            &self.image_url3,
            &self.image_url4,
            &self.image_url5,
            &self.image_url6,
        ]
    }

    fn set_images(&mut self, images: &[String]) {
        let mut images = images.iter().filter(|url| !url.trim().is_empty()).cloned();
        self.image_url = images.next();
        self.image_url2 = images.next();
        self.image_url3 = images.next();
        self.image_url4 = images.next();
        self.image_url5 = images.next();
        self.image_url6 = images.next();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub author: String,
    pub category: Category,
    /// Rubric tag kept by older records next to their category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<RubricType>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub date: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Article {
    pub fn from_record(id: impl Into<String>, record: ArticleRecord) -> Self {
        let images = record
            .image_slots()
            .iter()
            .filter_map(|slot| slot.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();
        let rubric = record.rubric.as_deref().and_then(|r| r.parse().ok());
        let category = match (record.category, rubric) {
            (Some(category), _) if !category.trim().is_empty() => Category::from(category),
            (_, Some(rubric)) => Category::Rubric(rubric),
            _ => Category::Other(String::new()),
        };

        Self {
            id: id.into(),
            title: record.title,
            author: record.author,
            category,
            rubric,
            content: record.content,
            excerpt: record.excerpt.filter(|e| !e.trim().is_empty()),
            date: record.date,
            images,
        }
    }

    pub fn to_record(&self) -> ArticleRecord {
        let mut record = ArticleRecord {
            title: self.title.clone(),
            author: self.author.clone(),
            content: self.content.clone(),
            excerpt: self.excerpt.clone(),
            date: self.date.clone(),
            category: Some(self.category.id().to_string()),
            rubric: self.rubric.map(|r| r.id().to_string()),
            ..ArticleRecord::default()
        };
        record.set_images(&self.images);
        record
    }

    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// The stored excerpt, or the head of the body when none was written.
    pub fn excerpt(&self) -> Cow<'_, str> {
        match &self.excerpt {
            Some(excerpt) => Cow::Borrowed(excerpt),
            None => truncate_chars(&self.content, EXCERPT_CHARS),
        }
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_date(&self.date)
    }

    /// Millisecond sort key; unparsable dates order as the oldest.
    pub fn sort_key(&self) -> i64 {
        self.published_at()
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(i64::MIN)
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n').map(str::trim).filter(|p| !p.is_empty())
    }

    pub fn in_rubric(&self, rubric: RubricType) -> bool {
        self.category == Category::Rubric(rubric) || self.rubric == Some(rubric)
    }
}

/// Cut `text` to `limit` characters, appending `...` when anything was cut.
pub fn truncate_chars(text: &str, limit: usize) -> Cow<'_, str> {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => Cow::Owned(format!("{}...", &text[..byte_idx])),
        None => Cow::Borrowed(text),
    }
}

fn published_default() -> bool {
    true
}

fn is_blank(id: &str) -> bool {
    id.is_empty()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rubric {
    #[serde(default, skip_serializing_if = "is_blank")]
    pub id: String,
    #[serde(rename = "type")]
    pub rubric_type: RubricType,
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Comma separated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default = "published_default")]
    pub published: bool,
}

impl Rubric {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_date(&self.date)
    }

    pub fn sort_key(&self) -> i64 {
        self.published_at()
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(i64::MIN)
    }

    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|tags| tags.split(',').map(str::trim).filter(|t| !t.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Where an event sits relative to "now" on the public timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventProximity {
    Past,
    Today,
    Soon,
    Future,
}

impl EventProximity {
    pub fn css_class(&self) -> &'static str {
        match self {
            EventProximity::Past => "past",
            EventProximity::Today => "today",
            EventProximity::Soon => "soon",
            EventProximity::Future => "future",
        }
    }
}

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "is_blank")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    /// Epoch milliseconds of the event start.
    pub timestamp: i64,
    #[serde(default)]
    pub created: i64,
}

impl Event {
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.timestamp >= now.timestamp_millis()
    }

    pub fn proximity(&self, now: DateTime<Utc>) -> EventProximity {
        let Some(starts_at) = self.starts_at() else {
            return EventProximity::Past;
        };
        if starts_at.date_naive() == now.date_naive() {
            return EventProximity::Today;
        }
        let delta = self.timestamp - now.timestamp_millis();
        if delta < 0 {
            return EventProximity::Past;
        }
        // whole days, rounded up
        let days_until = (delta + DAY_MS - 1) / DAY_MS;
        if days_until <= 3 {
            EventProximity::Soon
        } else {
            EventProximity::Future
        }
    }
}

pub const APPLICATION_STATUS_NEW: &str = "new";

/// A membership form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(default, skip_serializing_if = "is_blank")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(default)]
    pub message: String,
    pub timestamp: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_date_formats() {
        let full = parse_date("2024-03-01T10:15:00.000Z").unwrap();
        assert_eq!(full.to_rfc3339(), "2024-03-01T10:15:00+00:00");

        let bare = parse_date("2024-01-01").unwrap();
        assert_eq!(bare.timestamp_millis(), 1_704_067_200_000);

        assert!(parse_date("2024-02-01T08:30").is_some());
        assert!(parse_date("вчера").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_article_from_record_collects_images() {
        let record: ArticleRecord = serde_json::from_value(json!({
            "title": "Училищен бал",
            "author": "Иван",
            "content": "Първи абзац\n\nВтори абзац",
            "date": "2024-05-20T12:00:00Z",
            "category": "news",
            "imageUrl": "https://img/1.jpg",
            "imageUrl2": "  ",
            "imageUrl3": "https://img/3.jpg"
        }))
        .unwrap();

        let article = Article::from_record("-k1", record);
        assert_eq!(article.id, "-k1");
        assert_eq!(article.category, Category::News);
        assert_eq!(article.images, vec!["https://img/1.jpg", "https://img/3.jpg"]);
        assert_eq!(article.primary_image(), Some("https://img/1.jpg"));
        assert_eq!(article.paragraphs().collect::<Vec<_>>(), vec!["Първи абзац", "Втори абзац"]);
    }

    #[test]
    fn test_article_record_round_trip_keeps_wire_names() {
        let article = Article {
            id: "-k2".into(),
            title: "Интервю с директора".into(),
            author: "Мария".into(),
            category: Category::Interview,
            rubric: None,
            content: "Текст".into(),
            excerpt: None,
            date: "2024-01-01".into(),
            images: vec!["a.jpg".into(), "b.jpg".into()],
        };

        let value = serde_json::to_value(article.to_record()).unwrap();
        assert_eq!(value["category"], "interview");
        assert_eq!(value["imageUrl"], "a.jpg");
        assert_eq!(value["imageUrl2"], "b.jpg");
        assert!(value.get("imageUrl3").is_none());
        assert!(value.get("excerpt").is_none());
    }

    #[test]
    fn test_unknown_category_is_kept_verbatim() {
        let category = Category::from("sport".to_string());
        assert_eq!(category, Category::Other("sport".into()));
        assert_eq!(category.label(), "sport");
        assert_eq!(Category::from("culture".to_string()).label(), "Култура");
        assert_eq!(
            Category::from("recipes".to_string()),
            Category::Rubric(RubricType::Recipes)
        );
    }

    #[test]
    fn test_legacy_rubric_field() {
        let record = ArticleRecord {
            title: "Баница".into(),
            rubric: Some("recipes".into()),
            ..ArticleRecord::default()
        };
        let article = Article::from_record("-r", record);
        assert!(article.in_rubric(RubricType::Recipes));
        assert!(!article.in_rubric(RubricType::Jokes));
    }

    #[test]
    fn test_derived_excerpt() {
        let long = "а".repeat(200);
        let mut article = Article::from_record(
            "-e",
            ArticleRecord {
                content: long,
                ..ArticleRecord::default()
            },
        );
        let excerpt = article.excerpt();
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS + 3);
        assert!(excerpt.ends_with("..."));

        article.content = "Кратко".into();
        assert_eq!(article.excerpt(), "Кратко");

        article.excerpt = Some("Ръчно резюме".into());
        assert_eq!(article.excerpt(), "Ръчно резюме");
    }

    #[test]
    fn test_invalid_date_sorts_oldest() {
        let article = Article::from_record(
            "-d",
            ArticleRecord {
                date: "not a date".into(),
                ..ArticleRecord::default()
            },
        );
        assert_eq!(article.sort_key(), i64::MIN);
    }

    #[test]
    fn test_rubric_wire_format() {
        let rubric: Rubric = serde_json::from_value(json!({
            "type": "jokes",
            "title": "Виц",
            "content": "Учителят пита...",
            "author": "Петър",
            "date": "2024-04-01T09:00:00Z",
            "tags": "училище, смях, ,учители, още"
        }))
        .unwrap();
        assert!(rubric.published);
        assert_eq!(rubric.rubric_type, RubricType::Jokes);
        assert_eq!(rubric.tag_list(), vec!["училище", "смях", "учители", "още"]);

        let value = serde_json::to_value(&rubric).unwrap();
        assert_eq!(value["type"], "jokes");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_event_proximity() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
        let at = |y: i32, m: u32, d: u32, h: u32| Event {
            id: String::new(),
            title: "Събиране".into(),
            description: None,
            location: "Кабинет 203".into(),
            organizer: None,
            timestamp: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().timestamp_millis(),
            created: 0,
        };

        assert_eq!(at(2024, 6, 10, 15).proximity(now), EventProximity::Today);
        assert_eq!(at(2024, 6, 12, 15).proximity(now), EventProximity::Soon);
        assert_eq!(at(2024, 6, 20, 15).proximity(now), EventProximity::Future);
        assert_eq!(at(2024, 6, 1, 15).proximity(now), EventProximity::Past);
        assert!(at(2024, 6, 10, 15).is_upcoming(now));
        assert!(!at(2024, 6, 1, 15).is_upcoming(now));
    }

    #[test]
    fn test_application_uses_class_field() {
        let application = Application {
            id: String::new(),
            name: "Ани".into(),
            email: "ani@example.com".into(),
            class_name: "10б".into(),
            message: String::new(),
            timestamp: "2024-09-15T10:00:00Z".into(),
            status: APPLICATION_STATUS_NEW.into(),
        };
        let value = serde_json::to_value(&application).unwrap();
        assert_eq!(value["class"], "10б");
        assert_eq!(value["status"], "new");
    }
}
