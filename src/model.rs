//! Data structures describing a match report and the text placements derived from it.
//!
//! [`ReportRecord`] is the validated input handed over by the form/HTTP layer. It
//! deserializes from the flat JSON object that layer produces: every value is a
//! string, dates are `YYYY-MM-DD` and the kick-off time is `HH:MM`.
//!
//! [`Placement`] is the output of the layout resolver. Coordinates are PDF points
//! with the origin in the bottom-left corner of the target page.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Age category of the match. Selects both the template file and its field layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeCategory {
    /// Under 9.
    U9,
    /// Under 11.
    U11,
    /// Under 13.
    U13,
    /// Under 15. The only category with a multi-page template.
    U15,
}

impl AgeCategory {
    /// Every supported category, in ascending age order.
    pub const ALL: [AgeCategory; 4] = [Self::U9, Self::U11, Self::U13, Self::U15];

    /// Returns the canonical tag, e.g. `"U11"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::U9 => "U9",
            Self::U11 => "U11",
            Self::U13 => "U13",
            Self::U15 => "U15",
        }
    }

    /// Returns the template file name for the category, e.g. `referee_template_u11.pdf`.
    pub fn template_file_name(self) -> String {
        format!(
            "referee_template_{}.pdf",
            self.as_str().to_ascii_lowercase()
        )
    }
}

impl fmt::Display for AgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeCategory {
    type Err = UnsupportedCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| UnsupportedCategoryError(value.to_owned()))
    }
}

impl Serialize for AgeCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AgeCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Raised when a category tag outside U9, U11, U13 and U15 is encountered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsupportedCategoryError(pub String);

impl fmt::Display for UnsupportedCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unsupported age category '{}'. Must be U9, U11, U13, or U15",
            self.0
        )
    }
}

impl std::error::Error for UnsupportedCategoryError {}

mod hour_minute {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&value, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A validated match report, as received from the form layer.
///
/// Which optional fields are meaningful depends on [`AgeCategory`]: the second
/// referee only appears on the U11/U13 templates, the officials, competition and
/// stadium fields only on the U15 template. Fields a category does not use are
/// ignored by the layout resolver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    referee_name_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    referee_name_2: Option<String>,
    match_date: NaiveDate,
    #[serde(with = "hour_minute")]
    starting_hour: NaiveTime,
    team_1: String,
    team_2: String,
    age_category: AgeCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    competition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assistant_referee_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assistant_referee_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fourth_official: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stadium_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stadium_locality: Option<String>,
}

impl ReportRecord {
    /// Creates a record holding the fields every category requires.
    pub fn new(
        age_category: AgeCategory,
        referee_name_1: impl Into<String>,
        match_date: NaiveDate,
        starting_hour: NaiveTime,
        team_1: impl Into<String>,
        team_2: impl Into<String>,
    ) -> Self {
        Self {
            referee_name_1: referee_name_1.into(),
            referee_name_2: None,
            match_date,
            starting_hour,
            team_1: team_1.into(),
            team_2: team_2.into(),
            age_category,
            competition: None,
            assistant_referee_1: None,
            assistant_referee_2: None,
            fourth_official: None,
            stadium_name: None,
            stadium_locality: None,
        }
    }

    pub fn age_category(&self) -> AgeCategory {
        self.age_category
    }

    pub fn referee_name_1(&self) -> &str {
        &self.referee_name_1
    }

    pub fn referee_name_2(&self) -> Option<&str> {
        self.referee_name_2.as_deref()
    }

    pub fn match_date(&self) -> NaiveDate {
        self.match_date
    }

    pub fn starting_hour(&self) -> NaiveTime {
        self.starting_hour
    }

    pub fn team_1(&self) -> &str {
        &self.team_1
    }

    pub fn team_2(&self) -> &str {
        &self.team_2
    }

    pub fn competition(&self) -> Option<&str> {
        self.competition.as_deref()
    }

    pub fn assistant_referee_1(&self) -> Option<&str> {
        self.assistant_referee_1.as_deref()
    }

    pub fn assistant_referee_2(&self) -> Option<&str> {
        self.assistant_referee_2.as_deref()
    }

    pub fn fourth_official(&self) -> Option<&str> {
        self.fourth_official.as_deref()
    }

    pub fn stadium_name(&self) -> Option<&str> {
        self.stadium_name.as_deref()
    }

    pub fn stadium_locality(&self) -> Option<&str> {
        self.stadium_locality.as_deref()
    }

    /// Sets the second referee and returns the updated record.
    pub fn with_referee_name_2(mut self, name: impl Into<Option<String>>) -> Self {
        self.referee_name_2 = name.into();
        self
    }

    /// Sets the competition name and returns the updated record.
    pub fn with_competition(mut self, competition: impl Into<Option<String>>) -> Self {
        self.competition = competition.into();
        self
    }

    /// Sets both assistant referees and returns the updated record.
    pub fn with_assistant_referees(
        mut self,
        first: impl Into<Option<String>>,
        second: impl Into<Option<String>>,
    ) -> Self {
        self.assistant_referee_1 = first.into();
        self.assistant_referee_2 = second.into();
        self
    }

    /// Sets the fourth official and returns the updated record.
    pub fn with_fourth_official(mut self, name: impl Into<Option<String>>) -> Self {
        self.fourth_official = name.into();
        self
    }

    /// Sets the stadium name and locality and returns the updated record.
    pub fn with_stadium(
        mut self,
        name: impl Into<Option<String>>,
        locality: impl Into<Option<String>>,
    ) -> Self {
        self.stadium_name = name.into();
        self.stadium_locality = locality.into();
        self
    }
}

/// A single piece of text positioned on one page of a template.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Placement {
    text: String,
    x: f32,
    y: f32,
    page_index: usize,
}

impl Placement {
    /// Creates a placement of `text` at `(x, y)` on the zero-based page `page_index`.
    pub fn new(text: impl Into<String>, x: f32, y: f32, page_index: usize) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            page_index,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Returns whether the placement carries visible text.
    ///
    /// Blank placements stay in the resolved layout but are never drawn.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
