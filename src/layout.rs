//! Per-category field layouts for the referee report templates.
//!
//! Each template revision has one table of [`Slot`]s: which record field goes
//! where, on which page. The coordinates are measured against the printed
//! templates and are not derived from anything; changing a template means
//! changing its table. [`resolve`] turns a [`ReportRecord`] into the concrete
//! list of [`Placement`]s by looking the table up and filling in the text.

use log::debug;

use crate::format::{fixture_line, format_date};
use crate::model::{AgeCategory, Placement, ReportRecord};

/// Fixed county printed next to each official on the U15 delegation sheet.
pub const OFFICIALS_COUNTY: &str = "Ilfov";

/// The source of a slot's text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Referee1,
    Referee2,
    AssistantReferee1,
    AssistantReferee2,
    FourthOfficial,
    /// Match date, formatted for the record's category.
    MatchDate,
    /// Kick-off time as `HH:MM`.
    StartingHour,
    /// `"{team_1} - {team_2}"`.
    Fixture,
    Team1,
    Team2,
    Competition,
    StadiumName,
    StadiumLocality,
    /// Text printed verbatim regardless of the record.
    Literal(&'static str),
}

impl Field {
    /// Resolves the text of this field for `record`. Missing optional values become `""`.
    pub fn text(self, record: &ReportRecord) -> String {
        let optional = |value: Option<&str>| value.unwrap_or_default().to_owned();

        match self {
            Self::Referee1 => record.referee_name_1().to_owned(),
            Self::Referee2 => optional(record.referee_name_2()),
            Self::AssistantReferee1 => optional(record.assistant_referee_1()),
            Self::AssistantReferee2 => optional(record.assistant_referee_2()),
            Self::FourthOfficial => optional(record.fourth_official()),
            Self::MatchDate => format_date(record.match_date(), record.age_category()),
            Self::StartingHour => record.starting_hour().format("%H:%M").to_string(),
            Self::Fixture => fixture_line(record.team_1(), record.team_2()),
            Self::Team1 => record.team_1().to_owned(),
            Self::Team2 => record.team_2().to_owned(),
            Self::Competition => optional(record.competition()),
            Self::StadiumName => optional(record.stadium_name()),
            Self::StadiumLocality => optional(record.stadium_locality()),
            Self::Literal(text) => text.to_owned(),
        }
    }
}

/// One entry of a template layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slot {
    pub field: Field,
    pub x: f32,
    pub y: f32,
    pub page: usize,
}

const fn slot(field: Field, x: f32, y: f32, page: usize) -> Slot {
    Slot { field, x, y, page }
}

const U9_LAYOUT: &[Slot] = &[
    slot(Field::Referee1, 101.0, 687.0, 0),
    slot(Field::MatchDate, 337.0, 686.0, 0),
    slot(Field::Fixture, 101.0, 712.0, 0),
    slot(Field::Team1, 101.0, 636.0, 0),
    slot(Field::Team2, 355.0, 636.0, 0),
];

// U11 and U13 share one template design.
const U11_U13_LAYOUT: &[Slot] = &[
    slot(Field::Referee1, 101.0, 687.0, 0),
    slot(Field::Referee2, 101.0, 662.0, 0),
    slot(Field::MatchDate, 346.0, 686.0, 0),
    slot(Field::StartingHour, 335.0, 660.0, 0),
    slot(Field::Fixture, 101.0, 712.0, 0),
    slot(Field::Team1, 101.0, 636.0, 0),
    slot(Field::Team2, 355.0, 636.0, 0),
];

const U15_LAYOUT: &[Slot] = &[
    slot(Field::Referee1, 163.0, 353.0, 0),
    slot(Field::AssistantReferee1, 163.0, 338.0, 0),
    slot(Field::AssistantReferee2, 163.0, 321.0, 0),
    slot(Field::FourthOfficial, 163.0, 305.0, 0),
    slot(Field::MatchDate, 390.0, 425.0, 0),
    slot(Field::StartingHour, 510.0, 425.0, 0),
    slot(Field::Fixture, 110.0, 515.0, 0),
    slot(Field::Competition, 110.0, 453.0, 0),
    slot(Field::StadiumName, 150.0, 399.0, 0),
    slot(Field::StadiumLocality, 163.0, 426.0, 0),
    // Match sheet signature block.
    slot(Field::MatchDate, 90.0, 78.0, 4),
    // Team line-up sheets.
    slot(Field::Team1, 150.0, 783.0, 5),
    slot(Field::Team2, 160.0, 783.0, 6),
    slot(Field::Literal(OFFICIALS_COUNTY), 490.0, 353.0, 0),
    slot(Field::Literal(OFFICIALS_COUNTY), 490.0, 337.0, 0),
    slot(Field::Literal(OFFICIALS_COUNTY), 490.0, 322.0, 0),
    slot(Field::Literal(OFFICIALS_COUNTY), 490.0, 305.0, 0),
];

/// Returns the slot table of the template used for `category`.
pub fn layout_for(category: AgeCategory) -> &'static [Slot] {
    match category {
        AgeCategory::U9 => U9_LAYOUT,
        AgeCategory::U11 | AgeCategory::U13 => U11_U13_LAYOUT,
        AgeCategory::U15 => U15_LAYOUT,
    }
}

/// Computes the placements for `record`, in table order.
///
/// Blank placements (an absent optional field) are kept so the result always
/// mirrors the full table; the renderer skips them.
pub fn resolve(record: &ReportRecord) -> Vec<Placement> {
    let category = record.age_category();
    let placements: Vec<Placement> = layout_for(category)
        .iter()
        .map(|slot| Placement::new(slot.field.text(record), slot.x, slot.y, slot.page))
        .collect();

    debug!(
        "Resolved {} placements for {} ({} blank)",
        placements.len(),
        category,
        placements.iter().filter(|p| p.is_blank()).count()
    );

    placements
}
