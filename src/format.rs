//! Text formatting rules shared by the layout resolver and the output naming.

use chrono::NaiveDate;

use crate::model::{AgeCategory, ReportRecord};

/// Formats the match date the way the category's paper template expects it.
///
/// The U15 template has a free-form date box and takes `DD.MM.YYYY`. The other
/// templates carry a pre-printed separator between day and month, so the day and
/// month are written five spaces apart to land on either side of it.
pub fn format_date(date: NaiveDate, category: AgeCategory) -> String {
    match category {
        AgeCategory::U15 => date.format("%d.%m.%Y").to_string(),
        AgeCategory::U9 | AgeCategory::U11 | AgeCategory::U13 => {
            date.format("%d     %m").to_string()
        }
    }
}

/// Returns the `"{team_1} - {team_2}"` line printed in the fixture header.
pub fn fixture_line(team_1: &str, team_2: &str) -> String {
    format!("{team_1} - {team_2}")
}

fn strip_team_name(name: &str) -> String {
    name.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Derives the download file name for a rendered report.
///
/// `referee_report_{category}_{team_1}_vs_{team_2}_{yyyymmdd}.pdf`, where team names
/// keep only ASCII letters and digits.
pub fn report_filename(record: &ReportRecord) -> String {
    format!(
        "referee_report_{}_{}_vs_{}_{}.pdf",
        record.age_category(),
        strip_team_name(record.team_1()),
        strip_team_name(record.team_2()),
        record.match_date().format("%Y%m%d"),
    )
}

#[cfg(test)]
mod tests {
    use super::{fixture_line, format_date, report_filename};
    use crate::model::{AgeCategory, ReportRecord};
    use chrono::{NaiveDate, NaiveTime};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn record(category: AgeCategory, team_1: &str, team_2: &str) -> ReportRecord {
        ReportRecord::new(
            category,
            "John Doe",
            date(2023, 10, 27),
            NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
            team_1,
            team_2,
        )
    }

    #[test]
    fn u15_uses_dotted_date() {
        assert_eq!(format_date(date(2023, 10, 27), AgeCategory::U15), "27.10.2023");
        assert_eq!(format_date(date(2024, 1, 5), AgeCategory::U15), "05.01.2024");
    }

    #[test]
    fn younger_categories_space_day_and_month() {
        for category in [AgeCategory::U9, AgeCategory::U11, AgeCategory::U13] {
            assert_eq!(format_date(date(2023, 5, 1), category), "01     05");
        }
    }

    #[test]
    fn fixture_line_joins_with_spaced_hyphen() {
        assert_eq!(fixture_line("Team A", "Team B"), "Team A - Team B");
    }

    #[test]
    fn filename_strips_team_punctuation() {
        let record = record(AgeCategory::U13, "Team A!", "Team@B");
        assert_eq!(
            report_filename(&record),
            "referee_report_U13_TeamA_vs_TeamB_20231027.pdf"
        );
    }

    #[test]
    fn filename_drops_diacritics_and_spaces() {
        let record = record(AgeCategory::U11, "Steaua București", "F.C. Voluntari");
        assert_eq!(
            report_filename(&record),
            "referee_report_U11_SteauaBucureti_vs_FCVoluntari_20231027.pdf"
        );
    }
}
