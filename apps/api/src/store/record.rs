//! Row codec between `Profile` and the fixed CSV column layout.

use csv::StringRecord;
use tracing::debug;

use crate::models::profile::{parse_technical_skills, parse_years};
use crate::models::Profile;
use crate::skills::parse_skill_cell;

/// Column order of the profile table.
pub const COLUMNS: [&str; 17] = [
    "fullname",
    "email_id",
    "phone_number",
    "current_location",
    "designation",
    "technical_skills",
    "interpersonal_skills",
    "year_of_experience",
    "current_ctc",
    "current_company",
    "expected_ctc",
    "linkedin_url",
    "github_url",
    "portfolio_project_url",
    "summary",
    "certifications",
    "skills",
];

pub const EMAIL_COLUMN: usize = 1;

/// Encodes a profile as one row. The `skills` column is always re-derived
/// from the technical skill lists.
pub fn encode(profile: &Profile) -> Result<Vec<String>, serde_json::Error> {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    Ok(vec![
        text(&profile.fullname),
        profile.email().unwrap_or_default().to_string(),
        text(&profile.phone_number),
        text(&profile.current_location),
        text(&profile.designation),
        serde_json::to_string(&profile.technical_skills)?,
        serde_json::to_string(&profile.interpersonal_skills)?,
        profile
            .year_of_experience
            .map(|y| y.to_string())
            .unwrap_or_default(),
        text(&profile.current_ctc),
        text(&profile.current_company),
        text(&profile.expected_ctc),
        text(&profile.linkedin_url),
        text(&profile.github_url),
        text(&profile.portfolio_project_url),
        text(&profile.summary),
        serde_json::to_string(&profile.certifications)?,
        serde_json::to_string(&profile.technical_skills.union())?,
    ])
}

/// Decodes one row. Cells are parsed tolerantly; only structural problems
/// (field count, missing key) are returned as the reason the row is corrupt.
pub fn decode(record: &StringRecord) -> Result<Profile, String> {
    if record.len() != COLUMNS.len() {
        return Err(format!(
            "expected {} fields, found {}",
            COLUMNS.len(),
            record.len()
        ));
    }

    let cell = |i: usize| record.get(i).unwrap_or_default().trim();
    let optional = |i: usize| Some(cell(i)).filter(|s| !s.is_empty()).map(String::from);

    let email_id = optional(EMAIL_COLUMN).ok_or_else(|| "missing email_id".to_string())?;

    let year_of_experience = match cell(7) {
        "" => None,
        raw => parse_years(raw).or_else(|| {
            debug!("Non-numeric year_of_experience '{raw}' for {email_id}, reading as empty");
            None
        }),
    };

    let technical_skills = match cell(5) {
        "" => Default::default(),
        raw => parse_technical_skills(raw).unwrap_or_else(|| {
            debug!("Unreadable technical_skills cell for {email_id}, treating as empty");
            Default::default()
        }),
    };

    Ok(Profile {
        fullname: optional(0),
        email_id: Some(email_id),
        phone_number: optional(2),
        current_location: optional(3),
        designation: optional(4),
        technical_skills,
        interpersonal_skills: parse_skill_cell(cell(6)),
        year_of_experience,
        current_ctc: optional(8),
        current_company: optional(9),
        expected_ctc: optional(10),
        linkedin_url: optional(11),
        github_url: optional(12),
        portfolio_project_url: optional(13),
        summary: optional(14),
        certifications: parse_skill_cell(cell(15)),
        skills: parse_skill_cell(cell(16)),
    })
}
