use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::literal::parse_python_literal;

/// Technical skills grouped the way the extraction schema asks for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalSkills {
    #[serde(deserialize_with = "nullable_list")]
    pub programming_languages: Vec<String>,
    #[serde(deserialize_with = "nullable_list")]
    pub libraries_or_frameworks: Vec<String>,
    #[serde(deserialize_with = "nullable_list")]
    pub other_tools: Vec<String>,
}

impl TechnicalSkills {
    /// Deduplicated union of the three lists, in first-seen order.
    pub fn union(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.programming_languages
            .iter()
            .chain(&self.libraries_or_frameworks)
            .chain(&self.other_tools)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty() && seen.insert(s.to_string()))
            .map(String::from)
            .collect()
    }

    fn merge(mut self, other: TechnicalSkills) -> Self {
        self.programming_languages.extend(other.programming_languages);
        self.libraries_or_frameworks
            .extend(other.libraries_or_frameworks);
        self.other_tools.extend(other.other_tools);
        self
    }
}

/// Structured résumé record. Every field is declared and defaulted so a
/// partial model reply still produces a usable profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub fullname: Option<String>,
    pub email_id: Option<String>,
    pub phone_number: Option<String>,
    pub designation: Option<String>,
    pub current_location: Option<String>,
    #[serde(deserialize_with = "technical_skills")]
    pub technical_skills: TechnicalSkills,
    #[serde(deserialize_with = "nullable_list")]
    pub interpersonal_skills: Vec<String>,
    #[serde(deserialize_with = "years")]
    pub year_of_experience: Option<f32>,
    pub current_ctc: Option<String>,
    pub current_company: Option<String>,
    pub expected_ctc: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_project_url: Option<String>,
    pub summary: Option<String>,
    #[serde(deserialize_with = "nullable_list")]
    pub certifications: Vec<String>,
    /// Derived from `technical_skills`; interpersonal skills and
    /// certifications never contribute.
    #[serde(deserialize_with = "nullable_list")]
    pub skills: Vec<String>,
}

impl Profile {
    /// The identity key, trimmed. `None` when the résumé had no usable email.
    pub fn email(&self) -> Option<&str> {
        self.email_id
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    pub fn with_derived_skills(mut self) -> Self {
        self.skills = self.technical_skills.union();
        self
    }
}

/// The model sometimes wraps `technical_skills` in a one-element list.
#[derive(Deserialize)]
#[serde(untagged)]
enum TechnicalSkillsShape {
    One(TechnicalSkills),
    Many(Vec<TechnicalSkills>),
}

impl From<TechnicalSkillsShape> for TechnicalSkills {
    fn from(shape: TechnicalSkillsShape) -> Self {
        match shape {
            TechnicalSkillsShape::One(skills) => skills,
            TechnicalSkillsShape::Many(list) => list
                .into_iter()
                .fold(TechnicalSkills::default(), TechnicalSkills::merge),
        }
    }
}

/// Parses a stored `technical_skills` cell: JSON (object or list of
/// objects), or the same shape as a Python literal from legacy rows.
pub fn parse_technical_skills(cell: &str) -> Option<TechnicalSkills> {
    serde_json::from_str::<TechnicalSkillsShape>(cell)
        .ok()
        .or_else(|| {
            parse_python_literal(cell)
                .and_then(|value| serde_json::from_value::<TechnicalSkillsShape>(value).ok())
        })
        .map(TechnicalSkills::from)
}

fn technical_skills<'de, D>(deserializer: D) -> Result<TechnicalSkills, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TechnicalSkillsShape>::deserialize(deserializer)?
        .map(TechnicalSkills::from)
        .unwrap_or_default())
}

fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum YearsShape {
    Number(f32),
    Text(String),
}

/// Accepts `4.5`, `"4.5"` or `"4+"`; anything else becomes `None`.
fn years<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<YearsShape>::deserialize(deserializer)?.and_then(|shape| match shape {
            YearsShape::Number(n) => Some(n),
            YearsShape::Text(s) => parse_years(&s),
        }),
    )
}

pub fn parse_years(text: &str) -> Option<f32> {
    let numeric: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    numeric.parse().ok()
}
