//! Response schema for profile extraction, in the OpenAPI subset Gemini accepts.

use serde_json::{json, Value};

fn text(description: &str) -> Value {
    json!({ "type": "STRING", "nullable": true, "description": description })
}

fn list(description: &str) -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" }, "description": description })
}

/// Mirrors `Profile` minus the derived `skills` field.
pub fn profile_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "fullname": text("Full name of the candidate"),
            "email_id": text("Email address"),
            "phone_number": text("Phone number including country code if present"),
            "designation": text("Current job title"),
            "current_location": text("Current city / location"),
            "technical_skills": {
                "type": "OBJECT",
                "properties": {
                    "programming_languages": list("Programming languages"),
                    "libraries_or_frameworks": list("Libraries and frameworks"),
                    "other_tools": list("Other tools, platforms and databases")
                },
                "required": ["programming_languages", "libraries_or_frameworks", "other_tools"]
            },
            "interpersonal_skills": list("Soft / interpersonal skills"),
            "year_of_experience": {
                "type": "NUMBER",
                "nullable": true,
                "description": "Total years of professional experience"
            },
            "current_ctc": text("Current annual compensation"),
            "current_company": text("Current employer"),
            "expected_ctc": text("Expected annual compensation"),
            "linkedin_url": text("LinkedIn profile URL"),
            "github_url": text("GitHub profile URL"),
            "portfolio_project_url": text("Portfolio or project URL"),
            "summary": text("Short professional summary"),
            "certifications": list("Certifications")
        },
        "required": [
            "fullname",
            "email_id",
            "technical_skills",
            "interpersonal_skills",
            "certifications"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Profile;
    use crate::store::record::COLUMNS;

    #[test]
    fn test_schema_covers_every_stored_column_except_skills() {
        let schema = profile_response_schema();
        let properties = schema["properties"].as_object().unwrap();

        for column in COLUMNS.iter().filter(|c| **c != "skills") {
            assert!(properties.contains_key(*column), "schema is missing {column}");
        }
        assert!(!properties.contains_key("skills"));
        assert_eq!(properties.len(), COLUMNS.len() - 1);
    }

    #[test]
    fn test_schema_shaped_reply_deserializes_into_profile() {
        let reply = r#"{
            "fullname": "Ravi Kumar",
            "email_id": "ravi@example.com",
            "phone_number": null,
            "designation": "Backend Engineer",
            "current_location": "Pune",
            "technical_skills": {
                "programming_languages": ["Java", "Python"],
                "libraries_or_frameworks": ["Spring Boot"],
                "other_tools": ["Kafka", "Java"]
            },
            "interpersonal_skills": ["Communication"],
            "year_of_experience": 5,
            "current_ctc": "18 LPA",
            "current_company": "Acme",
            "expected_ctc": null,
            "linkedin_url": null,
            "github_url": "https://github.com/ravi",
            "portfolio_project_url": null,
            "summary": "Backend engineer.",
            "certifications": []
        }"#;

        let profile = serde_json::from_str::<Profile>(reply)
            .unwrap()
            .with_derived_skills();
        assert_eq!(profile.year_of_experience, Some(5.0));
        assert_eq!(profile.skills, vec!["Java", "Python", "Spring Boot", "Kafka"]);
        assert!(profile.skills.iter().all(|s| s != "Communication"));
    }
}
