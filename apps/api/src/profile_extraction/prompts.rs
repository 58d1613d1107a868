// Profile extraction LLM prompt templates.

pub const PROFILE_EXTRACTION_SYSTEM: &str = "\
You are a precise resume data extractor. \
Read the resume text and fill in the structured profile described by the response schema. \
Split technical skills into programming_languages, libraries_or_frameworks and other_tools; \
soft skills belong in interpersonal_skills, not in technical_skills.";

pub const PROFILE_EXTRACTION_PROMPT: &str = r#"Extract the candidate profile from the following resume.

RESUME TEXT:
{resume_text}

RULES:
1. email_id must be copied exactly as written in the resume
2. year_of_experience is total professional experience in years as a number
3. current_ctc and expected_ctc keep the currency and unit as written (e.g. "12 LPA")
4. summary is two or three sentences in the third person
5. Return ONLY the JSON object"#;
