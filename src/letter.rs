use regex::Regex;

use crate::ai::SearchProvider;
use crate::models::CandidateProfile;

const MAX_SUBJECT_LINES: usize = 3;

fn join_up_to_three(items: &[String]) -> String {
    items
        .iter()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generation prompt for the letter body. Personalized when a candidate
/// profile is on file, otherwise a generic template prompt.
pub fn build_letter_prompt(
    company_name: &str,
    company_description: &str,
    interest_reason: &str,
    candidate: Option<&CandidateProfile>,
) -> String {
    let Some(candidate) = candidate else {
        return format!(
            "Generate a concise, professional cover letter of 100-120 words for a candidate \
             applying to {company_name}.\n\n\
             About the company: {company_description}\n\n\
             Why the candidate is interested: {interest_reason}\n\n\
             Keep it personalized to the company and easy to adapt. Do not invent specific \
             names or credentials; leave bracketed placeholders where personal details go."
        );
    };

    let info = &candidate.personal_information;
    let goals = &candidate.career_goals_and_preferences;
    let skills = &candidate.skills_and_expertise;

    format!(
        "Generate a concise cover letter of 100-120 words for {name} applying to {company_name}.\n\n\
         About the company: {company_description}\n\n\
         Why the candidate is interested: {interest_reason}\n\n\
         Candidate's career objective: {objective}\n\n\
         Ideal roles the candidate is seeking: {roles}\n\n\
         Key skills to highlight:\n\
         - Communication and strategy: {communication}\n\
         - AI and technical: {technical}\n\
         - Soft skills: {soft}\n\n\
         The cover letter should be professional, personalized to the company, and highlight \
         relevant experience and skills. It should be 100-120 words and include a proper email \
         signature with name, website, and resume link.",
        name = info.name,
        objective = goals.objective,
        roles = join_up_to_three(&goals.ideal_roles),
        communication = join_up_to_three(&skills.communication_and_strategy),
        technical = join_up_to_three(&skills.ai_and_technical),
        soft = join_up_to_three(&skills.soft_skills),
    )
}

pub fn build_subject_prompt(company_name: &str) -> String {
    format!(
        "Generate three concise, attention-grabbing email subject lines for a job application \
         to {company_name}.\n\
         The subject lines should be professional but stand out in a recruiter's inbox.\n\
         Each should be no more than 8 words.\n\
         Format as a numbered list with just the subject lines, nothing else."
    )
}

/// Pull up to 3 subject lines out of a generated numbered list, dropping
/// the numbering and blank lines.
pub fn parse_subject_lines(response: &str) -> Vec<String> {
    let numbering = Regex::new(r"^\s*\d+[.)]\s*").expect("static regex");
    response
        .lines()
        .map(|line| numbering.replace(line.trim(), "").to_string())
        .filter(|line| !line.is_empty())
        .take(MAX_SUBJECT_LINES)
        .collect()
}

/// The fixed markdown block appended to the report: heading, numbered
/// subject lines (templated fallbacks fill missing slots), body, and a
/// signature. Bracket placeholders stand in when no profile is on file.
pub fn format_letter_block(
    company_name: &str,
    body: &str,
    subject_lines: &[String],
    candidate: Option<&CandidateProfile>,
) -> String {
    let (name, website, resume) = match candidate {
        Some(candidate) => {
            let info = &candidate.personal_information;
            (
                info.name.clone(),
                info.website.clone(),
                info.resume.clone(),
            )
        }
        None => (
            "[Your Name]".to_string(),
            "[Your Website]".to_string(),
            "[Your Resume]".to_string(),
        ),
    };

    let fallbacks = [
        format!("Application for [Position] - {}", name),
        format!("Experienced Professional Interested in {}", company_name),
        format!("Connecting About Opportunities at {}", company_name),
    ];

    let mut block = String::new();
    block.push_str(&format!("## Cover Letter for {}\n\n", company_name));
    block.push_str("### Suggested Subject Lines:\n");
    for (i, fallback) in fallbacks.iter().enumerate() {
        let line = subject_lines.get(i).map(String::as_str).unwrap_or(fallback);
        block.push_str(&format!("{}. {}\n", i + 1, line));
    }
    block.push_str("\n### Cover Letter:\n\n");
    block.push_str(body);
    block.push_str("\n\nBest regards,\n\n");
    block.push_str(&format!("{}\n{}\n{}\n", name, website, resume));
    block
}

/// Full composition: generate the body and subject lines through the
/// provider and format the block. A failed generation call degrades to an
/// empty body (or fallback subjects); the block structure is always
/// emitted.
pub fn compose_cover_letter(
    provider: &dyn SearchProvider,
    company_name: &str,
    company_description: &str,
    interest_reason: &str,
    candidate: Option<&CandidateProfile>,
) -> String {
    let prompt = build_letter_prompt(
        company_name,
        company_description,
        interest_reason,
        candidate,
    );
    let body = match provider.complete(&prompt) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            eprintln!("Warning: cover letter generation failed: {:#}", e);
            String::new()
        }
    };

    let subject_lines = match provider.complete(&build_subject_prompt(company_name)) {
        Ok(text) => parse_subject_lines(&text),
        Err(e) => {
            eprintln!("Warning: subject line generation failed: {:#}", e);
            Vec::new()
        }
    };

    format_letter_block(company_name, &body, &subject_lines, candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CareerGoals, PersonalInformation, Skills};

    fn sample_candidate() -> CandidateProfile {
        CandidateProfile {
            personal_information: PersonalInformation {
                name: "Pat Smith".to_string(),
                public_email: "pat@example.com".to_string(),
                website: "https://pat.example".to_string(),
                resume: "https://pat.example/resume.pdf".to_string(),
                location: None,
                time_zone: None,
            },
            career_goals_and_preferences: CareerGoals {
                objective: "Lead applied AI products".to_string(),
                ideal_roles: vec![
                    "Product Engineer".to_string(),
                    "AI Engineer".to_string(),
                    "Staff Engineer".to_string(),
                    "CTO".to_string(),
                ],
            },
            skills_and_expertise: Skills {
                communication_and_strategy: vec!["roadmapping".to_string()],
                ai_and_technical: vec!["Rust".to_string(), "LLM systems".to_string()],
                soft_skills: vec!["mentoring".to_string()],
            },
        }
    }

    #[test]
    fn test_letter_prompt_interpolates_candidate_fields() {
        let candidate = sample_candidate();
        let prompt = build_letter_prompt(
            "Acme",
            "Acme builds rockets.",
            "I admire their launch cadence.",
            Some(&candidate),
        );
        assert!(prompt.contains("Pat Smith"));
        assert!(prompt.contains("Acme builds rockets."));
        assert!(prompt.contains("I admire their launch cadence."));
        assert!(prompt.contains("Lead applied AI products"));
        // ideal roles capped at three
        assert!(prompt.contains("Product Engineer, AI Engineer, Staff Engineer"));
        assert!(!prompt.contains("CTO"));
        assert!(prompt.contains("100-120 words"));
    }

    #[test]
    fn test_letter_prompt_without_candidate_is_generic() {
        let prompt = build_letter_prompt("Acme", "Acme builds rockets.", "", None);
        assert!(prompt.contains("Acme"));
        assert!(prompt.contains("placeholders"));
        assert!(!prompt.contains("career objective"));
    }

    #[test]
    fn test_parse_subject_lines_strips_numbering() {
        let response = "1. Rust Engineer Ready for Acme\n\n2) Building Rockets, Shipping Code\n3. Let's Talk Acme\n4. Extra line";
        let lines = parse_subject_lines(response);
        assert_eq!(
            lines,
            vec![
                "Rust Engineer Ready for Acme",
                "Building Rockets, Shipping Code",
                "Let's Talk Acme",
            ]
        );
    }

    #[test]
    fn test_format_letter_block_with_candidate() {
        let candidate = sample_candidate();
        let block = format_letter_block(
            "Acme",
            "Dear Acme team, ...",
            &["Rust Engineer Ready for Acme".to_string()],
            Some(&candidate),
        );
        assert!(block.starts_with("## Cover Letter for Acme"));
        assert!(block.contains("1. Rust Engineer Ready for Acme"));
        // missing slots fall back to templated lines, properly interpolated
        assert!(block.contains("2. Experienced Professional Interested in Acme"));
        assert!(block.contains("3. Connecting About Opportunities at Acme"));
        assert!(block.contains("Dear Acme team, ..."));
        assert!(block.contains("Pat Smith\nhttps://pat.example\nhttps://pat.example/resume.pdf"));
    }

    #[test]
    fn test_format_letter_block_without_candidate_uses_placeholders() {
        let block = format_letter_block("Acme", "", &[], None);
        assert!(block.contains("1. Application for [Position] - [Your Name]"));
        assert!(block.contains("[Your Name]\n[Your Website]\n[Your Resume]"));
        // empty body still leaves the full block structure in place
        assert!(block.contains("### Cover Letter:"));
        assert!(block.contains("Best regards,"));
    }
}
