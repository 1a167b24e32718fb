//! The gap-analysis prompt.
//!
//! The rendered prompt carries exactly three variable parts: the target
//! role, the comma-joined skill list, and the newline-joined top evidence
//! excerpts. Empty skill or evidence sets are replaced with explicit
//! placeholder text — a template variable is never left blank. Output
//! structure (headings, the 30/60/90-day plan) is the model's job; nothing
//! downstream parses it.

/// Placeholder used when no skills were extracted from the résumé.
pub const SKILLS_PLACEHOLDER: &str = "Skills analysis pending - please review CV content";

/// Evidence excerpts included in the prompt, at most.
pub const MAX_PROMPT_EVIDENCE: usize = 3;

/// Placeholder evidence line used when no posting text survived the run.
pub fn evidence_placeholder(role: &str) -> String {
    format!("Job market analysis for {role} position")
}

/// Render the full gap-analysis prompt.
pub fn render_prompt(role: &str, skills: &[String], evidence: &[String]) -> String {
    let skills_text = if skills.is_empty() {
        SKILLS_PLACEHOLDER.to_string()
    } else {
        skills.join(", ")
    };

    let evidence_text = if evidence.is_empty() {
        evidence_placeholder(role)
    } else {
        evidence
            .iter()
            .take(MAX_PROMPT_EVIDENCE)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        "You are an expert career mentor, hiring manager, and skills analyst. \
Your goal is to help the candidate close the gap between their current skills \
and the target role.

Analyze the following information carefully:

TARGET ROLE: {role}
CANDIDATE SKILLS FROM CV: {skills_text}
RELEVANT JOB DESCRIPTION EXCERPTS:
{evidence_text}

Provide a detailed, structured analysis in the following format:

## Skills You Already Have
List and explain the CV skills that match the target role requirements, with
a short note on how each is typically applied in the role.

## High-Priority Missing Skills
Identify the most important missing skills, ordered by importance for the
role, and explain why each matters.

## Skill Gap Analysis
Summarize the overall gap between the current CV and role expectations.
Highlight strengths the candidate can leverage and risks if gaps remain.

## 30/60/90-Day Action Plan

### 30 Days (Foundation)
Quick wins and immediate steps, with learning resources (courses,
documentation, tutorials).

### 60 Days (Development)
Intermediate projects and hands-on practice, plus networking or
portfolio-building opportunities.

### 90 Days (Mastery)
Advanced, role-specific applications (real-world projects, open-source
contributions) and stretch goals that stand out to employers.

## Evidence from Job Descriptions
Quote specific skills, tools, or responsibilities mentioned in the postings
and map them to the candidate's current and missing skills.

Be specific, actionable, and motivating — no generic advice. Prioritize
skills and tools that recur across multiple job descriptions, keep the tone
professional but encouraging, and suggest concrete resources (platforms,
project ideas, or certifications) where possible."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_role_skills_and_evidence() {
        let skills = vec!["python".to_string(), "sql".to_string()];
        let evidence = vec!["Looking for Python engineers.".to_string()];
        let prompt = render_prompt("Data Scientist", &skills, &evidence);

        assert!(prompt.contains("TARGET ROLE: Data Scientist"));
        assert!(prompt.contains("python, sql"));
        assert!(prompt.contains("Looking for Python engineers."));
    }

    #[test]
    fn empty_sets_get_placeholders() {
        let prompt = render_prompt("ML Engineer", &[], &[]);
        assert!(prompt.contains(SKILLS_PLACEHOLDER));
        assert!(prompt.contains("Job market analysis for ML Engineer position"));
    }

    #[test]
    fn evidence_is_capped_at_three() {
        let evidence: Vec<String> = (0..5).map(|i| format!("excerpt-{i}")).collect();
        let prompt = render_prompt("Role", &[], &evidence);
        assert!(prompt.contains("excerpt-2"));
        assert!(!prompt.contains("excerpt-3"));
    }
}
