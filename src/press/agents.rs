//! The seven personas of the press-release crew.

use crate::domain::{AgentSet, AgentSpec};

/// Stable agent ids, also used by the stage definitions
pub const CONTENT_STRATEGIST: &str = "content_strategist";
pub const WRITER: &str = "writer";
pub const FACT_CHECKER: &str = "fact_checker";
pub const EDITOR: &str = "editor";
pub const COPYWRITER: &str = "copywriter";
pub const QUALITY_ASSURANCE: &str = "quality_assurance";
pub const HTML_FORMATTER: &str = "html_formatter";

/// Build the agent set for one run.
///
/// Temperatures are tuned per role: low for fact-checking and strategy
/// (constrained, precise output), default for the writing roles.
pub fn agents() -> AgentSet {
    AgentSet::new(vec![
        AgentSpec::new(
            CONTENT_STRATEGIST,
            "Content Strategist",
            "Develop a strategic framework for press releases by analyzing the source data and user brief",
            "You are an expert Content Strategist with deep expertise in public relations and corporate communications.",
        )
        .with_temperature(0.4),
        AgentSpec::new(
            WRITER,
            "Press Release Writer",
            "Create compelling press release drafts based on strategic guidance and data",
            "You are an expert Press Release Writer with years of experience crafting compelling announcements for organizations.",
        )
        .with_delegation(true),
        AgentSpec::new(
            FACT_CHECKER,
            "Fact Checker",
            "Verify all facts, figures, and claims against the provided source data",
            "You are a meticulous Fact-Checker with expertise in verifying information in media publications.",
        )
        .with_temperature(0.2),
        AgentSpec::new(
            EDITOR,
            "Press Release Editor",
            "Review and refine drafts for structure, clarity, and messaging effectiveness",
            "You are an experienced Press Release Editor with a keen eye for structure, clarity, and impact.",
        )
        .with_delegation(true),
        AgentSpec::new(
            COPYWRITER,
            "Copywriter",
            "Enhance language for persuasiveness and engagement while maintaining professional standards",
            "You are an accomplished Copywriter specializing in polishing professional communications for impact and engagement.",
        ),
        AgentSpec::new(
            QUALITY_ASSURANCE,
            "Quality Assurance Specialist",
            "Evaluate press release versions against quality criteria and select the best output",
            "You are a Quality Assurance Specialist with expertise in evaluating professional communications.",
        )
        .with_temperature(0.3),
        AgentSpec::new(
            HTML_FORMATTER,
            "Web Design Specialist",
            "Transform final press release text into professionally formatted HTML",
            "You are a Web Design Specialist focused on creating professional, responsive layouts for corporate communications.",
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_seven_agents_present() {
        let set = agents();
        assert_eq!(set.len(), 7);
        for id in [
            CONTENT_STRATEGIST,
            WRITER,
            FACT_CHECKER,
            EDITOR,
            COPYWRITER,
            QUALITY_ASSURANCE,
            HTML_FORMATTER,
        ] {
            assert!(set.contains(id), "missing agent '{}'", id);
        }
    }

    #[test]
    fn test_temperatures_tuned_per_role() {
        let set = agents();
        assert_eq!(set.get(FACT_CHECKER).unwrap().temperature, 0.2);
        assert_eq!(set.get(CONTENT_STRATEGIST).unwrap().temperature, 0.4);
        assert_eq!(set.get(QUALITY_ASSURANCE).unwrap().temperature, 0.3);
        assert_eq!(set.get(WRITER).unwrap().temperature, 0.7);
    }

    #[test]
    fn test_delegation_flags() {
        let set = agents();
        assert!(set.get(WRITER).unwrap().allow_delegation);
        assert!(set.get(EDITOR).unwrap().allow_delegation);
        assert!(!set.get(FACT_CHECKER).unwrap().allow_delegation);
    }
}
