//! The seven-stage press-release pipeline.
//!
//! A fixed chain with two fan-in points: editing consumes both the
//! drafts and the fact-checking reports, and every later stage refines
//! the previous one's output. The terminal stage produces the HTML
//! artifact.

use crate::domain::{PipelineSpec, StageSpec};

use super::agents;

pub const STRATEGY: &str = "strategy";
pub const WRITING: &str = "writing";
pub const FACT_CHECK: &str = "fact_check";
pub const EDITING: &str = "editing";
pub const COPYWRITING: &str = "copywriting";
pub const QUALITY: &str = "quality";
pub const HTML_FORMAT: &str = "html_format";

const STRATEGY_TEMPLATE: &str = "\
Analyze the provided source data and user brief to develop a strategic framework for this press release.

Important considerations:
- Identify 3-5 key messages that should be highlighted
- Determine the most newsworthy angle based on the data
- Identify the target audience and their interests
- Recommend tone and style appropriate for this press release (formal, conversational, technical)
- Suggest a narrative structure that will best serve the content

Your output should provide clear strategic guidance that a writer can follow to create an effective press release.
Include reasoning for your recommendations.

Context: {context}";

const WRITING_TEMPLATE: &str = "\
Create two distinct press release drafts based on the provided source data, user brief, and strategic guidance.

Your writing should:
- Begin with a compelling headline and strong first paragraph that captures the essence of the news
- Follow standard press release structure with dateline and appropriate formatting
- Incorporate key data points from the source data accurately
- Include at least one relevant quote from an appropriate stakeholder
- End with standard boilerplate text and contact information
- Match the recommended tone while maintaining journalistic standards
- Be between 400-600 words unless otherwise specified

Create press releases that journalists would find newsworthy and easy to report from.

Context: {context}

Strategic guidance: {strategy.output}";

const FACT_CHECK_TEMPLATE: &str = "\
Verify all facts, figures, and claims in the provided press release drafts against the original source data.

For each press release draft:
- Identify every factual statement, number, date, name, and claim
- Cross-reference each with the provided source data
- Flag any discrepancies, inaccuracies, or unsubstantiated claims
- Check for logical inconsistencies or misleading presentations of data
- Verify that quotes are properly attributed
- Ensure no critical information from the source data is omitted

Create a detailed fact-checking report for each draft highlighting any issues found and suggesting corrections.

Context: {context}

Press release drafts: {writing.output}";

const EDITING_TEMPLATE: &str = "\
Review and improve the provided press release drafts, considering the fact-checking reports.

Focus on:
- Strengthening the headline and lead paragraph
- Ensuring the narrative flows logically
- Verifying that key messages are prominently featured
- Eliminating unnecessary jargon, redundancies, or vague statements
- Balancing factual presentation with engaging style
- Ensuring appropriate transitions between sections
- Maintaining professional journalistic standards
- Correcting any factual issues identified in the fact-checking reports

Provide specific improvements with clear explanations for your reasoning.
Submit complete revised versions of both drafts.

Context: {context}

Press release drafts: {writing.output}
Fact-checking reports: {fact_check.output}";

const COPYWRITING_TEMPLATE: &str = "\
Enhance the language of the edited press release drafts for persuasiveness, engagement, and style
while maintaining professional standards.

Focus on:
- Crafting more compelling headlines and subheadings
- Strengthening the opening and closing paragraphs
- Replacing generic phrases with more vivid, specific language
- Ensuring consistent tone throughout the document
- Enhancing quotes for memorability and impact
- Improving sentence variety and paragraph transitions
- Incorporating appropriate industry terminology
- Maintaining conciseness while adding rhetorical strength

Provide complete enhanced versions of both press releases with language improvements.

Context: {context}

Edited press release drafts: {editing.output}";

const QUALITY_TEMPLATE: &str = "\
Assess both enhanced press release versions and determine which best meets quality standards
or how elements from different versions might be combined.

Evaluate each press release version against these criteria:
- Headline effectiveness (attention-grabbing, clear, accurate)
- Lead paragraph quality (answers who, what, when, where, why)
- Message clarity (key points clearly communicated)
- Structure and flow (logical progression, good transitions)
- Language quality (engaging, professional, appropriate tone)
- Factual accuracy (corresponds to provided source data)
- Quote quality (adds value, sounds authentic)
- Format adherence (follows press release conventions)

Score each version on a scale of 1-10 for each criterion, providing specific comments.
Then either select the best overall version OR create a combined optimal version
using the strongest elements from both.

Context: {context}

Enhanced press release versions: {copywriting.output}";

const HTML_FORMAT_TEMPLATE: &str = "\
Convert the final press release text into a well-structured HTML document with appropriate CSS styling.

Your HTML/CSS implementation should:
- Create a clean, professional layout appropriate for a press release
- Include responsive design elements that work on mobile and desktop
- Use appropriate typography for headlines, body text, and quotes
- Structure the document with semantic HTML elements
- Include proper spacing and visual hierarchy
- Add appropriate metadata and SEO elements
- Consider accessibility best practices

Provide complete HTML and CSS code that can be directly implemented.

Context: {context}

Final press release: {quality.output}";

/// Build the fixed press-release pipeline
pub fn pipeline() -> PipelineSpec {
    PipelineSpec::new(
        "press_release",
        "Seven-stage press release enhancement pipeline",
    )
    .with_stage(StageSpec::new(
        STRATEGY,
        agents::CONTENT_STRATEGIST,
        STRATEGY_TEMPLATE,
        "A comprehensive strategic framework document with key messages, angle, audience analysis, tone recommendations, and narrative structure guidance.",
    ))
    .with_stage(
        StageSpec::new(
            WRITING,
            agents::WRITER,
            WRITING_TEMPLATE,
            "Two distinct press release drafts that follow the strategic guidance.",
        )
        .with_upstream(&[STRATEGY]),
    )
    .with_stage(
        StageSpec::new(
            FACT_CHECK,
            agents::FACT_CHECKER,
            FACT_CHECK_TEMPLATE,
            "Detailed fact-checking reports for each draft with identified issues and suggested corrections.",
        )
        .with_upstream(&[WRITING]),
    )
    .with_stage(
        StageSpec::new(
            EDITING,
            agents::EDITOR,
            EDITING_TEMPLATE,
            "Revised versions of both press release drafts with improved structure, clarity, and factual accuracy.",
        )
        .with_upstream(&[WRITING, FACT_CHECK]),
    )
    .with_stage(
        StageSpec::new(
            COPYWRITING,
            agents::COPYWRITER,
            COPYWRITING_TEMPLATE,
            "Enhanced versions of both press releases with improved language, engagement, and persuasiveness.",
        )
        .with_upstream(&[EDITING]),
    )
    .with_stage(
        StageSpec::new(
            QUALITY,
            agents::QUALITY_ASSURANCE,
            QUALITY_TEMPLATE,
            "Quality assessment of both versions with scores and comments, plus selection or creation of an optimal final version.",
        )
        .with_upstream(&[COPYWRITING]),
    )
    .with_stage(
        StageSpec::new(
            HTML_FORMAT,
            agents::HTML_FORMATTER,
            HTML_FORMAT_TEMPLATE,
            "Complete HTML and CSS code for the final press release with professional styling.",
        )
        .with_upstream(&[QUALITY]),
    )
}
