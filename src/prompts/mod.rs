//! Prompts sent to the analysis service
//!
//! Each builder returns the full text of one request so the pipeline only
//! deals with transport.

use crate::storage::{Category, Idea};

/// System instruction used when refining an existing idea
pub const REFINE_SYSTEM_INSTRUCTION: &str = "You are an idea catalyst. Your goal is to take an existing idea and expand it, finding hidden connections, potential obstacles, and more creative angles.";

/// Instruction that accompanies an uploaded voice note
pub fn build_audio_analysis_prompt() -> String {
    "Analyze this voice note and return a structured JSON object. Include: title, transcript, \
     summary, actionItems, tags, category (Work/Personal/Creative/Other), and an imagePrompt."
        .to_string()
}

/// Analysis request for typed input
///
/// # Examples
///
/// ```
/// use ideaflow::prompts::build_text_analysis_prompt;
///
/// let prompt = build_text_analysis_prompt("a bike lane app");
/// assert!(prompt.contains("\"a bike lane app\""));
/// ```
pub fn build_text_analysis_prompt(input: &str) -> String {
    format!(
        "Analyze this idea and return a structured JSON object. The user wrote: \"{}\". \
         Include: title (creative and punchy), transcript (the original input), summary \
         (a rich 2-3 sentence summary), actionItems (3-5 next steps), tags (3-5 relevant \
         keywords), category (Work/Personal/Creative/Other), and an imagePrompt (for \
         generating abstract art).",
        input
    )
}

/// Prompt for the illustrative image attached to a new idea
pub fn build_image_prompt(subject: &str) -> String {
    format!(
        "Minimalist, cinematic, abstract 3D art representing: {}. Dark theme, glowing accents.",
        subject
    )
}

/// Deep dive request, shaped by the idea's category
pub fn build_deep_dive_prompt(idea: &Idea) -> String {
    let instructions = match idea.category {
        Category::Work | Category::Personal => {
            "Provide a Strategic Roadmap with 3 phases and a \"Potential Pitfalls\" section."
        }
        Category::Creative => {
            "Provide 3 \"Alternative Variations\" or \"Sequel Ideas\" and a \"Mood/Tone\" analysis."
        }
        Category::Other => {
            "Connect this to a broader global trend and suggest a reading topic."
        }
    };

    format!(
        "You are an expert strategic consultant and creative muse.\n\
         Perform a \"Deep Dive\" expansion on this idea.\n\n\
         Title: {}\n\
         Category: {}\n\
         Summary: {}\n\
         Transcript: {}\n\n\
         Instructions: {}\n\n\
         Format: Return PLAIN TEXT with clear UPPERCASE HEADERS (e.g., PHASE 1: INITIATION). \
         Do not use markdown symbols like ** or ##.",
        idea.title, idea.category, idea.summary, idea.transcript, instructions
    )
}

/// System instruction that frames a brainstorming chat around one idea
///
/// # Examples
///
/// ```
/// use ideaflow::prompts::build_chat_system_instruction;
/// use ideaflow::storage::Idea;
///
/// let idea = Idea {
///     title: "Tool library".into(),
///     ..Default::default()
/// };
/// assert!(build_chat_system_instruction(&idea).contains("their idea: \"Tool library\""));
/// ```
pub fn build_chat_system_instruction(idea: &Idea) -> String {
    format!(
        "You are an expert brainstorming partner. You are helping the user with their idea: \"{}\".\n\
         Context: {}.\n\
         Transcript: {}.\n\
         Help them expand on this, find flaws, or suggest tools. Keep responses concise and inspiring.",
        idea.title, idea.summary, idea.transcript
    )
}

/// Refinement request listing the current action items
pub fn build_refine_prompt(idea: &Idea) -> String {
    format!(
        "Current Idea:\n\
         Title: {}\n\
         Summary: {}\n\
         Current Action Items: {}\n\n\
         Tasks:\n\
         1. Improve the title to be more punchy and inspiring.\n\
         2. Expand the summary with more depth (add one more paragraph of creative insight).\n\
         3. Add 3 more high-impact action items.\n\
         4. Suggest 2 new relevant tags.\n\n\
         Return the result in JSON format with fields: title, expandedSummary, \
         additionalActionItems, newTags.",
        idea.title,
        idea.summary,
        idea.action_items.join(", ")
    )
}
