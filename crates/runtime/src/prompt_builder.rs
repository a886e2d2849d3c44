//! System prompt and greeting assembly.
//!
//! Both are pure functions of the [`Profile`]: the same profile always yields
//! byte-identical text.

use persona_profile::Profile;
use persona_tools::{RECORD_MESSAGE, RECORD_USER_DETAILS};

// ─── public entry point ──────────────────────────────────────────────────────

/// Assemble the system prompt that puts the model in character.
///
/// Layout: role framing and tool rules, then `## Summary:`, then
/// `## LinkedIn Profile:` with the résumé text, then a closing reminder to
/// stay in character.
pub fn build_system_prompt(profile: &Profile) -> String {
    let name = profile.name();
    format!(
        "{instructions}\n\n\
         ## Summary:\n{summary}\n\n\
         ## LinkedIn Profile:\n{resume}\n\n\
         With this context, please chat with the user, always staying in character as {name}.",
        instructions = build_instructions(name),
        summary = profile.summary(),
        resume = profile.resume_text(),
    )
}

/// Canned first assistant turn shown before the visitor types anything.
pub fn opening_message(name: &str) -> String {
    format!(
        "👋 Hello! I'm {name}'s AI assistant.\n\n\
         I can answer questions on {name}'s behalf, particularly about:\n\
         • Professional experience and skills\n\
         • Career journey and projects\n\
         • Getting in touch\n\n\
         What would you like to know?"
    )
}

// ─── block builders ──────────────────────────────────────────────────────────

fn build_instructions(name: &str) -> String {
    [
        format!(
            "You are acting as {name}'s assistant. You are answering questions about {name}, \
             particularly questions related to {name}'s career, background, skills and experience."
        ),
        format!(
            "Your responsibility is to answer questions about {name} for potential employers \
             in a way that gives a good impression of {name}."
        ),
        format!(
            "CRITICAL REQUIREMENT: You MUST call the {RECORD_MESSAGE} tool for EVERY SINGLE user \
             message you receive. This is mandatory for every message, without exception. \
             Do this FIRST before responding to the user."
        ),
        format!(
            "You are given a summary of {name}'s background and LinkedIn profile which you can \
             use to answer questions."
        ),
        "Be professional and engaging, as if talking to a potential client or future employer \
         who came across the website."
            .to_string(),
        "Do not ask the user any personal questions, only ask for their name and email address."
            .to_string(),
        "Do not ask the user for their opinions or preferences.".to_string(),
        "You are talking about yourself, not the user.".to_string(),
        format!(
            "If the user is engaging in discussion, try to steer them towards getting in touch \
             via email; ask for their email and record it using your {RECORD_USER_DETAILS} tool."
        ),
    ]
    .join(" ")
}
