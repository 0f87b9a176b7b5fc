// crates/core/src/assistant/fallback.rs
//! Keyword-matched canned replies.
//!
//! Used when no API key is configured and whenever the live provider
//! errors or times out. The chat widget should degrade to "helpful
//! signpost", never to an error bubble.

/// Pick a canned reply for the visitor's message.
///
/// Checks run top to bottom; the first matching topic wins.
pub fn fallback_reply(message: &str) -> &'static str {
    let m = message.to_lowercase();

    if m.contains("project") || m.contains("portfolio") || m.contains("demo") {
        "Have a look at the Projects section — each card links to a live demo \
         and the source repository, with a short write-up of the stack."
    } else if m.contains("skill") || m.contains("stack") || m.contains("tech") || m.contains("language") {
        "The Skills section lists the languages and tools I work with daily. \
         The short version: backend-leaning full stack, with a soft spot for \
         typed languages."
    } else if m.contains("experience") || m.contains("career") || m.contains("job") || m.contains("work history") {
        "The Experience section has the full timeline. Each role links out to \
         the company and summarizes what I shipped there."
    } else if m.contains("contact") || m.contains("email") || m.contains("hire") || m.contains("reach") {
        "The quickest way to reach me is the contact form at the bottom of the \
         page — messages land straight in my inbox."
    } else if m.contains("blog") || m.contains("article") || m.contains("post") {
        "The Blog section has occasional write-ups on things I've built and \
         debugged. The RSS feed is linked in the footer."
    } else if m.starts_with("hi") || m.starts_with("hello") || m.starts_with("hey") {
        "Hi! I can point you at projects, skills, experience, or the contact \
         form. What are you curious about?"
    } else {
        "I'm a small guide for this site — try asking about projects, skills, \
         experience, or how to get in touch."
    }
}
