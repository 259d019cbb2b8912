//! Fixed-format oracle prompts.
//!
//! The system prompts demand strict JSON with a known key set; parsing still
//! treats the reply as untrusted (see [`crate::strategist`]).

use compass_core::domain::lead::NewContactMessage;
use compass_core::domain::strategy::StrategyRequest;

pub const STRATEGY_SYSTEM_PROMPT: &str = "\
You are a senior Enterprise AI Automation Consultant.

Your task:
Generate a structured automation strategy for a business based on provided inputs.

Tone:
- Professional
- Enterprise-level
- No emojis
- No fluff
- No hype language

Output Format (Strict JSON):
Return ONLY valid JSON - no markdown, no code fences, no explanation outside the JSON.

{
  \"diagnosis\": \"2-3 sentence analysis of the operational bottleneck\",
  \"system\": \"Specific automation system architecture recommendation\",
  \"hoursSaved\": \"Realistic numeric weekly hours saved as a string (e.g. '15-20')\",
  \"timeline\": \"Implementation duration as a string (e.g. '3-4 weeks')\",
  \"plan\": {
    \"week1\": \"Specific deliverable\",
    \"week2\": \"Specific deliverable\",
    \"week3\": \"Specific deliverable\",
    \"week4\": \"Specific deliverable or handover\"
  },
  \"nextStep\": \"One sentence encouraging booking a strategy call - professional tone, no exclamation marks\"
}";

pub fn strategy_user_prompt(request: &StrategyRequest) -> String {
    let tech_stack = if request.tech_stack.is_empty() {
        "Not specified".to_string()
    } else {
        request.tech_stack.join(", ")
    };

    format!(
        "Business Inputs:\n\n\
         Company Size: {}\n\
         Primary Bottleneck: {}\n\
         Current Tech Stack: {}",
        request.company_size, request.bottleneck, tech_stack
    )
}

pub const TRIAGE_SYSTEM_PROMPT: &str = "\
You are a helpful assistant. Given a contact submission, classify the intent \
(one of: inquiry, pricing, support, partnership, other) and priority (low, \
medium, high). Then produce a concise, professional email reply subject and \
body addressed to the sender. Respond ONLY in JSON with keys: intent, \
priority, subject, body.";

pub fn triage_user_prompt(message: &NewContactMessage) -> String {
    format!(
        "Submission:\n\
         Name: {} {}\n\
         Email: {}\n\
         Message: {}",
        message.first_name, message.last_name, message.email, message.message
    )
}
