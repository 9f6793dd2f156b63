//! Prompt construction for the three kinds of generation request.

use synapse_types::agent::Agent;
use synapse_types::message::Message;
use synapse_types::report::ReportField;

/// Stand-in statement when the service returns nothing for a turn
pub const SILENT_FILLER: &str = "...observes silently but signals disagreement.";

/// Everything a single agent turn is conditioned on
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub speaker: Agent,
    pub topic: String,
    /// Recent non-system messages, oldest first
    pub history: Vec<Message>,
    pub roster: Vec<String>,
    pub target: Option<Message>,
}

pub fn turn_prompt(ctx: &TurnContext) -> String {
    let history = ctx
        .history
        .iter()
        .filter(|m| !m.is_system)
        .map(Message::bracketed_line)
        .collect::<Vec<_>>()
        .join("\n");

    let target_block = match &ctx.target {
        Some(target) => format!(
            "PRIMARY INTERACTION TARGET:\n\
             You MUST respond to {}.\n\
             Their statement: \"{}\"\n\n\
             You may disagree, support, question, or reinterpret it, but you must engage it.",
            target.agent_name, target.content
        ),
        None => "No one addressed you directly.\n\
                 You must introduce a perspective that challenges or advances the discussion."
            .to_string(),
    };

    format!(
        "You are an autonomous participant in a live multi-agent cognitive simulation.\n\n\
         EXPERIMENT TOPIC: \"{topic}\"\n\n\
         IDENTITY: {name}\n\
         BEHAVIORAL RULES: {behavior}\n\
         CURRENT INTERNAL MEMORY: {memory}\n\n\
         OTHER AGENTS: {roster}\n\n\
         {target_block}\n\n\
         RECENT DISCUSSION:\n\
         {history}\n\n\
         CRITICAL RULE:\n\
         Your response must create a reaction from another agent.\n\
         End your message in a way that invites or provokes a reply.\n\
         Avoid concluding the discussion.\n\n\
         RESPONSE REQUIREMENTS:\n\
         - Stay in character\n\
         - Maximum 3 sentences\n\
         - No assistant-style language\n\
         - Avoid summarizing the discussion\n\
         - Push the conversation forward\n\n\
         Provide only the spoken dialogue.\n",
        topic = ctx.topic,
        name = ctx.speaker.name,
        behavior = ctx.speaker.behavior,
        memory = ctx.speaker.memory_summary,
        roster = ctx.roster.join(", "),
    )
}

pub fn memory_prompt(agent: &Agent, observations: &[Message], word_budget: usize) -> String {
    let log = observations
        .iter()
        .map(Message::plain_line)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are maintaining a cognitive memory state for agent \"{name}\".\n\n\
         PREVIOUS MEMORY:\n\
         {memory}\n\n\
         NEW OBSERVATIONS:\n\
         {log}\n\n\
         Update the memory:\n\
         - Keep personality stable\n\
         - Track opinions about other agents\n\
         - Track beliefs about the topic\n\
         - Do NOT summarize the whole conversation\n\n\
         Return a concise evolving internal belief state (max {word_budget} words).\n\
         Return only text.\n",
        name = agent.name,
        memory = agent.memory_summary,
    )
}

pub fn report_prompt(
    field: ReportField,
    topic: &str,
    roster: &[String],
    transcript: &[Message],
    word_budget: usize,
) -> String {
    let transcript = transcript
        .iter()
        .map(Message::plain_line)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are analyzing a multi-agent discussion.\n\n\
         Return ONLY plain text.\n\
         Maximum {word_budget} words.\n\
         No JSON.\n\
         No markdown.\n\n\
         TASK: {task}\n\n\
         TOPIC:\n\
         {topic}\n\n\
         AGENTS:\n\
         {roster}\n\n\
         TRANSCRIPT:\n\
         {transcript}\n",
        task = field.question(),
        roster = roster.join(", "),
    )
}
